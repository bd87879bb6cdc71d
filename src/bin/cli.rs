use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use uuid::Uuid;

use classbook::cli::seeder::{SeedConfig, clear_seed, seed_all};
use classbook::cli::{check_conflicts, create_admin};
use classbook_db::{DatabaseConfig, connect};
use classbook_models::TermId;

#[derive(Parser)]
#[command(name = "classbook-cli")]
#[command(about = "Classbook CLI - administrative tools for the Classbook API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an administrator account
    CreateAdmin {
        #[arg(short = 'f', long)]
        first_name: Option<String>,

        #[arg(short = 'l', long)]
        last_name: Option<String>,

        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Prompted for if not provided
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed demo teachers, classes, students and a conflict-free timetable
    Seed {
        #[arg(long, default_value = "12")]
        teachers: usize,

        /// Classes per grade (grades 10 to 12)
        #[arg(long, default_value = "2")]
        classes_per_grade: usize,

        #[arg(long, default_value = "25")]
        students_per_class: usize,

        /// Lesson periods per day, starting at 07:00
        #[arg(long, default_value = "6")]
        periods: u16,
    },
    /// Remove everything the seed command created
    ClearSeed,
    /// Report double-booked teachers and classes in a term
    CheckConflicts {
        #[arg(short = 't', long)]
        term_id: Uuid,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let config = DatabaseConfig {
        max_connections: 5,
        ..DatabaseConfig::from_env()?
    };
    let pool = connect(&config).await?;

    match cli.command {
        Commands::CreateAdmin {
            first_name,
            last_name,
            email,
            password,
        } => {
            let first_name = match first_name {
                Some(v) => v,
                None => Input::new().with_prompt("First name").interact_text()?,
            };
            let last_name = match last_name {
                Some(v) => v,
                None => Input::new().with_prompt("Last name").interact_text()?,
            };
            let email = match email {
                Some(v) => v,
                None => Input::new().with_prompt("Email address").interact_text()?,
            };
            let password = match password {
                Some(v) => v,
                None => Password::new()
                    .with_prompt("Password")
                    .with_confirmation("Confirm password", "Passwords don't match")
                    .interact()?,
            };

            match create_admin(&pool, &first_name, &last_name, &email, &password).await {
                Ok(id) => {
                    println!("\n✅ Administrator created");
                    println!("   ID: {}", id);
                    println!("   Email: {}", email);
                }
                Err(e) => {
                    eprintln!("\n❌ Error creating administrator: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Seed {
            teachers,
            classes_per_grade,
            students_per_class,
            periods,
        } => {
            let config = SeedConfig {
                teachers,
                classes_per_grade,
                students_per_class,
                periods_per_day: periods,
                ..SeedConfig::default()
            };
            if let Err(e) = seed_all(&pool, config).await {
                eprintln!("\n❌ Error seeding database: {:#}", e);
                std::process::exit(1);
            }
        }
        Commands::ClearSeed => {
            if let Err(e) = clear_seed(&pool).await {
                eprintln!("\n❌ Error clearing seeded data: {:#}", e);
                std::process::exit(1);
            }
        }
        Commands::CheckConflicts { term_id } => {
            let clashes = check_conflicts(&pool, TermId(term_id)).await?;
            if clashes.is_empty() {
                println!("✅ No schedule conflicts in term {}", term_id);
            } else {
                println!("❌ {} conflict(s) in term {}:", clashes.len(), term_id);
                for clash in &clashes {
                    println!(
                        "   [{}] {} <-> {}: {}",
                        clash.kind.as_str(),
                        clash.first,
                        clash.second,
                        clash.message
                    );
                }
                std::process::exit(2);
            }
        }
    }

    Ok(())
}
