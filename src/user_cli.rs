// src/user_cli.rs
use crate::database::{Database, UserService, USER_ROLES};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(name = "hireflow-admin")]
#[command(about = "Manage dashboard users for the hireflow service")]
pub struct UserCli {
    #[command(subcommand)]
    pub command: UserCommand,

    #[arg(long, default_value = "data/hireflow.db")]
    pub database_path: PathBuf,
}

#[derive(Subcommand)]
pub enum UserCommand {
    /// Add a new dashboard user
    Add {
        name: String,
        email: String,
        #[arg(default_value = "user")]
        role: String,
    },
    /// Remove a user by email
    Remove { email: String },
    /// List all users
    List,
    /// Import users from a CSV file (name,email,role)
    Import { csv_file: PathBuf },
    /// Initialize the database
    Init,
}

pub async fn handle_user_command(cli: UserCli) -> Result<()> {
    let db = Database::new(&cli.database_path).await?;
    let service = UserService::new(db.pool());

    match cli.command {
        UserCommand::Add { name, email, role } => {
            match service.create(&name, &email, &role).await {
                Ok(user) => {
                    println!("User created:");
                    println!("   Name:  {}", user.name);
                    println!("   Email: {}", user.email);
                    println!("   Role:  {}", user.role);
                    println!("   ID:    {}", user.id);
                }
                Err(e) => {
                    error!("Failed to create user: {}", e);
                    anyhow::bail!("Failed to create user: {}", e);
                }
            }
        }

        UserCommand::Remove { email } => {
            if service.delete_by_email(&email).await? {
                println!("Removed user: {}", email);
            } else {
                println!("No user found for email: {}", email);
            }
        }

        UserCommand::List => {
            let users = service.list().await?;
            if users.is_empty() {
                println!("No users configured.");
            } else {
                println!("{} user(s):", users.len());
                for user in users {
                    println!("   {:<10} {:<30} {}", user.role, user.email, user.name);
                }
            }
        }

        UserCommand::Import { csv_file } => {
            let mut reader = csv::Reader::from_path(&csv_file)
                .with_context(|| format!("Failed to open CSV file: {}", csv_file.display()))?;

            let mut imported = 0usize;
            let mut skipped = 0usize;

            for record in reader.records() {
                let record = record.context("Failed to read CSV record")?;
                let name = record.get(0).unwrap_or("").trim();
                let email = record.get(1).unwrap_or("").trim();
                let role = record.get(2).unwrap_or("user").trim();

                if name.is_empty() || email.is_empty() {
                    skipped += 1;
                    continue;
                }

                match service.create(name, email, role).await {
                    Ok(_) => imported += 1,
                    Err(e) => {
                        println!("Skipping {}: {}", email, e);
                        skipped += 1;
                    }
                }
            }

            println!("Imported {} user(s), skipped {}.", imported, skipped);
        }

        UserCommand::Init => {
            // Database::new already ran the migrations.
            db.health_check().await?;
            println!("Database initialized at {}", cli.database_path.display());
            println!("Known roles: {}", USER_ROLES.join(", "));
        }
    }

    Ok(())
}
