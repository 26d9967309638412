//! Cascade Officials CLI - Database migrations and member management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! cascade-cli migrate
//!
//! # Create a member
//! cascade-cli member add -e ref@example.com -n "Jordan Reed" -r official
//!
//! # Promote a member
//! cascade-cli member set-role -e ref@example.com -r executive
//!
//! # List the roster
//! cascade-cli member list
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cascade-cli")]
#[command(author, version, about = "Cascade Officials CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage members
    Member {
        #[command(subcommand)]
        action: MemberAction,
    },
}

#[derive(Subcommand)]
enum MemberAction {
    /// Create a new member
    Add(AddArgs),
    /// Change a member's role
    SetRole {
        /// Member email address
        #[arg(short, long)]
        email: String,

        /// New role (`official`, `executive`, `admin`)
        #[arg(short, long)]
        role: String,
    },
    /// List all members
    List,
}

#[derive(Args)]
struct AddArgs {
    /// Member email address
    #[arg(short, long)]
    email: String,

    /// Member display name
    #[arg(short, long)]
    name: Option<String>,

    /// Member role (`official`, `executive`, `admin`)
    #[arg(short, long, default_value = "official")]
    role: String,

    /// Initial password (read from `MEMBER_PASSWORD` env if omitted)
    #[arg(short, long)]
    password: Option<String>,
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Member { action } => match action {
            MemberAction::Add(args) => {
                commands::member::add(
                    &args.email,
                    args.name.as_deref(),
                    &args.role,
                    args.password.as_deref(),
                )
                .await?;
            }
            MemberAction::SetRole { email, role } => {
                commands::member::set_role(&email, &role).await?;
            }
            MemberAction::List => commands::member::list().await?,
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(e) = run(Cli::parse()).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}
