pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sssf")]
#[command(about = "SSSF admin CLI - account maintenance against the configured store")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create an admin account (registration can only create users)")]
    CreateAdmin {
        #[arg(help = "Display name")]
        user_name: String,
        #[arg(help = "Email, used as the login username")]
        email: String,
        #[arg(long, env = "SSSF_ADMIN_PASSWORD", help = "Password")]
        password: String,
    },

    #[command(about = "Grant the admin role to an existing account")]
    Promote {
        #[arg(help = "Email of the account")]
        email: String,
    },

    #[command(about = "Print an argon2 hash using the configured parameters")]
    HashPassword {
        #[arg(help = "Password to hash")]
        password: String,
    },
}

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = crate::config::config().clone();

    match cli.command {
        Commands::CreateAdmin {
            user_name,
            email,
            password,
        } => commands::users::create_admin(&config, user_name, email, password, output_format).await,
        Commands::Promote { email } => commands::users::promote(&config, &email, output_format).await,
        Commands::HashPassword { password } => {
            commands::password::hash(&config, &password, output_format)
        }
    }
}
