mod admin;
mod import;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::{admin::AdminCommands, import::ImportCommands};

#[derive(Debug, Parser)]
#[command(name = "kreativa-cli")]
#[command(about = "Kreativa directory administration")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Manage moderator accounts
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
    /// Parse import files locally without writing anything
    Import {
        #[command(subcommand)]
        command: ImportCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("kreativa-cli: run with --help to list commands");
        return Ok(());
    };

    let config = kreativa_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match command {
        Commands::Import { command } => import::run(&config, command).await,
        Commands::Db { command } => {
            let pool = connect(&config).await?;
            match command {
                DbCommands::Ping => {
                    kreativa_db::ping(&pool).await?;
                    println!("database: ok");
                }
                DbCommands::Migrate => {
                    let applied = kreativa_db::run_migrations(&pool).await?;
                    println!("applied {applied} migration(s)");
                }
            }
            Ok(())
        }
        Commands::Admin { command } => {
            let pool = connect(&config).await?;
            admin::run(&pool, command).await
        }
    }
}

async fn connect(config: &kreativa_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = kreativa_db::PoolConfig::from_app_config(config);
    Ok(kreativa_db::connect_pool(&config.database_url, pool_config).await?)
}
