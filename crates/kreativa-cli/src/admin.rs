//! Moderator account management. Passwords are stored as Argon2id PHC
//! strings, each with its own salt.

use clap::Subcommand;
use kreativa_core::validation::validate_email;
use sqlx::PgPool;

pub(crate) const MIN_PASSWORD_CHARS: usize = 8;

#[derive(Debug, Subcommand)]
pub enum AdminCommands {
    /// Create a moderator account
    Add {
        #[arg(long)]
        email: String,
        /// Falls back to `KREATIVA_ADMIN_PASSWORD` so it stays out of shell history
        #[arg(long, env = "KREATIVA_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "admin")]
        role: String,
    },
    /// List moderator accounts
    List,
}

pub(crate) fn check_password(password: &str) -> anyhow::Result<()> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        anyhow::bail!("password must be at least {MIN_PASSWORD_CHARS} characters");
    }
    Ok(())
}

pub(crate) async fn run(pool: &PgPool, command: AdminCommands) -> anyhow::Result<()> {
    match command {
        AdminCommands::Add {
            email,
            password,
            name,
            role,
        } => {
            let check = validate_email(&email);
            if !check.valid {
                anyhow::bail!(check.message());
            }
            check_password(&password)?;

            let hash = kreativa_db::hash_password(&password)?;
            let admin =
                kreativa_db::create_admin_user(pool, email.trim(), &hash, name.trim(), &role).await?;
            tracing::info!(email = %admin.email, role = %admin.role, "admin user created");
            println!("created {} ({})", admin.email, admin.id);
        }
        AdminCommands::List => {
            let admins = kreativa_db::list_admin_users(pool).await?;
            if admins.is_empty() {
                println!("no admin users");
            }
            for admin in admins {
                let last_login = admin.last_login.map_or_else(
                    || "\u{2014}".to_string(),
                    |t| t.format("%Y-%m-%d %H:%M").to_string(),
                );
                println!(
                    "{:<32} {:<20} {:<8} last login {last_login}",
                    admin.email, admin.name, admin.role
                );
            }
        }
    }
    Ok(())
}
