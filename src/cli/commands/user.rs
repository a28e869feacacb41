use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_empty_collection, output_success, output_users};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create an active user")]
    Add {
        #[arg(help = "Username (letters, digits and @.+-_, up to 150 characters)")]
        username: String,
    },

    #[command(about = "List all users")]
    List,
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let stores = super::open_stores().await?;

    match cmd {
        UserCommands::Add { username } => {
            let user = stores.users.create(&username).await?;
            tracing::info!("Created user {} ({})", user.username, user.id);

            output_success(
                &output_format,
                &format!("User '{}' created", user.username),
                Some(json!({ "user": user })),
            )
        }
        UserCommands::List => {
            let users = stores.users.list().await?;
            if users.is_empty() {
                return output_empty_collection(&output_format, "users", "No users found");
            }
            output_users(&output_format, &users)
        }
    }
}
