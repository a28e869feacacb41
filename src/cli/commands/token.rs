use anyhow::anyhow;
use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;

pub async fn handle(username: &str, hours: Option<u64>, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config().security;
    let stores = super::open_stores().await?;

    let user = stores
        .users
        .find_by_username(username)
        .await?
        .ok_or_else(|| anyhow!("User '{}' not found", username))?;

    if !user.is_active {
        return Err(anyhow!("User '{}' is inactive", username));
    }

    let hours = hours.unwrap_or(security.jwt_expiry_hours);
    let token = generate_jwt(&Claims::for_user(&user, hours), &security.jwt_secret)?;

    match output_format {
        OutputFormat::Json => output_success(
            &output_format,
            &format!("Token issued for '{}'", user.username),
            Some(json!({ "token": token, "expires_in_hours": hours })),
        ),
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}
