//! Ping command implementation

use crate::client::VerifierApiClient;
use crate::config::AppConfig;
use anyhow::Result;
use colored::Colorize;

/// Execute the ping command
pub async fn execute(config: AppConfig, name: Option<String>, verifier: Option<String>) -> Result<()> {
    let endpoint = verifier.unwrap_or(config.verifier_api.endpoint.clone());
    let name = name.unwrap_or_else(|| "veristore user".to_string());

    let client = VerifierApiClient::new(&endpoint);
    let message = client.ping(&name).await?;

    println!("{} {} ({})", "✓".green(), message, endpoint);
    Ok(())
}
