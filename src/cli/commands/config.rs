use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{get_config_dir, load_session};
use crate::cli::OutputFormat;
use crate::config::config;

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Show the resolved API and display settings")]
    Show,
}

pub async fn handle(cmd: ConfigCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ConfigCommands::Show => {
            let app = config();
            let config_dir = get_config_dir()?;
            let user = load_session()?.map(|s| s.user.username);

            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "config": app,
                            "config_dir": config_dir,
                            "logged_in_as": user,
                        }))?
                    );
                }
                OutputFormat::Text => {
                    println!("Environment: {:?}", app.environment);
                    println!("API URL: {}", app.api.base_url);
                    println!("Timeout: {}s", app.api.timeout_secs);
                    println!("Currency: {}", app.display.currency);
                    println!("Config dir: {}", config_dir.display());
                    println!("Logged in as: {}", user.as_deref().unwrap_or("(nobody)"));
                }
            }
            Ok(())
        }
    }
}
