use clap::{Args, Subcommand};

use super::OutputFormat;
use stockroom::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        println!("port: {}", config.port.value);
                        println!("  source: {}", config.port.source);
                        println!();

                        println!("data_path: {}", config.data_path.value.display());
                        println!("  source: {}", config.data_path.source);
                        println!();

                        println!("summary_path: {}", config.summary_path.value.display());
                        println!("  source: {}", config.summary_path.source);
                        println!();

                        println!("static_dir: {}", config.static_dir.value.display());
                        println!("  source: {}", config.static_dir.source);
                        println!();

                        println!("timezone: {}", config.timezone.value);
                        println!("  source: {}", config.timezone.source);
                        println!();

                        println!("schedule:");
                        println!("  reset: {}", config.schedule.reset);
                        println!("  summary: {}", config.schedule.summary);
                        println!("digest_limit: {}", config.digest_limit);
                        if let Some(url) = &config.dashboard_url {
                            println!("dashboard_url: {}", url);
                        }
                        println!();

                        println!("line:");
                        println!(
                            "  channel_access_token: {}",
                            if config.line.channel_access_token.is_some() {
                                "(set)"
                            } else {
                                "(not set)"
                            }
                        );
                        println!(
                            "  group_id: {}",
                            config.line.group_id.as_deref().unwrap_or("(not set)")
                        );
                        println!("  api_base: {}", config.line.api_base);
                    }
                }
                Ok(())
            }
        }
    }
}
