use clap::Args;

use super::OutputFormat;
use stockroom::config::Config;
use stockroom::events::InventoryEvent;
use stockroom::notify::{build_notifier, Dispatcher, Renderer};
use stockroom::scheduler::{JobKind, JobRunner};

/// Runs one of the daily jobs immediately
#[derive(Args)]
pub struct RunJobCommand {
    /// Also send the job's notification to the LINE group
    #[arg(long)]
    pub notify: bool,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl RunJobCommand {
    pub async fn run(
        &self,
        kind: JobKind,
        runner: &JobRunner,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let event = runner.run(kind).await?;
        self.print(&event)?;

        if self.notify {
            let renderer = Renderer::new(config.digest_limit, config.dashboard_url.clone());
            let dispatcher = Dispatcher::new(build_notifier(&config.line), renderer);
            dispatcher.deliver(&event).await?;
            println!("Notification sent.");
        }
        Ok(())
    }

    fn print(&self, event: &InventoryEvent) -> Result<(), Box<dyn std::error::Error>> {
        match (&self.format, event) {
            (OutputFormat::Json, InventoryEvent::Summarized { entry }) => {
                println!("{}", serde_json::to_string_pretty(entry)?);
            }
            (OutputFormat::Json, InventoryEvent::Reset { at, ingredients }) => {
                let body = serde_json::json!({ "at": at, "ingredients": ingredients });
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
            (OutputFormat::Text, InventoryEvent::Summarized { entry }) => {
                println!("Summary for {}", entry.date.format("%Y-%m-%d %H:%M"));
                for item in &entry.items {
                    println!(
                        "  {}: {} {} remaining, {} used, {} to buy",
                        item.name,
                        item.remaining,
                        item.unit.as_deref().unwrap_or(""),
                        item.used,
                        item.to_buy
                    );
                }
                println!("{} item(s) recorded.", entry.items.len());
            }
            (OutputFormat::Text, InventoryEvent::Reset { ingredients, .. }) => {
                println!("Reset reorder quantities for {} ingredient(s).", ingredients);
            }
            (_, InventoryEvent::Saved { .. }) => {}
        }
        Ok(())
    }
}
