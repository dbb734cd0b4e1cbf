use clap::Args;

use super::OutputFormat;
use stockroom::models::LogRecord;
use stockroom::store::SummaryLog;

#[derive(Args)]
pub struct HistoryCommand {
    /// Number of most recent summaries to show
    #[arg(long, short, default_value = "7")]
    pub limit: usize,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl HistoryCommand {
    pub fn run(&self, log: &SummaryLog) -> Result<(), Box<dyn std::error::Error>> {
        let records = log.records()?;
        let start = records.len().saturating_sub(self.limit);
        let recent = &records[start..];

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(recent)?);
            }
            OutputFormat::Text => {
                if recent.is_empty() {
                    println!("No summaries recorded.");
                    return Ok(());
                }
                for record in recent {
                    let marker = match record {
                        LogRecord::Entry(_) => "",
                        LogRecord::Legacy(_) => " (legacy)",
                    };
                    println!(
                        "{}  {} item(s){}",
                        record.date_label(),
                        record.item_count(),
                        marker
                    );
                }
                println!();
                println!("Showing {} of {} summaries.", recent.len(), records.len());
            }
        }
        Ok(())
    }
}
