use clap::ValueEnum;

mod config_cmd;
mod history_cmd;
mod inventory_cmd;
mod jobs_cmd;

pub use config_cmd::ConfigCommand;
pub use history_cmd::HistoryCommand;
pub use inventory_cmd::{AdjustCommand, ShowCommand};
pub use jobs_cmd::RunJobCommand;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
