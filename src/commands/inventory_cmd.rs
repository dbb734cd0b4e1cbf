use clap::Args;

use super::OutputFormat;
use stockroom::inventory::InventoryService;
use stockroom::models::Category;

#[derive(Args)]
pub struct ShowCommand {
    /// Only show ingredients whose name contains this text
    #[arg(long)]
    pub filter: Option<String>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl ShowCommand {
    pub async fn run(&self, service: &InventoryService) -> Result<(), Box<dyn std::error::Error>> {
        let (mut categories, version) = service.snapshot().await?;

        if let Some(filter) = &self.filter {
            let needle = filter.to_lowercase();
            for category in &mut categories {
                category
                    .ingredients
                    .retain(|i| i.name.to_lowercase().contains(&needle));
            }
            categories.retain(|c| !c.ingredients.is_empty());
        }

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&categories)?);
            }
            OutputFormat::Text => {
                print_categories(&categories);
                println!();
                println!("Version: {}", version);
            }
        }
        Ok(())
    }
}

fn print_categories(categories: &[Category]) {
    if categories.iter().all(|c| c.ingredients.is_empty()) {
        println!("No ingredients found.");
        return;
    }

    for category in categories {
        let name = if category.name.is_empty() {
            "(uncategorized)"
        } else {
            category.name.as_str()
        };
        println!("{}", name);
        for ingredient in &category.ingredients {
            println!("  {}", ingredient);
        }
    }
}

#[derive(Args)]
pub struct AdjustCommand {
    /// Ingredient name
    pub name: String,

    /// Amount to add to the remaining stock; negative to take away
    #[arg(allow_negative_numbers = true)]
    pub amount: f64,
}

impl AdjustCommand {
    pub async fn run(&self, service: &InventoryService) -> Result<(), Box<dyn std::error::Error>> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Ingredient name cannot be empty".into());
        }

        let outcome = service.apply_delta(name, self.amount).await?;
        println!("{}: {} remaining", outcome.name, outcome.remaining);
        Ok(())
    }
}
