//! Turns inventory events into chat messages.

use chrono::{DateTime, Datelike, FixedOffset, Timelike};

use super::message::{Bubble, FlexBox, FlexComponent, Message};
use crate::events::InventoryEvent;
use crate::models::{SummaryEntry, SummaryItem};

pub const DEFAULT_DIGEST_LIMIT: usize = 10;

/// Offset between the Gregorian and the Thai Buddhist calendar year.
const BUDDHIST_ERA_OFFSET: i32 = 543;

#[derive(Debug, Clone)]
pub struct Renderer {
    digest_limit: usize,
    dashboard_url: Option<String>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            digest_limit: DEFAULT_DIGEST_LIMIT,
            dashboard_url: None,
        }
    }
}

impl Renderer {
    pub fn new(digest_limit: usize, dashboard_url: Option<String>) -> Self {
        Self {
            digest_limit,
            dashboard_url,
        }
    }

    pub fn render(&self, event: &InventoryEvent) -> Message {
        match event {
            InventoryEvent::Saved { actor, at } => Message::text(format!(
                "📦 วัตถุดิบถูกปรับปรุงโดย {} เมื่อ {}",
                actor,
                thai_timestamp(at)
            )),
            InventoryEvent::Reset { .. } => {
                Message::text("🔄 ระบบได้รีเซ็ตช่อง 'สั่งซื้อ' เป็น 0 เรียบร้อยแล้ว")
            }
            InventoryEvent::Summarized { entry } => self.digest(entry),
        }
    }

    /// Flex card listing the first `digest_limit` items of a summary.
    pub fn digest(&self, entry: &SummaryEntry) -> Message {
        let title = format!("📊 สรุปรายวัน ({})", thai_date(&entry.date));

        let mut lines: Vec<FlexComponent> = entry
            .items
            .iter()
            .take(self.digest_limit)
            .map(|item| FlexComponent::text(digest_line(item)))
            .collect();

        let hidden = entry.items.len().saturating_sub(self.digest_limit);
        if entry.items.is_empty() {
            lines.push(FlexComponent::muted("ไม่มีวัตถุดิบในระบบ"));
        } else if hidden > 0 {
            lines.push(FlexComponent::muted(format!("… และอีก {} รายการ", hidden)));
        }

        let footer = self.dashboard_url.as_ref().map(|url| {
            FlexBox::vertical(vec![FlexComponent::link_button("ดูทั้งหมด", url.clone())])
        });

        Message::Flex {
            alt_text: format!("{} {} รายการ", title, entry.items.len()),
            contents: Bubble {
                header: FlexBox::vertical(vec![FlexComponent::heading(title)]),
                body: FlexBox::vertical(lines).with_spacing("sm"),
                footer,
            },
        }
    }
}

fn digest_line(item: &SummaryItem) -> String {
    let unit = item.unit.as_deref().unwrap_or("");
    let remaining = if unit.is_empty() {
        format!("{}", item.remaining)
    } else {
        format!("{} {}", item.remaining, unit)
    };
    format!(
        "• {}: คงเหลือ {}, ใช้ไป {}, สั่งซื้อ {}",
        item.name, remaining, item.used, item.to_buy
    )
}

/// `d/m/yyyy` with a Buddhist-era year, as Thai locales print dates.
fn thai_date(at: &DateTime<FixedOffset>) -> String {
    format!(
        "{}/{}/{}",
        at.day(),
        at.month(),
        at.year() + BUDDHIST_ERA_OFFSET
    )
}

fn thai_timestamp(at: &DateTime<FixedOffset>) -> String {
    format!(
        "{} {:02}:{:02}:{:02}",
        thai_date(at),
        at.hour(),
        at.minute(),
        at.second()
    )
}
