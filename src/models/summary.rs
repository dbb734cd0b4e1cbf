use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One ingredient's numbers at the time a summary was taken.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default)]
    pub remaining: f64,
    #[serde(default)]
    pub used: f64,
    #[serde(default, alias = "order")]
    pub to_buy: f64,
}

/// A daily snapshot of every ingredient, in category-then-ingredient order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryEntry {
    pub date: DateTime<FixedOffset>,
    pub items: Vec<SummaryItem>,
}

/// A record in the summary log.
///
/// Entries written before dates were stored as RFC 3339 do not parse as
/// [`SummaryEntry`]; they are kept as raw JSON so rewriting the log never
/// drops them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LogRecord {
    Entry(SummaryEntry),
    Legacy(Value),
}

impl LogRecord {
    pub fn as_entry(&self) -> Option<&SummaryEntry> {
        match self {
            LogRecord::Entry(entry) => Some(entry),
            LogRecord::Legacy(_) => None,
        }
    }

    /// Date as written in the log, whatever its format.
    pub fn date_label(&self) -> String {
        match self {
            LogRecord::Entry(entry) => entry.date.to_rfc3339(),
            LogRecord::Legacy(value) => value
                .get("date")
                .and_then(Value::as_str)
                .unwrap_or("(no date)")
                .to_string(),
        }
    }

    pub fn item_count(&self) -> usize {
        match self {
            LogRecord::Entry(entry) => entry.items.len(),
            LogRecord::Legacy(value) => value
                .get("items")
                .and_then(Value::as_array)
                .map(Vec::len)
                .unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_date_is_rfc3339() {
        let entry = SummaryEntry {
            date: DateTime::parse_from_rfc3339("2026-10-18T00:00:00+07:00").unwrap(),
            items: vec![],
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["date"], json!("2026-10-18T00:00:00+07:00"));
    }

    #[test]
    fn test_legacy_record_kept_verbatim() {
        let raw = json!({
            "date": "18/10/2569 00:00:00",
            "items": [{ "name": "Onion", "unit": "kg", "remaining": 5, "used": 2, "order": 0 }]
        });
        let record: LogRecord = serde_json::from_value(raw.clone()).unwrap();
        assert!(record.as_entry().is_none());
        assert_eq!(record.date_label(), "18/10/2569 00:00:00");
        assert_eq!(record.item_count(), 1);
        assert_eq!(serde_json::to_value(&record).unwrap(), raw);
    }

    #[test]
    fn test_current_record_parses_as_entry() {
        let raw = json!({
            "date": "2026-10-18T00:00:00+07:00",
            "items": [{ "name": "Onion", "remaining": 5.0, "used": 2.0, "to_buy": 0.0 }]
        });
        let record: LogRecord = serde_json::from_value(raw).unwrap();
        let entry = record.as_entry().unwrap();
        assert_eq!(entry.items[0].name, "Onion");
        assert_eq!(entry.items[0].unit, None);
    }
}
