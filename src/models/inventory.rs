use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// Accepted spellings per field, canonical first. When a record carries
// several of them the first one present wins and the rest are dropped.
const NAME_KEYS: &[&str] = &["name", "ชื่อ"];
const UNIT_KEYS: &[&str] = &["unit", "หน่วย"];
const REMAINING_KEYS: &[&str] = &["remaining", "คงเหลือ"];
const USED_KEYS: &[&str] = &["used", "ใช้ไป"];
const TO_BUY_KEYS: &[&str] = &["to_buy", "order", "สั่งซื้อ"];
const INGREDIENTS_KEYS: &[&str] = &["ingredients", "items"];

/// A single stocked ingredient.
///
/// Field names are canonical; older clients wrote `order` (or Thai labels)
/// for some of them, which are accepted on read only. Keys this type does not
/// know about are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Ingredient {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub remaining: f64,
    pub used: f64,
    pub to_buy: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, unit: impl Into<String>, remaining: f64) -> Self {
        let unit = unit.into();
        Self {
            name: name.into(),
            unit: if unit.is_empty() { None } else { Some(unit) },
            remaining,
            used: 0.0,
            to_buy: 0.0,
            extra: Map::new(),
        }
    }

    pub fn with_used(mut self, used: f64) -> Self {
        self.used = used;
        self
    }

    pub fn with_to_buy(mut self, to_buy: f64) -> Self {
        self.to_buy = to_buy;
        self
    }
}

impl<'de> Deserialize<'de> for Ingredient {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut fields = Map::<String, Value>::deserialize(deserializer)?;

        let name = match take_field(&mut fields, NAME_KEYS) {
            Some(Value::String(name)) => name,
            Some(other) => {
                return Err(D::Error::custom(format!(
                    "\"name\" must be a string, found {}",
                    other
                )))
            }
            None => return Err(D::Error::missing_field("name")),
        };
        let unit = match take_field(&mut fields, UNIT_KEYS) {
            None | Some(Value::Null) => None,
            Some(Value::String(unit)) => Some(unit),
            Some(other) => {
                return Err(D::Error::custom(format!(
                    "\"unit\" must be a string, found {}",
                    other
                )))
            }
        };
        let remaining =
            lenient_number(take_field(&mut fields, REMAINING_KEYS)).map_err(D::Error::custom)?;
        let used =
            lenient_number(take_field(&mut fields, USED_KEYS)).map_err(D::Error::custom)?;
        let to_buy =
            lenient_number(take_field(&mut fields, TO_BUY_KEYS)).map_err(D::Error::custom)?;

        Ok(Self {
            name,
            unit,
            remaining,
            used,
            to_buy,
            extra: fields,
        })
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.unit {
            Some(unit) => write!(
                f,
                "{}: {} {} remaining, {} used, {} to buy",
                self.name, self.remaining, unit, self.used, self.to_buy
            ),
            None => write!(
                f,
                "{}: {} remaining, {} used, {} to buy",
                self.name, self.remaining, self.used, self.to_buy
            ),
        }
    }
}

/// A named, ordered group of ingredients (e.g. "Produce").
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Category {
    pub name: String,
    pub ingredients: Vec<Ingredient>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Category {
    pub fn new(name: impl Into<String>, ingredients: Vec<Ingredient>) -> Self {
        Self {
            name: name.into(),
            ingredients,
            extra: Map::new(),
        }
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut fields = Map::<String, Value>::deserialize(deserializer)?;

        let name = match fields.remove("name") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(name)) => name,
            Some(other) => {
                return Err(D::Error::custom(format!(
                    "\"name\" must be a string, found {}",
                    other
                )))
            }
        };
        let ingredients = match take_field(&mut fields, INGREDIENTS_KEYS) {
            Some(list) => serde_json::from_value(list).map_err(D::Error::custom)?,
            None => return Err(D::Error::missing_field("ingredients")),
        };

        Ok(Self {
            name,
            ingredients,
            extra: fields,
        })
    }
}

/// Removes every spelling in `keys` from `fields` and returns the value of the
/// first one present.
fn take_field(fields: &mut Map<String, Value>, keys: &[&str]) -> Option<Value> {
    keys.iter()
        .filter_map(|key| fields.remove(*key))
        .fold(None, |first, value| first.or(Some(value)))
}

/// Accepts a number, a numeric string or null. Missing and null read as zero.
fn lenient_number(value: Option<Value>) -> Result<f64, String> {
    match value {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .filter(|n| n.is_finite())
            .ok_or_else(|| format!("expected a finite number, found {}", n)),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(0.0);
            }
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| format!("expected a number, found \"{}\"", s))
        }
        Some(other) => Err(format!("expected a number, found {}", other)),
    }
}
