//! On-disk shapes of the inventory document.
//!
//! Successive client versions wrote the inventory in different shapes:
//!
//! ```text
//! BareList:  [ { "name": "Produce", "ingredients": [ {...}, ... ] }, ... ]
//! Wrapped:   { "data": [ <categories> ], "username": "Nit", ... }
//! FlatList:  [ { "name": "Onion", "remaining": 5 }, ... ]
//! ```
//!
//! [`normalize`] turns any of them into the canonical category list and
//! records which shape it saw; [`denormalize`] writes the list back in that
//! same shape, carrying the wrapper's sibling keys through untouched.

use serde_json::{Map, Value};

use crate::models::{Category, Ingredient};

/// Sibling keys of `data` in a wrapped document.
pub type Metadata = Map<String, Value>;

/// Top-level shape of a persisted inventory document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    BareList,
    Wrapped,
    FlatList,
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shape::BareList => write!(f, "bare-list"),
            Shape::Wrapped => write!(f, "wrapped"),
            Shape::FlatList => write!(f, "flat-list"),
        }
    }
}

/// The canonical view of a document plus what is needed to write it back.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDocument {
    pub categories: Vec<Category>,
    pub shape: Shape,
    pub metadata: Metadata,
}

impl NormalizedDocument {
    pub fn new(categories: Vec<Category>, shape: Shape) -> Self {
        Self {
            categories,
            shape,
            metadata: Metadata::new(),
        }
    }

    /// An empty bare-list document.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Shape::BareList)
    }

    /// The `username` recorded in the wrapper, if any.
    pub fn username(&self) -> Option<&str> {
        self.metadata.get("username").and_then(Value::as_str)
    }

    pub fn ingredient_count(&self) -> usize {
        self.categories.iter().map(|c| c.ingredients.len()).sum()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SchemaError> {
        denormalize(&self.categories, self.shape, &self.metadata)
    }
}

/// Reasons a document does not match any known shape.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    InvalidJson(String),
    UnexpectedTopLevel(&'static str),
    MissingData,
    DataNotList(&'static str),
    FlatInsideWrapper,
    MixedElements,
    InvalidCategory(usize, String),
    InvalidIngredient(usize, String),
    Encode(String),
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaError::InvalidJson(e) => write!(f, "not valid JSON: {}", e),
            SchemaError::UnexpectedTopLevel(kind) => {
                write!(f, "expected a list or an object at the top level, found {}", kind)
            }
            SchemaError::MissingData => write!(f, "wrapped document has no \"data\" key"),
            SchemaError::DataNotList(kind) => {
                write!(f, "\"data\" must be a list of categories, found {}", kind)
            }
            SchemaError::FlatInsideWrapper => {
                write!(f, "\"data\" must be a list of categories, found bare ingredients")
            }
            SchemaError::MixedElements => {
                write!(f, "list mixes categories and bare ingredients")
            }
            SchemaError::InvalidCategory(index, e) => {
                write!(f, "category #{} is invalid: {}", index, e)
            }
            SchemaError::InvalidIngredient(index, e) => {
                write!(f, "ingredient #{} is invalid: {}", index, e)
            }
            SchemaError::Encode(e) => write!(f, "failed to encode document: {}", e),
        }
    }
}

impl std::error::Error for SchemaError {}

/// Parses raw document bytes into the canonical model.
pub fn normalize(raw: &[u8]) -> Result<NormalizedDocument, SchemaError> {
    let value: Value =
        serde_json::from_slice(raw).map_err(|e| SchemaError::InvalidJson(e.to_string()))?;
    normalize_value(value)
}

/// Same as [`normalize`] for an already-parsed JSON value.
pub fn normalize_value(value: Value) -> Result<NormalizedDocument, SchemaError> {
    match value {
        Value::Array(elements) => {
            let (categories, shape) = decode_list(elements)?;
            Ok(NormalizedDocument::new(categories, shape))
        }
        Value::Object(mut metadata) => {
            let data = metadata.remove("data").ok_or(SchemaError::MissingData)?;
            let elements = match data {
                Value::Array(elements) => elements,
                other => return Err(SchemaError::DataNotList(kind_of(&other))),
            };
            let (categories, shape) = decode_list(elements)?;
            if shape == Shape::FlatList {
                return Err(SchemaError::FlatInsideWrapper);
            }
            Ok(NormalizedDocument {
                categories,
                shape: Shape::Wrapped,
                metadata,
            })
        }
        other => Err(SchemaError::UnexpectedTopLevel(kind_of(&other))),
    }
}

/// Serializes categories back into `shape`, 2-space indented.
pub fn denormalize(
    categories: &[Category],
    shape: Shape,
    metadata: &Metadata,
) -> Result<Vec<u8>, SchemaError> {
    let encode = |e: serde_json::Error| SchemaError::Encode(e.to_string());

    let value = match shape {
        Shape::BareList => serde_json::to_value(categories).map_err(encode)?,
        Shape::FlatList => {
            let items: Vec<&Ingredient> =
                categories.iter().flat_map(|c| c.ingredients.iter()).collect();
            serde_json::to_value(items).map_err(encode)?
        }
        Shape::Wrapped => {
            let mut wrapper = metadata.clone();
            wrapper.insert(
                "data".to_string(),
                serde_json::to_value(categories).map_err(encode)?,
            );
            Value::Object(wrapper)
        }
    };

    serde_json::to_vec_pretty(&value).map_err(encode)
}

fn is_category(element: &Value) -> bool {
    element.get("ingredients").is_some() || element.get("items").is_some()
}

fn decode_list(elements: Vec<Value>) -> Result<(Vec<Category>, Shape), SchemaError> {
    if elements.is_empty() {
        return Ok((Vec::new(), Shape::BareList));
    }

    let categorized = elements.iter().filter(|e| is_category(e)).count();

    if categorized == elements.len() {
        let categories = elements
            .into_iter()
            .enumerate()
            .map(|(i, e)| {
                serde_json::from_value(e).map_err(|e| SchemaError::InvalidCategory(i, e.to_string()))
            })
            .collect::<Result<Vec<Category>, _>>()?;
        Ok((categories, Shape::BareList))
    } else if categorized == 0 {
        let ingredients = elements
            .into_iter()
            .enumerate()
            .map(|(i, e)| {
                serde_json::from_value(e)
                    .map_err(|e| SchemaError::InvalidIngredient(i, e.to_string()))
            })
            .collect::<Result<Vec<Ingredient>, _>>()?;
        Ok((vec![Category::new("", ingredients)], Shape::FlatList))
    } else {
        Err(SchemaError::MixedElements)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
