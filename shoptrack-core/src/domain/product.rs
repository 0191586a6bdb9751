//! Product domain model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::serde_util::{deserialize_decimal, serialize_decimal};

/// Stock level at or below which a product is flagged as running low
pub const LOW_STOCK_LEVEL: i64 = 10;

/// A product as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(
        deserialize_with = "deserialize_decimal",
        serialize_with = "serialize_decimal"
    )]
    pub price: Decimal,
    pub stock: i64,
    #[serde(default)]
    pub description: Option<String>,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.stock <= LOW_STOCK_LEVEL
    }

    /// Case-insensitive substring match over name and description
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }

    /// Form contents pre-filled from this product, for editing
    pub fn to_input(&self) -> ProductInput {
        ProductInput {
            name: self.name.clone(),
            price: self.price,
            stock: self.stock,
            description: self.description.clone().unwrap_or_default(),
        }
    }
}

/// Product create/update payload (the product form)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(
        deserialize_with = "deserialize_decimal",
        serialize_with = "serialize_decimal"
    )]
    pub price: Decimal,
    pub stock: i64,
    #[serde(default)]
    pub description: String,
}

impl ProductInput {
    pub fn new(name: impl Into<String>, price: Decimal, stock: i64) -> Self {
        Self {
            name: name.into(),
            price,
            stock,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Build the payload from raw form text, trimming name and description.
    ///
    /// Unparseable price or stock fields report the same message as an
    /// out-of-range value.
    pub fn parse(name: &str, price: &str, stock: &str, description: &str) -> Result<Self> {
        let mut errors = Vec::new();
        let name = name.trim().to_string();
        if name.is_empty() {
            errors.push(NAME_REQUIRED.to_string());
        }
        let price = match price.trim().parse::<Decimal>() {
            Ok(p) if p > Decimal::ZERO => Some(p),
            _ => {
                errors.push(PRICE_POSITIVE.to_string());
                None
            }
        };
        let stock = match stock.trim().parse::<i64>() {
            Ok(s) if s >= 0 => Some(s),
            _ => {
                errors.push(STOCK_NON_NEGATIVE.to_string());
                None
            }
        };

        match (price, stock) {
            (Some(price), Some(stock)) if errors.is_empty() => Ok(Self {
                name,
                price,
                stock,
                description: description.trim().to_string(),
            }),
            _ => Err(Error::Validation(errors)),
        }
    }

    /// Validation messages for this payload; empty when valid
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(NAME_REQUIRED.to_string());
        }
        if self.price <= Decimal::ZERO {
            errors.push(PRICE_POSITIVE.to_string());
        }
        if self.stock < 0 {
            errors.push(STOCK_NON_NEGATIVE.to_string());
        }
        errors
    }

    pub fn validate(&self) -> Result<()> {
        let errors = self.validation_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(errors))
        }
    }
}

const NAME_REQUIRED: &str = "Product name is required";
const PRICE_POSITIVE: &str = "Price must be greater than 0";
const STOCK_NON_NEGATIVE: &str = "Stock must be 0 or greater";
const INVALID_QUANTITY: &str = "Please enter a valid quantity";

/// Stock mutation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockOperation {
    Add,
    Remove,
    Set,
}

impl StockOperation {
    /// Path segment used by the stock endpoints
    pub fn as_str(&self) -> &'static str {
        match self {
            StockOperation::Add => "add",
            StockOperation::Remove => "remove",
            StockOperation::Set => "set",
        }
    }

    /// Past tense for notices ("Stock added successfully!")
    pub fn past_tense(&self) -> &'static str {
        match self {
            StockOperation::Add => "added",
            StockOperation::Remove => "removed",
            StockOperation::Set => "set",
        }
    }
}

impl std::fmt::Display for StockOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StockOperation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "add" => Ok(Self::Add),
            "remove" => Ok(Self::Remove),
            "set" => Ok(Self::Set),
            other => Err(Error::validation(format!("Unknown stock operation: {}", other))),
        }
    }
}

/// Parse a stock quantity typed by the user. Must be a positive integer.
pub fn parse_quantity(raw: &str) -> Result<u32> {
    match raw.trim().parse::<i64>() {
        Ok(q) => validate_quantity(q),
        Err(_) => Err(Error::validation(INVALID_QUANTITY)),
    }
}

pub fn validate_quantity(quantity: i64) -> Result<u32> {
    if quantity <= 0 {
        return Err(Error::validation(INVALID_QUANTITY));
    }
    u32::try_from(quantity).map_err(|_| Error::validation(INVALID_QUANTITY))
}
