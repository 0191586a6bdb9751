//! Transaction history domain model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::serde_util::{deserialize_decimal, deserialize_timestamp, serialize_decimal};

/// Buy or sell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "buy",
            Action::Sell => "sell",
        }
    }

    /// Past-tense label used in history listings
    pub fn label(&self) -> &'static str {
        match self {
            Action::Buy => "Bought",
            Action::Sell => "Sold",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            other => Err(Error::validation(format!(
                "Unknown action: {} (expected buy or sell)",
                other
            ))),
        }
    }
}

/// One buy/sell record in the history log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub product_name: Option<String>,
    pub action: Action,
    pub quantity: i64,
    #[serde(
        deserialize_with = "deserialize_decimal",
        serialize_with = "serialize_decimal"
    )]
    pub price: Decimal,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Name to show for the product, falling back to its id
    pub fn product_label(&self) -> String {
        match (&self.product_name, self.product_id) {
            (Some(name), _) if !name.trim().is_empty() => name.clone(),
            (_, Some(id)) => format!("Product #{}", id),
            _ => "Unknown product".to_string(),
        }
    }
}

/// History create/update payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryInput {
    pub product_id: i64,
    pub action: Action,
    pub quantity: i64,
    #[serde(
        deserialize_with = "deserialize_decimal",
        serialize_with = "serialize_decimal"
    )]
    pub price: Decimal,
}

impl HistoryInput {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if self.quantity <= 0 {
            errors.push("Quantity must be greater than 0".to_string());
        }
        if self.price < Decimal::ZERO {
            errors.push("Price must be 0 or greater".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(errors))
        }
    }
}

/// Server-side history filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryFilter {
    #[default]
    All,
    Action(Action),
    Product(i64),
}
