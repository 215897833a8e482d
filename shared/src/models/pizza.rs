//! Pizza configuration and price breakdown models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pizza size
///
/// Parsing is case-insensitive and never fails: anything that is not
/// `medium` or `large` is priced as `small`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Size {
    #[default]
    Small,
    Medium,
    Large,
}

impl Size {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "medium" => Self::Medium,
            "large" => Self::Large,
            _ => Self::Small,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl From<String> for Size {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Crust choice
///
/// Unrecognized input maps to `Other`, which carries no surcharge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Crust {
    #[default]
    Traditional,
    Classic,
    Thin,
    Stuffed,
    Other,
}

impl Crust {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "traditional" => Self::Traditional,
            "classic" => Self::Classic,
            "thin" => Self::Thin,
            "stuffed" => Self::Stuffed,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Traditional => "traditional",
            Self::Classic => "classic",
            Self::Thin => "thin",
            Self::Stuffed => "stuffed",
            Self::Other => "other",
        }
    }
}

impl From<String> for Crust {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl fmt::Display for Crust {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selected topping. `price` falls back to the default topping price when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topping {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl Topping {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: None,
        }
    }

    pub fn priced(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price: Some(price),
        }
    }
}

/// Input for a single-pizza quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceInput {
    pub base_price: f64,
    #[serde(default)]
    pub size: Size,
    #[serde(default)]
    pub crust: Crust,
    #[serde(default)]
    pub toppings: Vec<Topping>,
}

/// Computed price of one unit
///
/// `total == base_price + crust_price + topping_price` after 2dp rounding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    /// Base price after the size multiplier
    pub base_price: f64,
    pub crust_price: f64,
    pub topping_price: f64,
    pub free_toppings: u32,
    pub charged_toppings: u32,
    pub total: f64,
}

fn default_quantity() -> u32 {
    1
}

/// One configured pizza in a cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub name: String,
    pub base_price: f64,
    #[serde(default)]
    pub size: Size,
    #[serde(default)]
    pub crust: Crust,
    #[serde(default)]
    pub toppings: Vec<Topping>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

/// A cart line with its server-side price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinePrice {
    pub name: String,
    pub size: Size,
    pub crust: Crust,
    pub toppings: Vec<Topping>,
    pub quantity: u32,
    pub unit: PriceBreakdown,
    pub line_total: f64,
}

/// Priced cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartQuote {
    pub lines: Vec<LinePrice>,
    pub subtotal: f64,
}
