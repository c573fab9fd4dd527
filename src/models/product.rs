use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::forms::FormError;
use super::wire;

/// Quantities below this (and above zero) count as low stock.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// Opaque, server-assigned product identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        wire::string_or_number(deserializer).map(ProductId)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(
        default,
        alias = "createdAt",
        deserialize_with = "wire::lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// `price * quantity`, unrounded. `None` when the product does not fit
    /// in a `Decimal`.
    pub fn total_value(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }

    pub fn stock_status(&self) -> StockStatus {
        StockStatus::classify(self.quantity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    InStock,
}

impl StockStatus {
    pub fn classify(quantity: u32) -> Self {
        match quantity {
            0 => StockStatus::OutOfStock,
            q if q < LOW_STOCK_THRESHOLD => StockStatus::LowStock,
            _ => StockStatus::InStock,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::OutOfStock => "Out of Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::InStock => "In Stock",
        }
    }
}

/// Editable fields of a product, in the shape the backend accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPayload {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Name,
    Price,
    Quantity,
}

impl DraftField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftField::Name => "name",
            DraftField::Price => "price",
            DraftField::Quantity => "quantity",
        }
    }
}

impl FromStr for DraftField {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(DraftField::Name),
            "price" => Ok(DraftField::Price),
            "quantity" | "qty" => Ok(DraftField::Quantity),
            other => Err(FormError::new(format!("Unknown product field '{}'", other))),
        }
    }
}

/// In-progress copy of a product's editable fields.
///
/// Price and quantity stay `None` until the user supplies them, which is
/// what an empty input box means.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub price: Option<Decimal>,
    pub quantity: Option<u32>,
}

impl ProductDraft {
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: Some(product.price),
            quantity: Some(product.quantity),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn set_field(&mut self, field: DraftField, value: &str) -> Result<(), FormError> {
        match field {
            DraftField::Name => self.name = value.to_string(),
            DraftField::Price => self.price = parse_price(value)?,
            DraftField::Quantity => self.quantity = parse_quantity(value)?,
        }
        Ok(())
    }

    pub fn to_payload(&self) -> Result<ProductPayload, FormError> {
        let mut errors = FormError::new("Please fix the errors in the form");

        if self.name.trim().is_empty() {
            errors
                .field_errors
                .insert("name".into(), "Product name is required".into());
        }
        if self.price.is_none() {
            errors
                .field_errors
                .insert("price".into(), "Price is required".into());
        }
        if self.quantity.is_none() {
            errors
                .field_errors
                .insert("quantity".into(), "Quantity is required".into());
        }

        match (self.price, self.quantity) {
            (Some(price), Some(quantity)) if errors.field_errors.is_empty() => Ok(ProductPayload {
                name: self.name.clone(),
                price,
                quantity,
            }),
            _ => Err(errors),
        }
    }
}

fn parse_price(value: &str) -> Result<Option<Decimal>, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let price = Decimal::from_str(trimmed)
        .map_err(|_| FormError::field("price", format!("'{}' is not a valid price", trimmed)))?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(FormError::field("price", "Price cannot be negative"));
    }
    Ok(Some(price))
}

fn parse_quantity(value: &str) -> Result<Option<u32>, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse::<u32>().map(Some).map_err(|_| {
        FormError::field(
            "quantity",
            format!("'{}' is not a whole number of zero or more", trimmed),
        )
    })
}
