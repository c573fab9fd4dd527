use std::cmp::Ordering;
use std::str::FromStr;

use crate::models::Product;

use super::error::FilterError;
use super::types::{SortDirection, SortDirective, SortKey};

pub struct FilterOrder;

impl FilterOrder {
    /// Parse `"price"`, `"price desc"` or `"price:desc"` into a directive.
    /// A bare column sorts ascending.
    pub fn parse(order: &str) -> Result<SortDirective, FilterError> {
        let normalized = order.replace(':', " ");
        let mut it = normalized.split_whitespace();
        let column = it.next().ok_or(FilterError::EmptyOrder)?;
        let key = column.parse::<SortKey>()?;
        let direction = match it.next() {
            Some(dir) => dir.parse::<SortDirection>()?,
            None => SortDirection::Asc,
        };
        if let Some(extra) = it.next() {
            return Err(FilterError::InvalidDirection(extra.to_string()));
        }
        Ok(SortDirective { key, direction })
    }

    /// Next directive after the user picks `key`: same key flips direction,
    /// anything else starts ascending on the new key.
    pub fn toggle(current: Option<SortDirective>, key: SortKey) -> SortDirective {
        match current {
            Some(active) if active.key == key => SortDirective {
                key,
                direction: active.direction.flipped(),
            },
            _ => SortDirective::asc(key),
        }
    }

    /// Three-way comparison on the directive's field; `Desc` reverses it.
    pub fn compare(a: &Product, b: &Product, directive: &SortDirective) -> Ordering {
        let ordering = match directive.key {
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::Price => a.price.cmp(&b.price),
            SortKey::Quantity => a.quantity.cmp(&b.quantity),
        };
        match directive.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortKey {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "price" => Ok(SortKey::Price),
            "quantity" | "qty" => Ok(SortKey::Quantity),
            _ => Err(FilterError::InvalidColumn(s.to_string())),
        }
    }
}

impl FromStr for SortDirection {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortDirection::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortDirection::Desc)
        } else {
            Err(FilterError::InvalidDirection(s.to_string()))
        }
    }
}
