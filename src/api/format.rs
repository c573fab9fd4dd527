use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{json, Value};

use crate::filter::{SortDirective, SortKey};
use crate::models::Product;

/// `LKR 1,234.50` - currency code, thousands separators, two decimals.
pub fn format_currency(amount: Decimal, currency: &str) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let digits = format!("{:.2}", rounded.abs());
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}{} {}.{}", sign, currency, group_thousands(whole), fraction)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Total value for display; `N/A` when it cannot be computed.
pub fn format_total_value(product: &Product, currency: &str) -> String {
    match product.total_value() {
        Some(total) => format_currency(total, currency),
        None => "N/A".to_string(),
    }
}

/// One product as a display row for `--json` output. Amounts are JSON
/// numbers, like the payloads sent to the backend.
pub fn product_to_row_value(product: &Product, currency: &str) -> Value {
    let status = product.stock_status();
    json!({
        "id": product.id,
        "name": product.name,
        "price": product.price.to_f64(),
        "quantity": product.quantity,
        "total_value": product.total_value().and_then(|t| t.to_f64()),
        "price_display": format_currency(product.price, currency),
        "total_value_display": format_total_value(product, currency),
        "stock_status": status,
        "stock_label": status.label(),
        "created_at": product.created_at.map(|dt| dt.to_rfc3339()),
    })
}

pub fn products_to_row_values(products: &[Product], currency: &str) -> Vec<Value> {
    products
        .iter()
        .map(|p| product_to_row_value(p, currency))
        .collect()
}

fn header(label: &str, key: SortKey, sort: Option<&SortDirective>) -> String {
    match sort {
        Some(d) if d.key == key => format!("{} {}", label, d.direction.indicator()),
        _ => label.to_string(),
    }
}

/// Plain-text table of the derived list, with a caret on the sorted column.
pub fn render_table(products: &[Product], sort: Option<&SortDirective>, currency: &str) -> String {
    let headers = vec![
        "ID".to_string(),
        header("Name", SortKey::Name, sort),
        header("Price", SortKey::Price, sort),
        header("Quantity", SortKey::Quantity, sort),
        "Total Value".to_string(),
        "Status".to_string(),
    ];

    let rows: Vec<Vec<String>> = products
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.name.clone(),
                format_currency(p.price, currency),
                p.quantity.to_string(),
                format_total_value(p, currency),
                p.stock_status().label().to_string(),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &headers, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

pub fn render_detail(product: &Product, currency: &str) -> String {
    let created = product
        .created_at
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string());
    format!(
        "{}\n  ID:          {}\n  Price:       {}\n  Quantity:    {} ({})\n  Total Value: {}\n  Created At:  {}\n",
        product.name,
        product.id,
        format_currency(product.price, currency),
        product.quantity,
        product.stock_status().label(),
        format_total_value(product, currency),
        created,
    )
}
