use clap::Subcommand;
use serde_json::{json, Value};

use crate::api::{product_to_row_value, products_to_row_values, render_detail, render_table};
use crate::cli::utils::{
    api_client, confirm, form_error, output_success, output_value,
    require_session,
};
use crate::cli::OutputFormat;
use crate::client::ProductBackend;
use crate::config::config;
use crate::filter::FilterOrder;
use crate::models::{DraftField, ProductDraft, ProductId};
use crate::view_model::ProductListViewModel;

#[derive(Subcommand)]
pub enum ProductCommands {
    #[command(about = "List products")]
    List {
        #[arg(long, help = "Case-insensitive name filter")]
        search: Option<String>,
        #[arg(long, help = "Sort order, e.g. \"price desc\" (keys: name, price, quantity)")]
        sort: Option<String>,
    },

    #[command(about = "Show a single product")]
    Show {
        #[arg(help = "Product ID")]
        id: String,
    },

    #[command(about = "Add a product")]
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, help = "Unit price")]
        price: String,
        #[arg(long, help = "Units in stock")]
        quantity: String,
    },

    #[command(about = "Change fields of an existing product")]
    Update {
        #[arg(help = "Product ID")]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        quantity: Option<String>,
    },

    #[command(about = "Delete a product")]
    Delete {
        #[arg(help = "Product ID")]
        id: String,
        #[arg(long, short, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

pub async fn handle(cmd: ProductCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let currency = config().display.currency.as_str();

    match cmd {
        ProductCommands::List { search, sort } => {
            let products = api_client()?.list_products().await?;
            let mut view = ProductListViewModel::with_products(products);
            if let Some(term) = search {
                view.set_search_term(term);
            }
            if let Some(order) = sort {
                view.set_sort(FilterOrder::parse(&order)?);
            }

            let (text, value) = render_list(&view, currency);
            output_value(&output_format, &text, &value)
        }

        ProductCommands::Show { id } => {
            let product = api_client()?.get_product(&ProductId::new(id)).await?;
            output_value(
                &output_format,
                &render_detail(&product, currency),
                &product_to_row_value(&product, currency),
            )
        }

        ProductCommands::Create {
            name,
            price,
            quantity,
        } => {
            let session = require_session()?;
            let mut draft = ProductDraft::default();
            draft.set_field(DraftField::Name, &name).map_err(form_error)?;
            draft.set_field(DraftField::Price, &price).map_err(form_error)?;
            draft.set_field(DraftField::Quantity, &quantity).map_err(form_error)?;
            let payload = draft.to_payload().map_err(form_error)?;

            let product = api_client()?.create_product(&session, &payload).await?;
            output_success(
                &output_format,
                "Product added successfully!",
                Some(json!({ "product": product_to_row_value(&product, currency) })),
            )
        }

        ProductCommands::Update {
            id,
            name,
            price,
            quantity,
        } => {
            let session = require_session()?;
            let client = api_client()?;
            let id = ProductId::new(id);
            let current = client.get_product(&id).await?;

            let mut draft = ProductDraft::from_product(&current);
            let changes = [
                (DraftField::Name, name),
                (DraftField::Price, price),
                (DraftField::Quantity, quantity),
            ];
            for (field, value) in changes {
                if let Some(value) = value {
                    draft.set_field(field, &value).map_err(form_error)?;
                }
            }
            let payload = draft.to_payload().map_err(form_error)?;

            let product = client.update_product(&session, &id, &payload).await?;
            output_success(
                &output_format,
                "Product updated successfully!",
                Some(json!({ "product": product_to_row_value(&product, currency) })),
            )
        }

        ProductCommands::Delete { id, yes } => {
            let session = require_session()?;
            if !yes && !confirm("Are you sure you want to delete this product?")? {
                return output_success(&output_format, "Deletion cancelled", None);
            }

            let id = ProductId::new(id);
            api_client()?.delete_product(&session, &id).await?;
            output_success(
                &output_format,
                "Product deleted successfully!",
                Some(json!({ "id": id })),
            )
        }
    }
}

/// Text and JSON renderings of the derived list. The JSON shape is the same
/// whether or not anything matched.
fn render_list(view: &ProductListViewModel, currency: &str) -> (String, Value) {
    let visible = view.visible();
    let value = json!({
        "products": products_to_row_values(&visible, currency),
        "total": view.total_products(),
    });

    let text = if visible.is_empty() {
        format!("{}\n", view.empty_message())
    } else {
        format!(
            "{}\nShowing {} of {} products\n",
            render_table(&visible, view.sort_directive().as_ref(), currency),
            visible.len(),
            view.total_products()
        )
    };
    (text, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;
    use rust_decimal::Decimal;

    fn fruit() -> ProductListViewModel {
        let product = |id: &str, name: &str, price: i64, quantity: u32| Product {
            id: ProductId::new(id),
            name: name.into(),
            price: Decimal::from(price),
            quantity,
            created_at: None,
        };
        ProductListViewModel::with_products(vec![
            product("1", "Apple", 10, 0),
            product("2", "Banana", 5, 10),
        ])
    }

    #[test]
    fn list_json_has_the_same_keys_when_nothing_matches() {
        let mut view = fruit();
        let (_, full) = render_list(&view, "LKR");

        view.set_search_term("kiwi");
        let (text, empty) = render_list(&view, "LKR");
        assert_eq!(text, "No matching products found\n");
        assert_eq!(empty, json!({ "products": [], "total": 2 }));

        let keys = |v: &Value| v.as_object().unwrap().keys().cloned().collect::<Vec<_>>();
        assert_eq!(keys(&full), keys(&empty));
    }

    #[test]
    fn list_text_reports_visible_count() {
        let mut view = fruit();
        view.set_search_term("an");
        let (text, value) = render_list(&view, "LKR");
        assert!(text.ends_with("Showing 1 of 2 products\n"));
        assert_eq!(value["products"][0]["name"], "Banana");
    }
}
