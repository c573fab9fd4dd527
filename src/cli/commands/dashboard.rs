use std::io::{self, Write};
use std::str::FromStr;

use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};

use crate::api::{format_currency, products_to_row_values, render_table};
use crate::cli::config::load_session;
use crate::cli::utils::{api_client, describe_form_error};
use crate::cli::OutputFormat;
use crate::client::ProductBackend;
use crate::config::config;
use crate::dashboard::{Dashboard, Outcome};
use crate::filter::SortKey;
use crate::models::{DraftField, ProductId};
use crate::view_model::{ProductListViewModel, StatusKind, StatusMessage};

const HELP: &str = "\
Commands:
  list                 show the product table
  search <text>        filter by name (case-insensitive)
  clear                remove the search filter
  sort <key>           sort by name, price or quantity; repeat to flip direction
  edit <id>            load a product into the form
  set <field> <value>  change a form field (name, price, quantity)
  save                 create or update from the form
  cancel               discard the form
  delete <id>          delete a product
  refresh              re-fetch all products
  help                 show this text
  quit                 leave the dashboard
";

/// One line typed at the dashboard prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    List,
    Search(String),
    Clear,
    Sort(SortKey),
    Edit(ProductId),
    Set(DraftField, String),
    Save,
    Cancel,
    Delete(ProductId),
    Refresh,
    Help,
    Quit,
}

impl FromStr for Action {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_start();
        let (verb, rest) = match line.split_once(' ') {
            Some((verb, rest)) => (verb, rest),
            None => (line.trim_end(), ""),
        };

        let required = |what: &str| -> Result<String, String> {
            let value = rest.trim();
            if value.is_empty() {
                Err(format!("Usage: {} <{}>", verb, what))
            } else {
                Ok(value.to_string())
            }
        };

        match verb.to_ascii_lowercase().as_str() {
            "list" | "ls" => Ok(Action::List),
            // The term is kept exactly as typed.
            "search" => Ok(Action::Search(rest.to_string())),
            "clear" => Ok(Action::Clear),
            "sort" => {
                let key = required("key")?;
                key.parse::<SortKey>().map(Action::Sort).map_err(|e| format!("{}", e))
            }
            "edit" => Ok(Action::Edit(ProductId::new(required("id")?))),
            "set" => {
                let args = required("field> <value")?;
                let Some((field, value)) = args.split_once(' ') else {
                    return Err("Usage: set <field> <value>".to_string());
                };
                let field = field.parse::<DraftField>().map_err(|e| e.message)?;
                Ok(Action::Set(field, value.trim().to_string()))
            }
            "save" => Ok(Action::Save),
            "cancel" => Ok(Action::Cancel),
            "delete" | "rm" => Ok(Action::Delete(ProductId::new(required("id")?))),
            "refresh" => Ok(Action::Refresh),
            "help" | "?" => Ok(Action::Help),
            "quit" | "exit" | "q" => Ok(Action::Quit),
            other => Err(format!("Unknown command '{}', type 'help'", other)),
        }
    }
}

/// Dashboard output, split by audience. Under `--json` stdout carries only
/// JSON documents and everything meant for a human goes to stderr.
pub struct Console<O, E> {
    format: OutputFormat,
    out: O,
    err: E,
}

impl Console<io::Stdout, io::Stderr> {
    pub fn stdio(format: OutputFormat) -> Self {
        Self::new(format, io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> Console<O, E> {
    pub fn new(format: OutputFormat, out: O, err: E) -> Self {
        Self { format, out, err }
    }

    fn note(&mut self, text: &str) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => writeln!(self.err, "{}", text.trim_end()),
            OutputFormat::Text => writeln!(self.out, "{}", text.trim_end()),
        }
    }

    fn error(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.err, "{}", text)
    }

    fn status(&mut self, status: &StatusMessage) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => {
                writeln!(self.out, "{}", serde_json::to_string(&json!({ "status": status }))?)?
            }
            OutputFormat::Text => writeln!(self.out, "{}", status_line(status.kind, &status.text))?,
        }
        Ok(())
    }

    fn show(&mut self, view: &ProductListViewModel, currency: &str) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => {
                writeln!(self.out, "{}", serde_json::to_string_pretty(&view_json(view, currency))?)?
            }
            OutputFormat::Text => write!(self.out, "{}", render_view(view, currency))?,
        }
        self.out.flush()?;
        Ok(())
    }
}

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let currency = config().display.currency.as_str();
    let mut dashboard = Dashboard::new(api_client()?, load_session()?);
    let mut console = Console::stdio(output_format);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    tracing::debug!(logged_in = dashboard.session().is_some(), "dashboard opened");
    let outcome = dashboard.mount().await;
    finish(&mut dashboard, &outcome, &mut console)?;
    console.show(dashboard.view(), currency)?;

    loop {
        let Some(line) = read_line(&mut input, "> ").await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let action = match line.parse::<Action>() {
            Ok(action) => action,
            Err(message) => {
                console.error(&message)?;
                continue;
            }
        };

        if action == Action::Quit {
            break;
        }
        let redraw = apply(&mut dashboard, action, &mut input, &mut console).await?;
        if redraw {
            console.show(dashboard.view(), currency)?;
        }
    }

    Ok(())
}
/// Run one action. Returns whether the list should be drawn again.
async fn apply<B, R, O, E>(
    dashboard: &mut Dashboard<B>,
    action: Action,
    input: &mut Lines<R>,
    console: &mut Console<O, E>,
) -> anyhow::Result<bool>
where
    B: ProductBackend,
    R: AsyncBufRead + Unpin,
    O: Write,
    E: Write,
{
    let outcome = match action {
        Action::List => return Ok(true),
        Action::Help => {
            console.note(HELP)?;
            return Ok(false);
        }
        Action::Search(term) => {
            dashboard.view_mut().set_search_term(term);
            return Ok(true);
        }
        Action::Clear => {
            dashboard.view_mut().clear_search();
            return Ok(true);
        }
        Action::Sort(key) => {
            dashboard.view_mut().request_sort(key);
            return Ok(true);
        }
        Action::Set(field, value) => {
            if let Err(e) = dashboard.view_mut().set_draft_field(field, &value) {
                console.error(&describe_form_error(&e))?;
            }
            console.note(&describe_draft(dashboard.view()))?;
            return Ok(false);
        }
        Action::Cancel => {
            dashboard.cancel_edit();
            console.note("Form cleared")?;
            return Ok(false);
        }
        Action::Edit(id) => {
            let outcome = dashboard.begin_edit(&id).await;
            if outcome.is_completed() {
                console.note(&describe_draft(dashboard.view()))?;
            }
            outcome
        }
        Action::Save => dashboard.submit().await,
        Action::Delete(id) => {
            let answer = read_line(input, "Are you sure you want to delete this product? [y/N] ").await?;
            if !matches!(answer.as_deref().map(str::trim), Some("y") | Some("Y") | Some("yes")) {
                console.note("Deletion cancelled")?;
                return Ok(false);
            }
            dashboard.delete(&id).await
        }
        Action::Refresh => dashboard.refresh().await,
        Action::Quit => return Ok(false),
    };

    finish(dashboard, &outcome, console)?;
    Ok(!matches!(outcome, Outcome::Invalid(_) | Outcome::Busy))
}

/// Report an outcome and flush the status line it left behind.
fn finish<B, O, E>(
    dashboard: &mut Dashboard<B>,
    outcome: &Outcome,
    console: &mut Console<O, E>,
) -> anyhow::Result<()>
where
    B: ProductBackend,
    O: Write,
    E: Write,
{
    match outcome {
        Outcome::Busy => console.error("Still working on the previous request")?,
        Outcome::Invalid(form) if !form.field_errors.is_empty() => {
            console.error(&describe_form_error(form))?
        }
        Outcome::NeedsLogin => {
            // Pick up a login made from another terminal.
            dashboard.set_session(load_session()?);
            console.error("Run `inventory auth login <username>` and try again")?;
        }
        _ => {}
    }

    if let Some(status) = dashboard.view().status().cloned() {
        console.status(&status)?;
    }
    dashboard.view_mut().clear_status();
    Ok(())
}

/// Prompts go to stderr so stdout stays clean in every output format.
async fn read_line<R>(input: &mut Lines<R>, label: &str) -> anyhow::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut stderr = tokio::io::stderr();
    stderr.write_all(label.as_bytes()).await?;
    stderr.flush().await?;
    Ok(input.next_line().await?)
}

fn status_line(kind: StatusKind, text: &str) -> String {
    let tag = match kind {
        StatusKind::Success => "ok",
        StatusKind::Info => "info",
        StatusKind::Danger => "error",
    };
    format!("[{}] {}", tag, text)
}

fn view_json(view: &ProductListViewModel, currency: &str) -> Value {
    json!({
        "products": products_to_row_values(&view.visible(), currency),
        "total": view.total_products(),
        "search": view.search_term(),
        "sort": view.sort_directive().map(|d| d.to_string()),
        "editing": view.edit_target(),
    })
}

pub fn render_view(view: &ProductListViewModel, currency: &str) -> String {
    let mut out = format!("Total products: {}\n", view.total_products());
    if !view.search_term().is_empty() {
        out.push_str(&format!("Search: \"{}\"\n", view.search_term()));
    }

    let visible = view.visible();
    if visible.is_empty() {
        out.push_str(view.empty_message());
        out.push('\n');
    } else {
        out.push_str(&render_table(&visible, view.sort_directive().as_ref(), currency));
    }

    if view.is_editing() || !view.draft().is_empty() {
        out.push_str(&describe_draft(view));
    }
    out
}

fn describe_draft(view: &ProductListViewModel) -> String {
    let draft = view.draft();
    let heading = match view.edit_target() {
        Some(id) => format!("Editing product {}", id),
        None => "New product".to_string(),
    };
    let price = draft
        .price
        .map(|p| format_currency(p, &config().display.currency))
        .unwrap_or_else(|| "-".to_string());
    let quantity = draft
        .quantity
        .map(|q| q.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{}: name={:?} price={} quantity={}\n",
        heading, draft.name, price, quantity
    )
}
