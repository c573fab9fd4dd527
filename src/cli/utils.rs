use std::io::{self, BufRead, Write};

use serde_json::{json, Value};

use crate::cli::config::load_session;
use crate::cli::OutputFormat;
use crate::client::ApiClient;
use crate::config::config;
use crate::models::{FormError, Session};

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&success_body(message, data))?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

fn success_body(message: &str, data: Option<Value>) -> Value {
    let mut response = json!({
        "success": true,
        "message": message
    });

    match data {
        Some(Value::Object(fields)) => {
            if let Some(body) = response.as_object_mut() {
                body.extend(fields);
            }
        }
        Some(other) => response["data"] = other,
        None => {}
    }
    response
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Print `value` as JSON, or `text` verbatim.
pub fn output_value(output_format: &OutputFormat, text: &str, value: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => print!("{}", text),
    }
    Ok(())
}

/// Flatten a form error into one line: `message (field: reason; ...)`.
pub fn describe_form_error(error: &FormError) -> String {
    if error.field_errors.is_empty() {
        return error.message.clone();
    }
    let details: Vec<String> = error
        .field_errors
        .iter()
        .map(|(field, reason)| format!("{}: {}", field, reason))
        .collect();
    format!("{} ({})", error.message, details.join("; "))
}

pub fn form_error(error: FormError) -> anyhow::Error {
    anyhow::anyhow!(describe_form_error(&error))
}

pub fn api_client() -> anyhow::Result<ApiClient> {
    Ok(ApiClient::from_config(&config().api)?)
}

pub fn require_session() -> anyhow::Result<Session> {
    load_session()?
        .ok_or_else(|| anyhow::anyhow!("Not logged in. Run `inventory auth login <username>` first"))
}

/// Read one line from stdin after printing `label`. Trailing newline removed.
pub fn prompt(label: &str) -> anyhow::Result<String> {
    eprint!("{}", label);
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub fn confirm(question: &str) -> anyhow::Result<bool> {
    let answer = prompt(&format!("{} [y/N] ", question))?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
