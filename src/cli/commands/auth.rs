use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{clear_session, load_session, save_session};
use crate::cli::utils::{api_client, form_error, output_error, output_success, prompt};
use crate::cli::OutputFormat;
use crate::client::AuthBackend;
use crate::models::{LoginForm, RegisterForm, Session};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login and store the session token")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Create a new account")]
    Register {
        #[arg(help = "Display name")]
        name: String,
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (will prompt twice if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Forget the stored session")]
    Logout,

    #[command(about = "Show current user information")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { username, password } => login(username, password, &output_format).await,
        AuthCommands::Register {
            name,
            username,
            password,
        } => register(name, username, password, &output_format).await,
        AuthCommands::Logout => {
            if clear_session()? {
                output_success(&output_format, "Logged out", None)
            } else {
                output_success(&output_format, "No active session", None)
            }
        }
        AuthCommands::Whoami => match load_session()? {
            Some(session) => whoami(&session, &output_format),
            None => output_error(&output_format, "Not logged in", Some("NOT_LOGGED_IN")),
        },
    }
}

async fn login(
    username: String,
    password: Option<String>,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt("Password: ")?,
    };

    let form = LoginForm::new(username, password);
    form.validate().map_err(form_error)?;

    let session = api_client()?.login(&form).await?;
    save_session(&session)?;

    output_success(
        output_format,
        &format!("Logged in as {}", session.user.display_name()),
        Some(json!({ "user": session.user })),
    )
}

async fn register(
    name: String,
    username: String,
    password: Option<String>,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    let (password, confirm_password) = match password {
        Some(p) => (p.clone(), p),
        None => (prompt("Password: ")?, prompt("Confirm password: ")?),
    };

    let form = RegisterForm {
        name,
        username,
        password,
        confirm_password,
    };
    form.validate().map_err(form_error)?;

    match api_client()?.register(&form.to_request()).await? {
        Some(session) => {
            save_session(&session)?;
            output_success(
                output_format,
                &format!("Registration successful, logged in as {}", session.user.display_name()),
                Some(json!({ "user": session.user })),
            )
        }
        None => output_success(
            output_format,
            "Registration successful! Please log in.",
            Some(json!({ "username": form.username })),
        ),
    }
}

fn whoami(session: &Session, output_format: &OutputFormat) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "user": session.user }))?);
        }
        OutputFormat::Text => {
            println!("Username: {}", session.user.username);
            if let Some(name) = &session.user.name {
                println!("Name: {}", name);
            }
            if let Some(id) = &session.user.id {
                println!("ID: {}", id);
            }
        }
    }
    Ok(())
}
