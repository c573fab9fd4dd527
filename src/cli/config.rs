use std::fs;
use std::path::{Path, PathBuf};

use crate::models::Session;

const SESSION_FILE: &str = "session.json";

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("INVENTORY_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("inventory").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn session_file() -> anyhow::Result<PathBuf> {
    Ok(get_config_dir()?.join(SESSION_FILE))
}

pub fn load_session() -> anyhow::Result<Option<Session>> {
    read_session(&session_file()?)
}

pub fn save_session(session: &Session) -> anyhow::Result<()> {
    write_session(&session_file()?, session)
}

/// Returns whether a session was actually removed.
pub fn clear_session() -> anyhow::Result<bool> {
    remove_session(&session_file()?)
}

pub fn read_session(path: &Path) -> anyhow::Result<Option<Session>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    let session: Session = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Corrupt session file {}: {}", path.display(), e))?;
    Ok(Some(session))
}

pub fn write_session(path: &Path, session: &Session) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(session)?;
    fs::write(path, content)?;
    Ok(())
}

pub fn remove_session(path: &Path) -> anyhow::Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path)?;
    Ok(true)
}
