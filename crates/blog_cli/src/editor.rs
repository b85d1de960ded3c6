use std::env;
use std::fs;
use std::process::Command;

use anyhow::{Context, Result, bail};

const DEFAULT_EDITOR: &str = "vim";

pub fn editor_command() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_EDITOR.to_string())
}

/// Open `content` in an editor and return what was saved.
pub fn edit_text(editor: &str, content: &str) -> Result<String> {
    let file = tempfile::Builder::new()
        .prefix("blog-post-")
        .suffix(".html")
        .tempfile()
        .context("failed to create temporary file")?;
    fs::write(file.path(), content)
        .with_context(|| format!("failed to write {}", file.path().display()))?;

    let mut parts = editor.split_whitespace();
    let Some(program) = parts.next() else {
        bail!("editor command is empty");
    };
    let status = Command::new(program)
        .args(parts)
        .arg(file.path())
        .status()
        .with_context(|| format!("failed to run {program}"))?;
    if !status.success() {
        bail!("{program} exited with {status}");
    }
    fs::read_to_string(file.path())
        .with_context(|| format!("failed to read {}", file.path().display()))
}
