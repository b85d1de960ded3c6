use std::io::Write;
use std::process::{Command, Stdio};

use blog_core::BlogError;
use blog_core::config::{RenderBackend, RenderConfig};
use blog_core::convert::{CmarkRenderer, MarkdownRenderer};
use tracing::debug;

const PANDOC_ARGS: [&str; 5] = [
    "-f",
    "markdown+implicit_figures",
    "-t",
    "html5",
    "--wrap=none",
];

/// Renders through an external `pandoc`, markdown on stdin and HTML5 on stdout.
pub struct PandocRenderer {
    program: String,
}

impl PandocRenderer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl MarkdownRenderer for PandocRenderer {
    fn render(&self, markdown: &str) -> Result<String, BlogError> {
        debug!(program = %self.program, "running pandoc");
        let mut child = Command::new(&self.program)
            .args(PANDOC_ARGS)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| BlogError::Render(format!("failed to run {}: {err}", self.program)))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(markdown.as_bytes())?;
        }
        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(BlogError::Render(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        String::from_utf8(output.stdout)
            .map_err(|err| BlogError::Render(format!("{} wrote invalid UTF-8: {err}", self.program)))
    }
}

pub fn renderer_for(config: &RenderConfig) -> Box<dyn MarkdownRenderer> {
    match config.backend {
        RenderBackend::Cmark => Box::new(CmarkRenderer),
        RenderBackend::Pandoc => Box::new(PandocRenderer::new(config.pandoc.clone())),
    }
}
