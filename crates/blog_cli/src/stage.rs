use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use blog_core::config::BlogConfig;
use blog_core::convert::read_source;
use blog_core::images::find_markdown_images;
use tracing::info;

#[derive(Debug, Default)]
pub struct StageSummary {
    pub post_path: PathBuf,
    pub images: Vec<PathBuf>,
}

/// Copy a note and every local image it references out of the notes
/// directory and into the blog's posts and images directories.
pub fn stage_note(note: &Path, config: &BlogConfig) -> Result<StageSummary> {
    let note_path = resolve_note(note, config)?;
    let markdown = read_source(&note_path)?;
    let Some(file_name) = note_path.file_name() else {
        bail!("not a file: {}", note_path.display());
    };
    let image_root = match &config.paths.notes_dir {
        Some(dir) => dir.clone(),
        None => note_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    let mut summary = StageSummary::default();
    for image in find_markdown_images(&markdown) {
        if image.is_remote() {
            continue;
        }
        let from = image_root.join(&image.path);
        let to = config.paths.images_dir.join(&image.path);
        copy_file(&from, &to)?;
        info!("copied {}", to.display());
        summary.images.push(to);
    }

    let post_path = config.paths.posts_dir.join(file_name);
    copy_file(&note_path, &post_path)?;
    info!("staged {}", post_path.display());
    summary.post_path = post_path;
    Ok(summary)
}

fn resolve_note(note: &Path, config: &BlogConfig) -> Result<PathBuf> {
    if note.is_file() {
        return Ok(note.to_path_buf());
    }
    if let Some(notes_dir) = &config.paths.notes_dir {
        let candidate = notes_dir.join(note);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    bail!("note not found: {}", note.display());
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::copy(from, to)
        .with_context(|| format!("failed to copy {} to {}", from.display(), to.display()))?;
    Ok(())
}
