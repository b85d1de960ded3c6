use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = "blog.yaml";

const DEFAULT_POSTS_DIR: &str = "posts";
const DEFAULT_IMAGES_DIR: &str = "app/static/post_images";
const DEFAULT_DATABASE: &str = "blog.db";
const DEFAULT_IMAGE_PREFIX: &str = "/static/post_images";
const DEFAULT_LINK_PREFIX: &str = "/blog";
const DEFAULT_RESIZE_COMMAND: &str = "convert";
const DEFAULT_RESIZE_QUALITY: u8 = 85;
const DEFAULT_PANDOC: &str = "pandoc";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogConfig {
    pub paths: PathsConfig,
    pub publish: PublishConfig,
    pub resize: ResizeConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathsConfig {
    pub notes_dir: Option<PathBuf>,
    pub posts_dir: PathBuf,
    pub images_dir: PathBuf,
    pub database: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishConfig {
    pub image_prefix: String,
    pub link_prefix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeBackend {
    #[default]
    Magick,
    Native,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeConfig {
    pub backend: ResizeBackend,
    pub command: String,
    pub quality: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderBackend {
    #[default]
    Cmark,
    Pandoc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    pub backend: RenderBackend,
    pub pandoc: String,
}

impl BlogConfig {
    pub fn with_root(root: &Path) -> Self {
        Self {
            paths: PathsConfig {
                notes_dir: None,
                posts_dir: root.join(DEFAULT_POSTS_DIR),
                images_dir: root.join(DEFAULT_IMAGES_DIR),
                database: root.join(DEFAULT_DATABASE),
            },
            publish: PublishConfig {
                image_prefix: DEFAULT_IMAGE_PREFIX.to_string(),
                link_prefix: DEFAULT_LINK_PREFIX.to_string(),
            },
            resize: ResizeConfig {
                backend: ResizeBackend::default(),
                command: DEFAULT_RESIZE_COMMAND.to_string(),
                quality: DEFAULT_RESIZE_QUALITY,
            },
            render: RenderConfig {
                backend: RenderBackend::default(),
                pandoc: DEFAULT_PANDOC.to_string(),
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct BlogConfigRaw {
    paths: Option<PathsConfigRaw>,
    publish: Option<PublishConfigRaw>,
    resize: Option<ResizeConfigRaw>,
    render: Option<RenderConfigRaw>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PathsConfigRaw {
    notes_dir: Option<PathBuf>,
    posts_dir: Option<PathBuf>,
    images_dir: Option<PathBuf>,
    database: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PublishConfigRaw {
    image_prefix: Option<String>,
    link_prefix: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ResizeConfigRaw {
    backend: Option<ResizeBackend>,
    command: Option<String>,
    quality: Option<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RenderConfigRaw {
    backend: Option<RenderBackend>,
    pandoc: Option<String>,
}

pub fn load_blog_config(path: &Path) -> Result<BlogConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let root = path.parent().unwrap_or_else(|| Path::new("."));
    parse_blog_config(&raw, root)
        .with_context(|| format!("invalid config {}", path.display()))
}

pub fn parse_blog_config(raw: &str, root: &Path) -> Result<BlogConfig> {
    let parsed: BlogConfigRaw = if raw.trim().is_empty() {
        BlogConfigRaw::default()
    } else {
        serde_yaml::from_str::<Option<BlogConfigRaw>>(raw)
            .context("failed to parse YAML config")?
            .unwrap_or_default()
    };
    let mut config = BlogConfig::with_root(root);

    if let Some(paths) = parsed.paths {
        config.paths.notes_dir = paths.notes_dir.map(|dir| root.join(dir));
        if let Some(dir) = paths.posts_dir {
            config.paths.posts_dir = root.join(dir);
        }
        if let Some(dir) = paths.images_dir {
            config.paths.images_dir = root.join(dir);
        }
        if let Some(database) = paths.database {
            config.paths.database = root.join(database);
        }
    }

    if let Some(publish) = parsed.publish {
        if let Some(prefix) = publish.image_prefix {
            config.publish.image_prefix = required_prefix(prefix, "publish.image_prefix")?;
        }
        if let Some(prefix) = publish.link_prefix {
            config.publish.link_prefix = required_prefix(prefix, "publish.link_prefix")?;
        }
    }

    if let Some(resize) = parsed.resize {
        if let Some(backend) = resize.backend {
            config.resize.backend = backend;
        }
        if let Some(command) = resize.command {
            config.resize.command = required_string(command, "resize.command")?;
        }
        if let Some(quality) = resize.quality {
            if !(1..=100).contains(&quality) {
                bail!("resize.quality must be between 1 and 100, got {quality}");
            }
            config.resize.quality = quality;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(backend) = render.backend {
            config.render.backend = backend;
        }
        if let Some(pandoc) = render.pandoc {
            config.render.pandoc = required_string(pandoc, "render.pandoc")?;
        }
    }

    Ok(config)
}

fn required_string(value: String, key: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        bail!("{key} must not be empty");
    }
    Ok(value.to_string())
}

fn required_prefix(value: String, key: &str) -> Result<String> {
    let value = required_string(value, key)?;
    let trimmed = value.trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    Ok(trimmed.to_string())
}
