//! Image references, in Markdown sources and in rendered HTML.

use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::resize::reduced_variant_path;

static WIKI_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[\[([\w.-]+)(?:\|(.*?))?\]\]").expect("wiki image regex"));

static MARKDOWN_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"!\[([^\]]*)\]\(([^)\s]+)(?:\s+"[^"]*")?\)"#).expect("markdown image regex")
});

static HTML_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<img src="([^"]*)"([^>]*)>"#).expect("img tag regex"));

static HTML_MEDIA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<(?:img|video) src="([^"]+)""#).expect("media tag regex"));

static FIGCAPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(<figcaption[^>]*>)(.*?)(</figcaption>)").expect("figcaption regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownImage {
    pub path: String,
    pub caption: String,
}

impl MarkdownImage {
    pub fn new(path: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            caption: caption.into(),
        }
    }

    pub fn is_remote(&self) -> bool {
        self.path.contains("://")
    }
}

pub fn find_markdown_images(markdown: &str) -> Vec<MarkdownImage> {
    let wiki = WIKI_IMAGE.captures_iter(markdown).map(|caps| {
        MarkdownImage::new(
            &caps[1],
            caps.get(2).map(|m| m.as_str()).unwrap_or_default(),
        )
    });
    let standard = MARKDOWN_IMAGE
        .captures_iter(markdown)
        .map(|caps| MarkdownImage::new(&caps[2], &caps[1]));
    wiki.chain(standard).collect()
}

pub fn normalize_wiki_images(markdown: &str) -> String {
    WIKI_IMAGE
        .replace_all(markdown, |caps: &Captures<'_>| {
            let caption = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            format!("![{caption}]({})", &caps[1])
        })
        .into_owned()
}

/// Point `<img>` tags at the published image prefix.
///
/// Only sources present in `images_dir` are touched. When a reduced variant
/// exists the tag shows it and links to the full-size original. Sources that
/// are already absolute, remote or under `prefix` are left alone, so a second
/// pass is a no-op.
pub fn rewrite_images(html: &str, prefix: &str, images_dir: &Path) -> String {
    let prefix = prefix.trim_end_matches('/');
    HTML_IMAGE
        .replace_all(html, |caps: &Captures<'_>| {
            let src = &caps[1];
            let rest = &caps[2];
            if is_published_source(src, prefix) || !images_dir.join(src).is_file() {
                return caps[0].to_string();
            }
            let reduced = reduced_variant_path(src);
            if images_dir.join(&reduced).is_file() {
                debug!(src, reduced = %reduced, "linking reduced image to original");
                format!("<a href=\"{prefix}/{src}\"><img src=\"{prefix}/{reduced}\"{rest}></a>")
            } else {
                debug!(src, "prefixing image source");
                format!("<img src=\"{prefix}/{src}\"{rest}>")
            }
        })
        .into_owned()
}

fn is_published_source(src: &str, prefix: &str) -> bool {
    src.is_empty()
        || src.starts_with('/')
        || src.contains("://")
        || (!prefix.is_empty() && src.starts_with(&format!("{prefix}/")))
}

pub fn find_html_media(html: &str) -> Vec<String> {
    HTML_MEDIA
        .captures_iter(html)
        .map(|caps| caps[1].to_string())
        .collect()
}

pub fn strip_caption_directives(html: &str) -> String {
    FIGCAPTION
        .replace_all(html, |caps: &Captures<'_>| {
            let caption = &caps[2];
            let caption = match caption.split_once('|') {
                Some((text, _)) => text.trim_end(),
                None => caption,
            };
            format!("{}{caption}{}", &caps[1], &caps[3])
        })
        .into_owned()
}
