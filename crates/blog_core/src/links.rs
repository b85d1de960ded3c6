//! Wiki-style `[[Post title|link text]]` references between posts.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::BlogError;
use crate::handle::title_handle;
use crate::model::Visibility;
use crate::store::PostStore;

static INTERNAL_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[\[(.+?)\]\]").expect("internal link regex"));

/// Links only resolve to published posts, even though unlisted posts are
/// reachable by handle.
const LINK_TARGET_VISIBILITY: Visibility = Visibility::Published;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalLink {
    pub title: String,
    pub text: String,
}

pub fn get_internal_links(html: &str) -> Vec<String> {
    INTERNAL_LINK
        .captures_iter(html)
        .map(|caps| caps[1].to_string())
        .collect()
}

pub fn parse_internal_link(link: &str) -> InternalLink {
    match link.split_once('|') {
        Some((title, text)) => InternalLink {
            title: title.to_string(),
            text: text.to_string(),
        },
        None => InternalLink {
            title: link.to_string(),
            text: link.to_string(),
        },
    }
}

pub fn resolve_link_handle(link: &InternalLink, store: &dyn PostStore) -> Result<String, BlogError> {
    let handle = title_handle(&link.title)
        .map_err(|_| BlogError::UnresolvedLink(link.title.clone()))?;
    let matches = store.find_by_handle(&handle, LINK_TARGET_VISIBILITY)?;
    if matches.len() != 1 {
        return Err(BlogError::UnresolvedLink(handle));
    }
    Ok(handle)
}

pub fn rewrite_internal_links(
    html: &str,
    link_prefix: &str,
    store: &dyn PostStore,
) -> Result<String, BlogError> {
    let link_prefix = link_prefix.trim_end_matches('/');
    let mut replacements = Vec::new();
    for raw in get_internal_links(html) {
        let link = parse_internal_link(&raw);
        let handle = resolve_link_handle(&link, store)?;
        debug!(link = %raw, handle = %handle, "resolved internal link");
        let anchor = format!("<a href='{link_prefix}/{handle}'>{}</a>", link.text);
        replacements.push((format!("[[{raw}]]"), anchor));
    }
    let mut out = html.to_string();
    for (needle, anchor) in replacements {
        out = out.replace(&needle, &anchor);
    }
    Ok(out)
}
