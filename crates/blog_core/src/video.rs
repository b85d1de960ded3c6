use std::sync::LazyLock;

use regex::Regex;

static VIDEO_OPEN_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(<video src="[^>]*)>"#).expect("video tag regex"));

/// Make every `<video src=..>` autoplay, muted and looping.
///
/// Not idempotent: running it twice repeats the attributes.
pub fn add_autoplay(html: &str) -> String {
    VIDEO_OPEN_TAG
        .replace_all(html, "${1} autoplay muted loop>")
        .into_owned()
}
