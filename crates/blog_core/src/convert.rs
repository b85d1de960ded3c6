//! Markdown to HTML conversion and title/summary extraction.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};
use regex::Regex;

use crate::error::BlogError;
use crate::images::normalize_wiki_images;

static H1_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<h1(?:\s[^>]*)?>").expect("h1 regex"));

static HORIZONTAL_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<hr\s*/?>").expect("hr regex"));

const H1_CLOSE: &str = "</h1>";

/// Turns Markdown into an HTML5 fragment. A paragraph holding only an image
/// must come out as a `<figure>` with the alt text as `<figcaption>`.
pub trait MarkdownRenderer {
    fn render(&self, markdown: &str) -> Result<String, BlogError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CmarkRenderer;

impl MarkdownRenderer for CmarkRenderer {
    fn render(&self, markdown: &str) -> Result<String, BlogError> {
        Ok(render_markdown_with_figures(markdown))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedDoc {
    pub title: String,
    pub body: String,
    pub summary: String,
}

pub fn read_source(path: &Path) -> Result<String, BlogError> {
    if !path.is_file() {
        return Err(BlogError::FileNotFound(path.to_path_buf()));
    }
    Ok(fs::read_to_string(path)?)
}

pub fn convert_file(path: &Path, renderer: &dyn MarkdownRenderer) -> Result<ConvertedDoc, BlogError> {
    let markdown = read_source(path)?;
    convert(&markdown, renderer)
}

pub fn convert(markdown: &str, renderer: &dyn MarkdownRenderer) -> Result<ConvertedDoc, BlogError> {
    let html = renderer.render(&normalize_wiki_images(markdown))?;
    split_rendered(&html)
}

pub fn split_rendered(html: &str) -> Result<ConvertedDoc, BlogError> {
    let open = H1_OPEN.find(html).ok_or(BlogError::NoTitleFound)?;
    let title_len = html[open.end()..]
        .find(H1_CLOSE)
        .ok_or(BlogError::NoTitleFound)?;
    let title = html[open.end()..open.end() + title_len].trim().to_string();
    let rest = &html[open.end() + title_len + H1_CLOSE.len()..];

    let summary = rest
        .lines()
        .skip(1)
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string();
    let body = match HORIZONTAL_RULE.find(rest) {
        Some(rule) => &rest[..rule.start()],
        None => rest,
    };
    Ok(ConvertedDoc {
        title,
        body: body.trim().to_string(),
        summary,
    })
}

fn render_markdown_with_figures(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);
    let mut events = Vec::new();
    let mut paragraph: Option<Vec<Event<'_>>> = None;

    for event in parser {
        let event = match event {
            Event::SoftBreak => Event::Text(CowStr::Borrowed(" ")),
            other => other,
        };
        if let Some(buffer) = paragraph.as_mut() {
            if matches!(event, Event::End(TagEnd::Paragraph)) {
                let buffer = paragraph.take().unwrap_or_default();
                match lone_image_figure(&buffer) {
                    Some(figure) => events.push(Event::Html(figure.into())),
                    None => {
                        events.push(Event::Start(Tag::Paragraph));
                        events.extend(buffer);
                        events.push(Event::End(TagEnd::Paragraph));
                    }
                }
            } else {
                buffer.push(event);
            }
            continue;
        }
        if matches!(event, Event::Start(Tag::Paragraph)) {
            paragraph = Some(Vec::new());
            continue;
        }
        events.push(event);
    }

    let mut html_out = String::new();
    html::push_html(&mut html_out, events.into_iter());
    html_out
}

fn lone_image_figure(events: &[Event<'_>]) -> Option<String> {
    let (first, rest) = events.split_first()?;
    let Event::Start(Tag::Image { dest_url, .. }) = first else {
        return None;
    };
    let (last, inner) = rest.split_last()?;
    if !matches!(last, Event::End(TagEnd::Image)) {
        return None;
    }
    let mut alt = String::new();
    for event in inner {
        match event {
            Event::Text(text) | Event::Code(text) => alt.push_str(text),
            Event::Start(Tag::Image { .. }) | Event::End(TagEnd::Image) => return None,
            _ => {}
        }
    }
    Some(format!(
        "<figure>\n<img src=\"{}\" alt=\"{}\" />\n<figcaption>{}</figcaption>\n</figure>\n",
        escape_attr(dest_url),
        escape_attr(&alt),
        escape_html_text(&alt)
    ))
}

fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_html_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}
