use std::collections::HashSet;

use scraper::{Html, Selector};

pub struct Sanitizer {
    cleaner: ammonia::Builder<'static>,
}

impl Sanitizer {
    pub fn new() -> Self {
        let mut cleaner = ammonia::Builder::empty();
        // Text inside removed elements survives, matching a plain tag strip.
        cleaner
            .clean_content_tags(HashSet::new())
            .strip_comments(true);
        Self { cleaner }
    }

    pub fn plain_text(&self, value: &str) -> String {
        let decoded = html_escape::decode_html_entities(value);
        let stripped = self.cleaner.clean(&decoded).to_string();
        html_escape::decode_html_entities(&stripped).into_owned()
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

pub fn image_sources(value: &str) -> Option<Vec<String>> {
    let selector = Selector::parse("img").ok()?;
    let fragment = Html::parse_fragment(value);
    let mut images = fragment.select(&selector).peekable();
    images.peek()?;
    Some(
        images
            .filter_map(|img| img.value().attr("src"))
            .map(str::trim)
            .filter(|src| !src.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

pub fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}
