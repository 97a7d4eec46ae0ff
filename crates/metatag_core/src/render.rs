//! Resolved tags to ordered, escaped head elements

use std::collections::BTreeMap;
use std::fmt::Write;

use tracing::warn;

use crate::model::{
    HtmlTag, OutputElement, RenderContext, ResolvedTagSet, TagDefinition, TagKind,
};
use crate::registry::TagRegistry;
use crate::sanitize::{Sanitizer, escape_attr, image_sources};
use crate::tokens::{MetatagTokens, TokenSubstitutor};
use crate::trim::{TrimMethod, trim_value};

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub base_url: Option<String>,
    pub max_length: BTreeMap<String, usize>,
    pub trim_method: TrimMethod,
}

pub struct ElementRenderer<'a, T: TokenSubstitutor + ?Sized> {
    registry: &'a TagRegistry,
    tokens: MetatagTokens<'a, T>,
    options: &'a RenderOptions,
    sanitizer: Sanitizer,
}

impl<'a, T: TokenSubstitutor + ?Sized> ElementRenderer<'a, T> {
    pub fn new(registry: &'a TagRegistry, substitutor: &'a T, options: &'a RenderOptions) -> Self {
        Self {
            registry,
            tokens: MetatagTokens::new(substitutor),
            options,
            sanitizer: Sanitizer::new(),
        }
    }

    pub fn render(&self, resolved: &ResolvedTagSet, ctx: &RenderContext) -> Vec<OutputElement> {
        let mut entries: Vec<(&str, &str)> = resolved.iter().collect();
        entries.sort_by_key(|(name, _)| self.registry.sort_key(name));

        let mut elements = Vec::new();
        for (name, raw) in entries {
            if raw.trim().is_empty() {
                continue;
            }
            let fallback;
            let tag = match self.registry.get_tag(name) {
                Some(tag) => tag,
                None => {
                    warn!(tag = name, "unregistered meta tag rendered in the basic group");
                    fallback = TagDefinition::unregistered(name);
                    &fallback
                }
            };
            let substituted = match self.tokens.replace(raw, ctx) {
                Ok(value) => value,
                Err(err) => {
                    warn!(tag = name, error = %err, "token replacement failed, tag dropped");
                    continue;
                }
            };
            for value in self.process_value(tag, &substituted) {
                elements.push(build_element(tag, &value));
            }
        }
        elements
    }

    fn process_value(&self, tag: &TagDefinition, substituted: &str) -> Vec<String> {
        let mut values = match tag.kind {
            // Image values skip the decode and strip; markup is only mined for src.
            TagKind::Image => match image_sources(substituted) {
                Some(sources) => sources,
                None => split_values(tag, substituted),
            },
            TagKind::Plain | TagKind::Url | TagKind::HttpHeader => {
                split_values(tag, &self.sanitizer.plain_text(substituted))
            }
        };
        if !tag.multiple {
            values.truncate(1);
        }
        values
            .into_iter()
            .map(|value| self.finish_value(tag, value.trim()))
            .filter(|value| !value.is_empty())
            .map(|value| escape_attr(&value))
            .collect()
    }

    fn finish_value(&self, tag: &TagDefinition, value: &str) -> String {
        let mut value = value.to_string();
        if tag.absolute_url {
            if let Some(base_url) = self.options.base_url.as_deref() {
                value = absolute_url(&value, base_url);
            }
        }
        if tag.secure {
            if let Some(rest) = value.strip_prefix("http://") {
                value = format!("https://{rest}");
            }
        }
        if matches!(tag.kind, TagKind::Plain | TagKind::HttpHeader) {
            if let Some(max_length) = self.options.max_length.get(&tag.name) {
                value = trim_value(&value, *max_length, self.options.trim_method);
            }
        }
        value
    }
}

fn split_values(tag: &TagDefinition, value: &str) -> Vec<String> {
    if tag.multiple {
        value
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    } else {
        vec![value.trim().to_string()]
    }
}

fn absolute_url(value: &str, base_url: &str) -> String {
    if value.starts_with('/') && !value.starts_with("//") {
        format!("{}{}", base_url.trim_end_matches('/'), value)
    } else {
        value.to_string()
    }
}

fn build_element(tag: &TagDefinition, escaped_value: &str) -> OutputElement {
    let (html_tag, attribute) = match tag.kind {
        TagKind::Url => (HtmlTag::Link, "rel"),
        TagKind::Plain | TagKind::Image | TagKind::HttpHeader => {
            (HtmlTag::Meta, tag.attribute.attribute_name())
        }
    };
    let mut attributes = BTreeMap::new();
    attributes.insert(attribute.to_string(), escape_attr(&tag.html_name));
    OutputElement {
        tag_name: tag.name.clone(),
        html_tag,
        attributes,
        value: escaped_value.to_string(),
    }
}

/// Serialize elements as head markup. Values are written as-is; they are already escaped.
pub fn to_head_html(elements: &[OutputElement]) -> String {
    let mut html = String::new();
    for element in elements {
        html.push('<');
        html.push_str(element.html_tag.element_name());
        for (name, value) in &element.attributes {
            let _ = write!(html, " {name}=\"{value}\"");
        }
        let _ = writeln!(
            html,
            " {}=\"{}\" />",
            element.html_tag.value_attribute(),
            element.value
        );
    }
    html
}
