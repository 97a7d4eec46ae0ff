use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const GLOBAL_ID: &str = "global";
pub const BUNDLE_SEPARATOR: &str = "__";
pub const FALLBACK_GROUP: &str = "basic";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagKind {
    Plain,
    Url,
    Image,
    HttpHeader,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttributeStyle {
    #[default]
    Name,
    Property,
    HttpEquiv,
    Itemprop,
}

impl AttributeStyle {
    pub fn attribute_name(self) -> &'static str {
        match self {
            AttributeStyle::Name => "name",
            AttributeStyle::Property => "property",
            AttributeStyle::HttpEquiv => "http-equiv",
            AttributeStyle::Itemprop => "itemprop",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDefinition {
    pub name: String,
    pub label: String,
    pub description: String,
    pub weight: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDefinition {
    pub name: String,
    pub label: String,
    pub description: String,
    pub group: String,
    pub weight: i32,
    pub kind: TagKind,
    pub attribute: AttributeStyle,
    pub html_name: String,
    pub multiple: bool,
    pub absolute_url: bool,
    pub secure: bool,
}

impl TagDefinition {
    pub fn unregistered(name: &str) -> Self {
        Self {
            name: name.to_string(),
            label: name.to_string(),
            description: String::new(),
            group: FALLBACK_GROUP.to_string(),
            weight: 0,
            kind: TagKind::Plain,
            attribute: AttributeStyle::Name,
            html_name: name.to_string(),
            multiple: false,
            absolute_url: false,
            secure: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultsRecord {
    pub id: String,
    pub label: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

fn default_enabled() -> bool {
    true
}

impl DefaultsRecord {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            enabled: true,
            tags: BTreeMap::new(),
        }
    }

    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(name.into(), value.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn record_id(&self) -> RecordId {
        RecordId::parse(&self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialPage {
    Front,
    Forbidden,
    NotFound,
}

impl SpecialPage {
    pub const ALL: [SpecialPage; 3] = [
        SpecialPage::Front,
        SpecialPage::Forbidden,
        SpecialPage::NotFound,
    ];

    pub fn record_id(self) -> &'static str {
        match self {
            SpecialPage::Front => "front",
            SpecialPage::Forbidden => "403",
            SpecialPage::NotFound => "404",
        }
    }

    pub fn from_record_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|page| page.record_id() == id)
    }
}

impl fmt::Display for SpecialPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.record_id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordId {
    Global,
    Special(SpecialPage),
    EntityType(String),
    Bundle { entity_type: String, bundle: String },
}

impl RecordId {
    pub fn parse(id: &str) -> Self {
        if id == GLOBAL_ID {
            return RecordId::Global;
        }
        if let Some(page) = SpecialPage::from_record_id(id) {
            return RecordId::Special(page);
        }
        match id.split_once(BUNDLE_SEPARATOR) {
            Some((entity_type, bundle)) => RecordId::Bundle {
                entity_type: entity_type.to_string(),
                bundle: bundle.to_string(),
            },
            None => RecordId::EntityType(id.to_string()),
        }
    }
}

pub fn bundle_key(entity_type: &str, bundle: &str) -> String {
    format!("{entity_type}{BUNDLE_SEPARATOR}{bundle}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveTarget {
    Special(SpecialPage),
    Entity {
        entity_type: String,
        bundle: Option<String>,
    },
    Page,
}

impl ResolveTarget {
    pub fn entity(entity_type: impl Into<String>, bundle: Option<&str>) -> Self {
        ResolveTarget::Entity {
            entity_type: entity_type.into(),
            bundle: bundle.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    pub target: ResolveTarget,
    pub langcode: Option<String>,
    pub tokens: BTreeMap<String, String>,
}

impl RenderContext {
    pub fn new(target: ResolveTarget) -> Self {
        Self {
            target,
            langcode: None,
            tokens: BTreeMap::new(),
        }
    }

    pub fn with_token(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tokens.insert(key.into(), value.into());
        self
    }

    pub fn with_langcode(mut self, langcode: impl Into<String>) -> Self {
        self.langcode = Some(langcode.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedTagSet {
    tags: BTreeMap<String, String>,
}

impl ResolvedTagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overlay(&mut self, layer: &BTreeMap<String, String>) {
        for (name, value) in layer {
            self.tags.insert(name.clone(), value.clone());
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(name.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl std::ops::Index<&str> for ResolvedTagSet {
    type Output = str;

    fn index(&self, name: &str) -> &str {
        self.tags[name].as_str()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlTag {
    Meta,
    Link,
}

impl HtmlTag {
    pub fn element_name(self) -> &'static str {
        match self {
            HtmlTag::Meta => "meta",
            HtmlTag::Link => "link",
        }
    }

    pub fn value_attribute(self) -> &'static str {
        match self {
            HtmlTag::Meta => "content",
            HtmlTag::Link => "href",
        }
    }
}

/// One head element. Attribute values and `value` are already attribute-escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputElement {
    pub tag_name: String,
    pub html_tag: HtmlTag,
    pub attributes: BTreeMap<String, String>,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_ids_classify() {
        assert_eq!(RecordId::parse("global"), RecordId::Global);
        assert_eq!(
            RecordId::parse("403"),
            RecordId::Special(SpecialPage::Forbidden)
        );
        assert_eq!(
            RecordId::parse("node"),
            RecordId::EntityType("node".to_string())
        );
        assert_eq!(
            RecordId::parse("node__article"),
            RecordId::Bundle {
                entity_type: "node".to_string(),
                bundle: "article".to_string(),
            }
        );
    }

    #[test]
    fn overlay_replaces_only_defined_names() {
        let mut set = ResolvedTagSet::new();
        set.insert("title", "Global");
        set.insert("description", "Global description");
        let mut layer = BTreeMap::new();
        layer.insert("title".to_string(), "Layer".to_string());
        set.overlay(&layer);
        assert_eq!(set.get("title"), Some("Layer"));
        assert_eq!(set.get("description"), Some("Global description"));
    }

    #[test]
    fn record_deserializes_with_defaults() {
        let record: DefaultsRecord =
            serde_yaml::from_str("id: node\nlabel: Content\n").expect("parse record");
        assert!(record.enabled);
        assert!(record.tags.is_empty());
    }
}
