use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::admin::EntityTypeInfo;
use crate::model::{AttributeStyle, DefaultsRecord, TagDefinition, TagKind};
use crate::registry::{RegistryError, TagRegistry};
use crate::render::RenderOptions;
use crate::tokens::{LANGCODE_TOKEN, TokenTable};
use crate::trim::TrimMethod;

#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub name: String,
    pub base_url: String,
    pub language: String,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub site: SiteSettings,
    pub entity_types: Vec<EntityTypeInfo>,
    pub tokens: BTreeMap<String, String>,
    pub render: RenderOptions,
    pub extra_tags: Vec<TagDefinition>,
    pub store_path: Option<PathBuf>,
}

impl EngineConfig {
    pub fn registry(&self) -> Result<TagRegistry, RegistryError> {
        if self.extra_tags.is_empty() {
            Ok(TagRegistry::builtin())
        } else {
            TagRegistry::builtin_with(self.extra_tags.clone())
        }
    }

    pub fn token_table(&self) -> TokenTable {
        let mut values = BTreeMap::new();
        values.insert("site:name".to_string(), self.site.name.clone());
        values.insert("site:url".to_string(), self.site.base_url.clone());
        values.insert("site:langcode".to_string(), self.site.language.clone());
        values.insert(LANGCODE_TOKEN.to_string(), self.site.language.clone());
        values.extend(self.tokens.clone());
        TokenTable::from_map(values)
    }
}

#[derive(Debug, Deserialize)]
struct EngineConfigRaw {
    site: Option<SiteSettingsRaw>,
    entity_types: Option<Vec<EntityTypeRaw>>,
    #[serde(default)]
    tokens: BTreeMap<String, String>,
    output: Option<OutputConfigRaw>,
    #[serde(default)]
    extra_tags: Vec<ExtraTagRaw>,
    store: Option<StoreConfigRaw>,
}

#[derive(Debug, Deserialize)]
struct SiteSettingsRaw {
    name: Option<String>,
    base_url: Option<String>,
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EntityTypeRaw {
    id: Option<String>,
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OutputConfigRaw {
    trim_method: Option<TrimMethod>,
    #[serde(default)]
    max_length: BTreeMap<String, usize>,
}

#[derive(Debug, Deserialize)]
struct ExtraTagRaw {
    name: Option<String>,
    label: Option<String>,
    #[serde(default)]
    description: String,
    group: Option<String>,
    #[serde(default)]
    weight: i32,
    kind: Option<TagKind>,
    attribute: Option<AttributeStyle>,
    html_name: Option<String>,
    #[serde(default)]
    multiple: bool,
    #[serde(default)]
    absolute_url: bool,
    #[serde(default)]
    secure: bool,
}

#[derive(Debug, Deserialize)]
struct StoreConfigRaw {
    path: Option<PathBuf>,
}

pub fn load_engine_config(path: &Path) -> Result<EngineConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let mut config = parse_engine_config(&raw)
        .with_context(|| format!("invalid config {}", path.display()))?;
    // Relative store paths are relative to the config file.
    if let (Some(store_path), Some(parent)) = (config.store_path.as_mut(), path.parent()) {
        if store_path.is_relative() {
            let joined = parent.join(&*store_path);
            *store_path = joined;
        }
    }
    Ok(config)
}

pub fn parse_engine_config(raw: &str) -> Result<EngineConfig> {
    let parsed: EngineConfigRaw =
        serde_yaml::from_str(raw).context("failed to parse YAML config")?;
    let Some(site_raw) = parsed.site else {
        bail!("missing required field: site");
    };
    let site = SiteSettings {
        name: required_string(site_raw.name, "site.name")?,
        base_url: required_string(site_raw.base_url, "site.base_url")?,
        language: site_raw.language.unwrap_or_else(|| "en".to_string()),
    };

    let entity_types = match parsed.entity_types {
        Some(items) => parse_entity_types(items)?,
        None => default_entity_types(),
    };

    let (trim_method, max_length) = match parsed.output {
        Some(output) => (output.trim_method.unwrap_or_default(), output.max_length),
        None => (TrimMethod::default(), BTreeMap::new()),
    };
    let render = RenderOptions {
        base_url: Some(site.base_url.clone()),
        max_length,
        trim_method,
    };

    let extra_tags = parsed
        .extra_tags
        .into_iter()
        .enumerate()
        .map(|(idx, tag)| parse_extra_tag(idx, tag))
        .collect::<Result<Vec<_>>>()?;

    Ok(EngineConfig {
        site,
        entity_types,
        tokens: parsed.tokens,
        render,
        extra_tags,
        store_path: parsed.store.and_then(|store| store.path),
    })
}

pub fn load_records(path: &Path) -> Result<Vec<DefaultsRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read records {}", path.display()))?;
    let records: Vec<DefaultsRecord> = serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse YAML records {}", path.display()))?;
    Ok(records)
}

fn default_entity_types() -> Vec<EntityTypeInfo> {
    [
        ("node", "Content"),
        ("taxonomy_term", "Taxonomy term"),
        ("user", "User"),
    ]
    .into_iter()
    .map(|(id, label)| EntityTypeInfo {
        id: id.to_string(),
        label: label.to_string(),
    })
    .collect()
}

fn parse_entity_types(items: Vec<EntityTypeRaw>) -> Result<Vec<EntityTypeInfo>> {
    let mut out = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        let id = required_string(item.id, &format!("entity_types[{idx}].id"))?;
        if id.contains("__") {
            bail!("entity_types[{idx}].id must not contain '__': {id}");
        }
        let label = item.label.unwrap_or_else(|| id.clone());
        out.push(EntityTypeInfo { id, label });
    }
    Ok(out)
}

fn parse_extra_tag(idx: usize, tag: ExtraTagRaw) -> Result<TagDefinition> {
    let name = required_string(tag.name, &format!("extra_tags[{idx}].name"))?;
    let group = required_string(tag.group, &format!("extra_tags[{idx}].group"))?;
    Ok(TagDefinition {
        label: tag.label.unwrap_or_else(|| name.clone()),
        html_name: tag.html_name.unwrap_or_else(|| name.clone()),
        name,
        description: tag.description,
        group,
        weight: tag.weight,
        kind: tag.kind.unwrap_or(TagKind::Plain),
        attribute: tag.attribute.unwrap_or_default(),
        multiple: tag.multiple,
        absolute_url: tag.absolute_url,
        secure: tag.secure,
    })
}

fn required_string(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => bail!("missing required field: {}", field),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = "site:\n  name: \"Acme\"\n  base_url: \"https://example.com/\"\n";

    #[test]
    fn valid_minimal_config_parses() {
        let config = parse_engine_config(MINIMAL).expect("config should parse");
        assert_eq!(config.site.name, "Acme");
        assert_eq!(config.site.language, "en");
        assert_eq!(config.entity_types.len(), 3);
        assert_eq!(config.render.trim_method, TrimMethod::BeforeValue);
        assert_eq!(
            config.render.base_url.as_deref(),
            Some("https://example.com/")
        );
    }

    #[test]
    fn missing_required_field_fails() {
        let err = parse_engine_config("site:\n  base_url: \"https://example.com/\"\n")
            .expect_err("expected error");
        assert!(err.to_string().contains("site.name"));
    }

    #[test]
    fn output_and_extra_tags_parse() {
        let raw = format!(
            "{MINIMAL}output:\n  trim_method: on_value\n  max_length:\n    description: 160\n\
             extra_tags:\n  - name: dc_title\n    group: basic\n    weight: 9\n    html_name: dcterms.title\n"
        );
        let config = parse_engine_config(&raw).expect("config should parse");
        assert_eq!(config.render.trim_method, TrimMethod::OnValue);
        assert_eq!(config.render.max_length.get("description"), Some(&160));
        let tag = &config.extra_tags[0];
        assert_eq!(tag.html_name, "dcterms.title");
        assert_eq!(tag.kind, TagKind::Plain);
        assert_eq!(tag.label, "dc_title");
    }

    #[test]
    fn token_table_includes_site_values() {
        let raw = format!("{MINIMAL}tokens:\n  \"site:slogan\": \"Making things\"\n");
        let config = parse_engine_config(&raw).expect("config should parse");
        let table = config.token_table();
        let ctx = crate::model::RenderContext::new(crate::model::ResolveTarget::Page);
        let out = crate::tokens::TokenSubstitutor::replace(
            &table,
            "[site:name]: [site:slogan]",
            &ctx,
            Default::default(),
        )
        .expect("replace");
        assert_eq!(out, "Acme: Making things");
    }

    #[test]
    fn store_path_is_relative_to_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("metatag.yaml");
        fs::write(&path, format!("{MINIMAL}store:\n  path: defaults.sqlite\n"))
            .expect("write config");
        let config = load_engine_config(&path).expect("config should load");
        assert_eq!(config.store_path, Some(dir.path().join("defaults.sqlite")));
    }

    #[test]
    fn records_file_parses() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "- id: node__article\n  label: \"Content: Article\"\n  tags:\n    description: \"[node:summary]\"\n- id: front\n  label: Front page\n  enabled: false\n"
        )
        .expect("write records");
        let records = load_records(file.path()).expect("records should load");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].tags["description"], "[node:summary]");
        assert!(!records[1].enabled);
    }
}
