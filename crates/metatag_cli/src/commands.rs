use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use metatag_core::admin::{self, RecordOperation};
use metatag_core::config::{EngineConfig, load_records};
use metatag_core::engine::MetatagEngine;
use metatag_core::model::{RenderContext, ResolveTarget, SpecialPage};
use metatag_core::render::to_head_html;
use metatag_core::resolve::ResolveError;
use metatag_core::store::DefaultsStore;
use tracing::warn;

const DEFAULT_STORE_FILE: &str = "metatag.sqlite";

#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
    pub special: Option<SpecialPage>,
    pub entity_type: Option<String>,
    pub bundle: Option<String>,
    pub langcode: Option<String>,
    pub tokens: Vec<(String, String)>,
    pub overrides: Vec<(String, String)>,
}

impl RenderRequest {
    fn target(&self) -> Result<ResolveTarget> {
        match (self.special, &self.entity_type, &self.bundle) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                bail!("--special cannot be combined with --entity-type or --bundle")
            }
            (Some(page), None, None) => Ok(ResolveTarget::Special(page)),
            (None, Some(entity_type), bundle) => {
                Ok(ResolveTarget::entity(entity_type.as_str(), bundle.as_deref()))
            }
            (None, None, Some(_)) => bail!("--bundle requires --entity-type"),
            (None, None, None) => Ok(ResolveTarget::Page),
        }
    }
}

pub fn store_path(config_path: &Path, config: &EngineConfig, cli_store: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_store {
        return path.to_path_buf();
    }
    if let Some(path) = &config.store_path {
        return path.clone();
    }
    config_path
        .parent()
        .map(|dir| dir.join(DEFAULT_STORE_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE))
}

pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}

pub fn seed<S: DefaultsStore>(store: &mut S) -> Result<String> {
    let written = admin::seed_install_defaults(store).context("failed to seed defaults")?;
    if written.is_empty() {
        return Ok("seeded: nothing, all defaults present\n".to_string());
    }
    Ok(format!("seeded: {}\n", written.join(", ")))
}

pub fn list<S: DefaultsStore>(store: &S, config: &EngineConfig) -> Result<String> {
    let rows =
        admin::list_records(store, &config.entity_types).context("failed to list defaults")?;
    let mut out = String::new();
    for row in rows {
        let status = if row.enabled { "enabled" } else { "disabled" };
        let operation = match row.operation {
            RecordOperation::Revert => "revert",
            RecordOperation::Delete => "delete",
        };
        let _ = write!(
            out,
            "{}{} [{}] {status} {operation}",
            "  ".repeat(row.depth),
            row.label,
            row.id
        );
        if !row.inherits.is_empty() {
            let _ = write!(out, " (inherits {})", row.inherits.join(" > "));
        }
        out.push('\n');
    }
    Ok(out)
}

pub fn show<S: DefaultsStore>(store: &S, id: &str) -> Result<String> {
    let Some(record) = store.get(id).context("failed to load defaults")? else {
        bail!("defaults record {id} not found");
    };
    serde_yaml::to_string(&record).context("failed to serialize record")
}

pub fn revert<S: DefaultsStore>(store: &mut S, config: &EngineConfig, id: &str) -> Result<String> {
    let record = admin::revert(store, id, &config.entity_types)?;
    Ok(format!("reverted: {} ({} tags)\n", record.id, record.tags.len()))
}

pub fn delete<S: DefaultsStore>(store: &mut S, config: &EngineConfig, id: &str) -> Result<String> {
    admin::delete(store, id, &config.entity_types)?;
    Ok(format!("deleted: {id}\n"))
}

pub fn import<S: DefaultsStore>(store: &mut S, path: &Path) -> Result<String> {
    let records = load_records(path)?;
    let count = records.len();
    for record in records {
        let id = record.id.clone();
        store
            .save(record)
            .with_context(|| format!("failed to save {id}"))?;
    }
    Ok(format!("imported: {count}\n"))
}

pub fn tags(config: &EngineConfig, group: Option<&str>) -> Result<String> {
    let registry = config.registry().context("invalid extra_tags")?;
    if let Some(name) = group {
        if registry.get_group(name).is_none() {
            bail!("unknown tag group {name}");
        }
    }
    let mut out = String::new();
    for (group_def, tags) in registry.groups_with_tags() {
        if group.is_some_and(|name| name != group_def.name) {
            continue;
        }
        let _ = writeln!(out, "{} [{}]", group_def.label, group_def.name);
        for tag in tags {
            let _ = writeln!(out, "  {} ({}): {}", tag.name, tag.html_name, tag.label);
        }
    }
    Ok(out)
}

pub fn render<S: DefaultsStore>(
    store: S,
    config: &EngineConfig,
    request: &RenderRequest,
) -> Result<String> {
    let target = request.target()?;
    let engine = MetatagEngine::from_config(store, config).context("invalid extra_tags")?;
    let mut ctx = RenderContext::new(target)
        .with_langcode(request.langcode.as_deref().unwrap_or(&config.site.language));
    for (key, value) in &request.tokens {
        ctx = ctx.with_token(key.as_str(), value.as_str());
    }
    let overrides: BTreeMap<String, String> = request.overrides.iter().cloned().collect();
    match engine.head_elements_with_overrides(&ctx, &overrides) {
        Ok(elements) => Ok(to_head_html(&elements)),
        Err(ResolveError::NoGlobalDefaults) => {
            warn!("no enabled global defaults, run `metatag seed`");
            Ok(String::new())
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metatag_core::config::parse_engine_config;
    use metatag_core::model::DefaultsRecord;
    use metatag_core::store::MemoryDefaultsStore;

    fn config() -> EngineConfig {
        parse_engine_config("site:\n  name: Acme\n  base_url: https://example.com/\n")
            .expect("config")
    }

    #[test]
    fn key_values_split_on_first_equals() {
        assert_eq!(
            parse_key_value("node:title=a=b"),
            Ok(("node:title".to_string(), "a=b".to_string()))
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn targets_from_flags() {
        let request = RenderRequest {
            entity_type: Some("node".to_string()),
            bundle: Some("article".to_string()),
            ..RenderRequest::default()
        };
        assert_eq!(
            request.target().expect("target"),
            ResolveTarget::entity("node", Some("article"))
        );
        let bundle_only = RenderRequest {
            bundle: Some("article".to_string()),
            ..RenderRequest::default()
        };
        assert!(bundle_only.target().is_err());
        let mixed = RenderRequest {
            special: Some(SpecialPage::Front),
            entity_type: Some("node".to_string()),
            ..RenderRequest::default()
        };
        assert!(mixed.target().is_err());
    }

    #[test]
    fn store_path_precedence() {
        let mut config = config();
        let config_path = Path::new("/srv/site/metatag.yaml");
        assert_eq!(
            store_path(config_path, &config, None),
            PathBuf::from("/srv/site/metatag.sqlite")
        );
        config.store_path = Some(PathBuf::from("/var/lib/defaults.sqlite"));
        assert_eq!(
            store_path(config_path, &config, None),
            PathBuf::from("/var/lib/defaults.sqlite")
        );
        assert_eq!(
            store_path(config_path, &config, Some(Path::new("other.sqlite"))),
            PathBuf::from("other.sqlite")
        );
    }

    #[test]
    fn list_indents_by_depth() {
        let store = MemoryDefaultsStore::with_records([
            DefaultsRecord::new("global", "Global"),
            DefaultsRecord::new("node", "Content"),
            DefaultsRecord::new("node__article", "Content: Article").disabled(),
        ]);
        let out = list(&store, &config()).expect("list");
        assert_eq!(
            out,
            "Global [global] enabled revert\n\
             \x20 Content [node] enabled revert (inherits Global)\n\
             \x20   Content: Article [node__article] disabled delete (inherits Global > Content)\n"
        );
    }

    #[test]
    fn tags_lists_groups_in_weight_order() {
        let out = tags(&config(), None).expect("tags");
        let headers: Vec<_> = out.lines().filter(|line| !line.starts_with(' ')).collect();
        assert_eq!(
            headers,
            vec![
                "Basic tags [basic]",
                "Advanced [advanced]",
                "Open Graph [open_graph]",
                "Twitter Cards [twitter_cards]"
            ]
        );
        assert!(out.contains("  canonical_url (canonical): Canonical URL\n"));
    }

    #[test]
    fn tags_filters_by_known_group() {
        let config = parse_engine_config(
            "site:\n  name: Acme\n  base_url: https://example.com/\n\
             extra_tags:\n  - name: dc_title\n    label: Dublin Core title\n    group: basic\n    weight: 9\n    html_name: dcterms.title\n",
        )
        .expect("config");
        let out = tags(&config, Some("basic")).expect("tags");
        assert!(out.starts_with("Basic tags [basic]\n  title (title): Page title\n"));
        assert!(out.ends_with("  dc_title (dcterms.title): Dublin Core title\n"));
        assert!(!out.contains("[advanced]"));
        assert!(tags(&config, Some("nope")).is_err());
    }

    #[test]
    fn render_without_global_is_empty() {
        let out = render(MemoryDefaultsStore::new(), &config(), &RenderRequest::default())
            .expect("render");
        assert!(out.is_empty());
    }

    #[test]
    fn render_langcode_reaches_language_token() {
        let store = MemoryDefaultsStore::with_records([DefaultsRecord::new("global", "Global")
            .with_tag("content_language", "[language:langcode]")]);
        let request = RenderRequest {
            langcode: Some("fr".to_string()),
            ..RenderRequest::default()
        };
        let out = render(store.clone(), &config(), &request).expect("render");
        assert_eq!(
            out,
            "<meta http-equiv=\"content-language\" content=\"fr\" />\n"
        );
        let out = render(store, &config(), &RenderRequest::default()).expect("render");
        assert_eq!(
            out,
            "<meta http-equiv=\"content-language\" content=\"en\" />\n"
        );
    }

    #[test]
    fn render_applies_tokens_and_overrides() {
        let store = MemoryDefaultsStore::with_records([DefaultsRecord::new("global", "Global")
            .with_tag("title", "[node:title] | [site:name]")
            .with_tag("description", "Default")]);
        let request = RenderRequest {
            entity_type: Some("node".to_string()),
            tokens: vec![("node:title".to_string(), "Hello".to_string())],
            overrides: vec![("description".to_string(), "Custom".to_string())],
            ..RenderRequest::default()
        };
        let out = render(store, &config(), &request).expect("render");
        assert_eq!(
            out,
            "<meta name=\"title\" content=\"Hello | Acme\" />\n\
             <meta name=\"description\" content=\"Custom\" />\n"
        );
    }
}
