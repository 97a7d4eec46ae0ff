//! Global, special-page, entity-type and bundle defaults cascade

use thiserror::Error;
use tracing::debug;

use crate::model::{DefaultsRecord, GLOBAL_ID, ResolveTarget, ResolvedTagSet, bundle_key};
use crate::store::{DefaultsStore, StoreError};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("global defaults are missing or disabled")]
    NoGlobalDefaults,
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct DefaultsResolver<'a, S: DefaultsStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: DefaultsStore + ?Sized> DefaultsResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Merge global defaults with the layers that apply to `target`.
    pub fn resolve_for_context(
        &self,
        target: &ResolveTarget,
    ) -> Result<ResolvedTagSet, ResolveError> {
        let global = self
            .load_enabled(GLOBAL_ID)?
            .ok_or(ResolveError::NoGlobalDefaults)?;
        let mut resolved = ResolvedTagSet::new();
        resolved.overlay(&global.tags);

        match target {
            ResolveTarget::Special(page) => {
                self.overlay_layer(&mut resolved, page.record_id())?;
            }
            ResolveTarget::Entity {
                entity_type,
                bundle,
            } => {
                self.overlay_layer(&mut resolved, entity_type)?;
                if let Some(bundle) = bundle {
                    self.overlay_layer(&mut resolved, &bundle_key(entity_type, bundle))?;
                }
            }
            ResolveTarget::Page => {}
        }
        Ok(resolved)
    }

    fn overlay_layer(&self, resolved: &mut ResolvedTagSet, id: &str) -> Result<(), StoreError> {
        if let Some(record) = self.load_enabled(id)? {
            debug!(layer = id, tags = record.tags.len(), "applying defaults layer");
            resolved.overlay(&record.tags);
        }
        Ok(())
    }

    fn load_enabled(&self, id: &str) -> Result<Option<DefaultsRecord>, StoreError> {
        let record = self.store.get(id)?;
        match record {
            Some(record) if record.enabled => Ok(Some(record)),
            Some(_) => {
                debug!(layer = id, "defaults layer disabled");
                Ok(None)
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SpecialPage;
    use crate::store::MemoryDefaultsStore;

    fn store() -> MemoryDefaultsStore {
        MemoryDefaultsStore::with_records([
            DefaultsRecord::new("global", "Global")
                .with_tag("title", "Global title")
                .with_tag("canonical_url", "https://example.com/"),
            DefaultsRecord::new("node", "Content").with_tag("description", "A"),
            DefaultsRecord::new("node__article", "Content: Article").with_tag("description", "B"),
        ])
    }

    #[test]
    fn missing_global_is_fatal() {
        let store = MemoryDefaultsStore::new();
        let err = DefaultsResolver::new(&store)
            .resolve_for_context(&ResolveTarget::Page)
            .expect_err("no global");
        assert!(matches!(err, ResolveError::NoGlobalDefaults));
    }

    #[test]
    fn disabled_global_is_fatal() {
        let store = MemoryDefaultsStore::with_records([DefaultsRecord::new("global", "Global")
            .with_tag("title", "x")
            .disabled()]);
        let err = DefaultsResolver::new(&store)
            .resolve_for_context(&ResolveTarget::Page)
            .expect_err("disabled global");
        assert!(matches!(err, ResolveError::NoGlobalDefaults));
    }

    #[test]
    fn bundle_overrides_entity_type() {
        let store = store();
        let resolver = DefaultsResolver::new(&store);
        let article = resolver
            .resolve_for_context(&ResolveTarget::entity("node", Some("article")))
            .expect("resolve");
        assert_eq!(article.get("description"), Some("B"));
        assert_eq!(article.get("title"), Some("Global title"));

        let page = resolver
            .resolve_for_context(&ResolveTarget::entity("node", Some("page")))
            .expect("resolve");
        assert_eq!(page.get("description"), Some("A"));
    }

    #[test]
    fn page_target_uses_global_only() {
        let store = store();
        let resolved = DefaultsResolver::new(&store)
            .resolve_for_context(&ResolveTarget::Page)
            .expect("resolve");
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved.get("description"), None);
    }

    #[test]
    fn special_page_without_record_falls_back_to_global() {
        let store = store();
        let resolved = DefaultsResolver::new(&store)
            .resolve_for_context(&ResolveTarget::Special(SpecialPage::NotFound))
            .expect("resolve");
        assert_eq!(resolved.get("canonical_url"), Some("https://example.com/"));
    }
}
