use thiserror::Error;

use crate::catalog;
use crate::model::{DefaultsRecord, GLOBAL_ID, RecordId};
use crate::store::{DefaultsStore, StoreError};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("defaults record {0} is protected and cannot be deleted")]
    Protected(String),
    #[error("defaults record {0} has no catalog values to revert to")]
    NotRevertible(String),
    #[error("defaults record {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOperation {
    Revert,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSummary {
    pub id: String,
    pub label: String,
    pub enabled: bool,
    pub depth: usize,
    pub inherits: Vec<String>,
    pub operation: RecordOperation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityTypeInfo {
    pub id: String,
    pub label: String,
}

pub fn is_protected(id: &str, entity_types: &[EntityTypeInfo]) -> bool {
    match RecordId::parse(id) {
        RecordId::Global | RecordId::Special(_) => true,
        RecordId::EntityType(entity_type) => entity_types.iter().any(|info| info.id == entity_type),
        RecordId::Bundle { .. } => false,
    }
}

pub fn list_records<S: DefaultsStore + ?Sized>(
    store: &S,
    entity_types: &[EntityTypeInfo],
) -> Result<Vec<RecordSummary>, StoreError> {
    let records = store.list()?;
    let mut ordered: Vec<&DefaultsRecord> = records.iter().collect();
    ordered.sort_by(|a, b| {
        (a.id != GLOBAL_ID, a.label.to_lowercase(), &a.id).cmp(&(
            b.id != GLOBAL_ID,
            b.label.to_lowercase(),
            &b.id,
        ))
    });
    Ok(ordered
        .into_iter()
        .map(|record| summarize(record, &records, entity_types))
        .collect())
}

fn summarize(
    record: &DefaultsRecord,
    records: &[DefaultsRecord],
    entity_types: &[EntityTypeInfo],
) -> RecordSummary {
    let (depth, inherits) = match record.record_id() {
        RecordId::Global => (0, Vec::new()),
        RecordId::Bundle { entity_type, .. } => (
            2,
            vec![
                "Global".to_string(),
                entity_type_label(&entity_type, record, records, entity_types),
            ],
        ),
        RecordId::Special(_) | RecordId::EntityType(_) => (1, vec!["Global".to_string()]),
    };
    let operation = if is_protected(&record.id, entity_types) {
        RecordOperation::Revert
    } else {
        RecordOperation::Delete
    };
    RecordSummary {
        id: record.id.clone(),
        label: record.label.clone(),
        enabled: record.enabled,
        depth,
        inherits,
        operation,
    }
}

fn entity_type_label(
    entity_type: &str,
    bundle_record: &DefaultsRecord,
    records: &[DefaultsRecord],
    entity_types: &[EntityTypeInfo],
) -> String {
    if let Some(parent) = records.iter().find(|record| record.id == entity_type) {
        return parent.label.clone();
    }
    if let Some(info) = entity_types.iter().find(|info| info.id == entity_type) {
        return info.label.clone();
    }
    // Bundle labels are conventionally "Entity type: Bundle".
    match bundle_record.label.split_once(": ") {
        Some((label, _)) => label.to_string(),
        None => entity_type.to_string(),
    }
}

pub fn revert<S: DefaultsStore + ?Sized>(
    store: &mut S,
    id: &str,
    entity_types: &[EntityTypeInfo],
) -> Result<DefaultsRecord, AdminError> {
    if !is_protected(id, entity_types) {
        return Err(AdminError::NotRevertible(id.to_string()));
    }
    let existing = store.get(id)?;
    let reverted = match catalog::install_default(id) {
        Some(record) => record,
        None => {
            let label = existing
                .as_ref()
                .map(|record| record.label.clone())
                .or_else(|| {
                    entity_types
                        .iter()
                        .find(|info| info.id == id)
                        .map(|info| info.label.clone())
                })
                .unwrap_or_else(|| id.to_string());
            DefaultsRecord::new(id, label)
        }
    };
    store.save(reverted.clone())?;
    Ok(reverted)
}

pub fn delete<S: DefaultsStore + ?Sized>(
    store: &mut S,
    id: &str,
    entity_types: &[EntityTypeInfo],
) -> Result<(), AdminError> {
    if is_protected(id, entity_types) {
        return Err(AdminError::Protected(id.to_string()));
    }
    if !store.delete(id)? {
        return Err(AdminError::NotFound(id.to_string()));
    }
    Ok(())
}

pub fn seed_install_defaults<S: DefaultsStore + ?Sized>(
    store: &mut S,
) -> Result<Vec<String>, StoreError> {
    let mut written = Vec::new();
    for record in catalog::install_defaults() {
        if store.get(&record.id)?.is_none() {
            written.push(record.id.clone());
            store.save(record)?;
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDefaultsStore;

    fn entity_types() -> Vec<EntityTypeInfo> {
        vec![
            EntityTypeInfo {
                id: "node".to_string(),
                label: "Content".to_string(),
            },
            EntityTypeInfo {
                id: "user".to_string(),
                label: "User".to_string(),
            },
        ]
    }

    #[test]
    fn protection_rules() {
        let types = entity_types();
        for id in ["global", "front", "403", "404", "node", "user"] {
            assert!(is_protected(id, &types), "{id}");
        }
        for id in ["node__article", "commerce_product", "user__user"] {
            assert!(!is_protected(id, &types), "{id}");
        }
    }

    #[test]
    fn global_lists_first_and_bundles_show_inheritance() {
        let store = MemoryDefaultsStore::with_records([
            DefaultsRecord::new("404", "404 page not found"),
            DefaultsRecord::new("node__article", "Content: Article"),
            DefaultsRecord::new("global", "Global"),
            DefaultsRecord::new("front", "Front page"),
            DefaultsRecord::new("node", "Content"),
        ]);
        let rows = list_records(&store, &entity_types()).expect("list");
        let ids: Vec<_> = rows.iter().map(|row| row.id.as_str()).collect();
        assert_eq!(ids, vec!["global", "404", "node", "node__article", "front"]);

        assert_eq!(rows[0].depth, 0);
        assert!(rows[0].inherits.is_empty());
        assert_eq!(rows[0].operation, RecordOperation::Revert);

        let article = &rows[3];
        assert_eq!(article.depth, 2);
        assert_eq!(article.inherits, vec!["Global", "Content"]);
        assert_eq!(article.operation, RecordOperation::Delete);
        assert_eq!(rows[4].inherits, vec!["Global"]);
    }

    #[test]
    fn bundle_inheritance_falls_back_to_label_prefix() {
        let store = MemoryDefaultsStore::with_records([
            DefaultsRecord::new("global", "Global"),
            DefaultsRecord::new("media__image", "Media: Image"),
        ]);
        let rows = list_records(&store, &entity_types()).expect("list");
        assert_eq!(rows[1].inherits, vec!["Global", "Media"]);
    }

    #[test]
    fn revert_restores_catalog_values() {
        let mut store = MemoryDefaultsStore::with_records([DefaultsRecord::new("node", "Content")
            .with_tag("title", "Custom")
            .disabled()]);
        let reverted = revert(&mut store, "node", &entity_types()).expect("revert");
        assert!(reverted.enabled);
        assert_eq!(reverted.tags["title"], "[node:title] | [site:name]");
        assert_eq!(store.get("node").expect("get"), Some(reverted));
    }

    #[test]
    fn revert_without_catalog_values_clears_tags() {
        let mut store = MemoryDefaultsStore::new();
        let types = vec![EntityTypeInfo {
            id: "media".to_string(),
            label: "Media".to_string(),
        }];
        let reverted = revert(&mut store, "media", &types).expect("revert");
        assert_eq!(reverted.label, "Media");
        assert!(reverted.tags.is_empty());
    }

    #[test]
    fn bundles_delete_and_never_revert() {
        let mut store = MemoryDefaultsStore::with_records([
            DefaultsRecord::new("global", "Global"),
            DefaultsRecord::new("node__article", "Content: Article"),
        ]);
        let types = entity_types();
        assert!(matches!(
            revert(&mut store, "node__article", &types),
            Err(AdminError::NotRevertible(_))
        ));
        assert!(matches!(
            delete(&mut store, "global", &types),
            Err(AdminError::Protected(_))
        ));
        delete(&mut store, "node__article", &types).expect("delete");
        assert!(matches!(
            delete(&mut store, "node__article", &types),
            Err(AdminError::NotFound(_))
        ));
    }

    #[test]
    fn seeding_keeps_existing_records() {
        let mut store = MemoryDefaultsStore::with_records([
            DefaultsRecord::new("global", "Global").with_tag("title", "Mine"),
        ]);
        let written = seed_install_defaults(&mut store).expect("seed");
        assert!(!written.contains(&"global".to_string()));
        assert!(written.contains(&"node".to_string()));
        let global = store.get("global").expect("get").expect("global");
        assert_eq!(global.tags["title"], "Mine");
    }
}
