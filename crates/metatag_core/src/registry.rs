use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::catalog;
use crate::model::{FALLBACK_GROUP, GroupDefinition, TagDefinition};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate group: {0}")]
    DuplicateGroup(String),
    #[error("duplicate tag: {0}")]
    DuplicateTag(String),
    #[error("tag {tag} references unknown group {group}")]
    UnknownGroup { tag: String, group: String },
}

pub type TagSortKey = (i32, usize, i32, usize);

#[derive(Debug, Clone)]
pub struct TagRegistry {
    groups: Vec<GroupDefinition>,
    tags: Vec<TagDefinition>,
    group_index: HashMap<String, usize>,
    tag_index: HashMap<String, usize>,
    groups_sorted: Vec<usize>,
    tags_sorted: Vec<usize>,
}

impl TagRegistry {
    pub fn new(
        groups: Vec<GroupDefinition>,
        tags: Vec<TagDefinition>,
    ) -> Result<Self, RegistryError> {
        let mut seen_groups = HashSet::with_capacity(groups.len());
        for group in &groups {
            if !seen_groups.insert(group.name.as_str()) {
                return Err(RegistryError::DuplicateGroup(group.name.clone()));
            }
        }
        let mut seen_tags = HashSet::with_capacity(tags.len());
        for tag in &tags {
            if !seen_groups.contains(tag.group.as_str()) {
                return Err(RegistryError::UnknownGroup {
                    tag: tag.name.clone(),
                    group: tag.group.clone(),
                });
            }
            if !seen_tags.insert(tag.name.as_str()) {
                return Err(RegistryError::DuplicateTag(tag.name.clone()));
            }
        }
        Ok(Self::indexed(groups, tags))
    }

    pub fn builtin() -> Self {
        Self::indexed(catalog::builtin_groups(), catalog::builtin_tags())
    }

    pub fn builtin_with(extra_tags: Vec<TagDefinition>) -> Result<Self, RegistryError> {
        let mut tags = catalog::builtin_tags();
        tags.extend(extra_tags);
        Self::new(catalog::builtin_groups(), tags)
    }

    pub fn get_tag(&self, name: &str) -> Option<&TagDefinition> {
        self.tag_index.get(name).map(|idx| &self.tags[*idx])
    }

    pub fn get_group(&self, name: &str) -> Option<&GroupDefinition> {
        self.group_index.get(name).map(|idx| &self.groups[*idx])
    }

    pub fn groups_ordered_by_weight(&self) -> Vec<&GroupDefinition> {
        self.groups_sorted
            .iter()
            .map(|idx| &self.groups[*idx])
            .collect()
    }

    pub fn tags_ordered_by_group_then_weight(&self) -> Vec<&TagDefinition> {
        self.tags_sorted.iter().map(|idx| &self.tags[*idx]).collect()
    }

    pub fn groups_with_tags(&self) -> Vec<(&GroupDefinition, Vec<&TagDefinition>)> {
        let ordered_tags = self.tags_ordered_by_group_then_weight();
        self.groups_ordered_by_weight()
            .into_iter()
            .filter_map(|group| {
                let tags: Vec<_> = ordered_tags
                    .iter()
                    .copied()
                    .filter(|tag| tag.group == group.name)
                    .collect();
                (!tags.is_empty()).then_some((group, tags))
            })
            .collect()
    }

    pub fn sort_key(&self, tag_name: &str) -> TagSortKey {
        match self.tag_index.get(tag_name) {
            Some(idx) => self.registered_sort_key(*idx),
            None => {
                let (group_weight, group_pos) = self.group_rank(FALLBACK_GROUP);
                (group_weight, group_pos, 0, usize::MAX)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    fn indexed(groups: Vec<GroupDefinition>, tags: Vec<TagDefinition>) -> Self {
        let group_index = groups
            .iter()
            .enumerate()
            .map(|(idx, group)| (group.name.clone(), idx))
            .collect();
        let tag_index = tags
            .iter()
            .enumerate()
            .map(|(idx, tag)| (tag.name.clone(), idx))
            .collect();

        // sort_by_key is stable, so ties keep registration order
        let mut groups_sorted: Vec<usize> = (0..groups.len()).collect();
        groups_sorted.sort_by_key(|idx| groups[*idx].weight);

        let mut registry = Self {
            groups,
            tags,
            group_index,
            tag_index,
            groups_sorted,
            tags_sorted: Vec::new(),
        };
        let mut tags_sorted: Vec<usize> = (0..registry.tags.len()).collect();
        tags_sorted.sort_by_key(|idx| registry.registered_sort_key(*idx));
        registry.tags_sorted = tags_sorted;
        registry
    }

    fn registered_sort_key(&self, idx: usize) -> TagSortKey {
        let tag = &self.tags[idx];
        let (group_weight, group_pos) = self.group_rank(&tag.group);
        (group_weight, group_pos, tag.weight, idx)
    }

    fn group_rank(&self, group: &str) -> (i32, usize) {
        self.group_index
            .get(group)
            .and_then(|idx| {
                let pos = self.groups_sorted.iter().position(|sorted| sorted == idx)?;
                Some((self.groups[*idx].weight, pos))
            })
            .unwrap_or((0, 0))
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
