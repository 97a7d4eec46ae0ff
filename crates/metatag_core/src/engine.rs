use std::collections::BTreeMap;

use crate::config::EngineConfig;
use crate::model::{OutputElement, RenderContext, ResolveTarget, ResolvedTagSet};
use crate::registry::{RegistryError, TagRegistry};
use crate::render::{ElementRenderer, RenderOptions};
use crate::resolve::{DefaultsResolver, ResolveError};
use crate::store::DefaultsStore;
use crate::tokens::{TokenSubstitutor, TokenTable};

pub struct MetatagEngine<S, T> {
    store: S,
    registry: TagRegistry,
    tokens: T,
    options: RenderOptions,
}

impl<S: DefaultsStore> MetatagEngine<S, TokenTable> {
    pub fn from_config(store: S, config: &EngineConfig) -> Result<Self, RegistryError> {
        Ok(Self::new(
            store,
            config.registry()?,
            config.token_table(),
            config.render.clone(),
        ))
    }
}

impl<S: DefaultsStore, T: TokenSubstitutor> MetatagEngine<S, T> {
    pub fn new(store: S, registry: TagRegistry, tokens: T, options: RenderOptions) -> Self {
        Self {
            store,
            registry,
            tokens,
            options,
        }
    }

    pub fn resolve(&self, target: &ResolveTarget) -> Result<ResolvedTagSet, ResolveError> {
        DefaultsResolver::new(&self.store).resolve_for_context(target)
    }

    pub fn render(&self, resolved: &ResolvedTagSet, ctx: &RenderContext) -> Vec<OutputElement> {
        ElementRenderer::new(&self.registry, &self.tokens, &self.options).render(resolved, ctx)
    }

    pub fn head_elements(&self, ctx: &RenderContext) -> Result<Vec<OutputElement>, ResolveError> {
        self.head_elements_with_overrides(ctx, &BTreeMap::new())
    }

    pub fn head_elements_with_overrides(
        &self,
        ctx: &RenderContext,
        overrides: &BTreeMap<String, String>,
    ) -> Result<Vec<OutputElement>, ResolveError> {
        let mut resolved = self.resolve(&ctx.target)?;
        resolved.overlay(overrides);
        Ok(self.render(&resolved, ctx))
    }
}
