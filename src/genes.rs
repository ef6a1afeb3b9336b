use std::collections::HashMap;

use crate::domain::{Entity, Gene, Organism, TAXON_FLY};
use crate::error::ExpressionError;
use crate::resolver::IdResolver;
use crate::sink::Sink;

/// Memoizing gene lookup. Each distinct canonical identifier produces
/// exactly one Gene entity and exactly one sink write per run, no matter
/// how many score rows reference it.
pub struct GeneResolver<R> {
    resolver: Option<R>,
    organism: Organism,
    cache: HashMap<String, Gene>,
}

impl<R: IdResolver> GeneResolver<R> {
    pub fn new(resolver: Option<R>, organism: Organism) -> Self {
        Self {
            resolver,
            organism,
            cache: HashMap::new(),
        }
    }

    pub fn organism(&self) -> &Organism {
        &self.organism
    }

    pub fn created(&self) -> usize {
        self.cache.len()
    }

    /// Resolves a raw identifier to a Gene, creating and storing it on
    /// first sight. `None` means the row must be dropped without side
    /// effects.
    pub fn resolve(
        &mut self,
        raw: &str,
        sink: &mut dyn Sink,
    ) -> Result<Option<Gene>, ExpressionError> {
        let Some(identifier) = self.canonical(raw) else {
            return Ok(None);
        };
        if let Some(gene) = self.cache.get(&identifier) {
            return Ok(Some(gene.clone()));
        }
        let gene = Gene::new(identifier.clone(), &self.organism);
        sink.store(Entity::Gene(gene.clone()))?;
        self.cache.insert(identifier, gene.clone());
        Ok(Some(gene))
    }

    /// Pass-through when no resolver data exists for the fly taxon; an
    /// identifier that is already primary resolves to itself; anything
    /// else is unresolved. No synonym lookup.
    fn canonical(&self, raw: &str) -> Option<String> {
        let Some(resolver) = &self.resolver else {
            return Some(raw.to_string());
        };
        if !resolver.has_taxon(TAXON_FLY) {
            return Some(raw.to_string());
        }
        if resolver.is_primary_identifier(TAXON_FLY, raw) {
            return Some(raw.to_string());
        }
        None
    }
}
