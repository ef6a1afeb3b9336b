use std::collections::{HashMap, HashSet};

use crate::error::ExpressionError;
use crate::tsv::TabularSource;

/// External identifier-resolution collaborator. Both queries are pure
/// predicates; memoizing outcomes is the caller's business.
pub trait IdResolver {
    /// Does the resolver carry any data for this taxon?
    fn has_taxon(&self, taxon_id: &str) -> bool;

    /// Is `identifier` already the taxon's primary identifier form?
    fn is_primary_identifier(&self, taxon_id: &str, identifier: &str) -> bool;
}

/// Resolver backed by a two-column tab-delimited file: taxon id, primary
/// identifier. One row per known primary identifier.
pub struct FileIdResolver {
    taxa: HashMap<String, HashSet<String>>,
}

impl FileIdResolver {
    pub fn load(source: &mut impl TabularSource) -> Result<Self, ExpressionError> {
        let mut taxa: HashMap<String, HashSet<String>> = HashMap::new();
        while let Some(row) = source.next_row()? {
            if row.len() != 2 {
                tracing::error!(
                    cols = row.len(),
                    "skipping resolver row, expected 2 cols"
                );
                continue;
            }
            let taxon = row[0].trim().to_string();
            let identifier = row[1].trim().to_string();
            taxa.entry(taxon).or_default().insert(identifier);
        }
        Ok(Self { taxa })
    }

    pub fn taxon_count(&self) -> usize {
        self.taxa.len()
    }
}

impl IdResolver for FileIdResolver {
    fn has_taxon(&self, taxon_id: &str) -> bool {
        self.taxa.contains_key(taxon_id)
    }

    fn is_primary_identifier(&self, taxon_id: &str, identifier: &str) -> bool {
        self.taxa
            .get(taxon_id)
            .map(|ids| ids.contains(identifier))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TAXON_FLY;
    use crate::tsv::VecSource;

    #[test]
    fn loads_primary_identifiers_per_taxon() {
        let mut source = VecSource::from_lines(&[
            "7227\tFBgn0000003",
            "7227\tFBgn0000008",
            "9606\tENSG00000139618",
            "bad row",
        ]);
        let resolver = FileIdResolver::load(&mut source).unwrap();

        assert_eq!(resolver.taxon_count(), 2);
        assert!(resolver.has_taxon(TAXON_FLY));
        assert!(resolver.is_primary_identifier(TAXON_FLY, "FBgn0000003"));
        assert!(!resolver.is_primary_identifier(TAXON_FLY, "CG9999"));
        assert!(!resolver.is_primary_identifier("10090", "FBgn0000003"));
    }
}
