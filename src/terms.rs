use std::collections::HashMap;

use crate::domain::DATA_SOURCE_NAME;
use crate::error::ExpressionError;
use crate::tsv::TabularSource;

/// Expression-level vocabulary, filtered to modENCODE rows. The raw codes
/// carry a one-letter qualifier prefix (`T07`) that the score file's level
/// references (`ME_07`) do not, so both sides are normalized down to the
/// bare code before lookup.
pub struct TermVocabulary {
    terms: HashMap<String, String>,
}

impl TermVocabulary {
    /// Loads rows of exactly 6 fields: source, code, two unused, display
    /// name, one unused. Rows from other sources are silently discarded;
    /// wrong-arity rows are logged and skipped.
    pub fn load(source: &mut impl TabularSource) -> Result<Self, ExpressionError> {
        let mut terms = HashMap::new();
        while let Some(row) = source.next_row()? {
            if row.len() != 6 {
                tracing::error!(cols = row.len(), "skipping term row, expected 6 cols");
                continue;
            }
            if row[0] != DATA_SOURCE_NAME {
                continue;
            }
            let code = &row[1];
            let name = row[3].clone();
            // drop the one-letter qualifier prefix
            if let Some(normalized) = code.get(1..) {
                terms.insert(normalized.to_string(), name);
            }
        }
        tracing::debug!(terms = terms.len(), "term vocabulary loaded");
        Ok(Self { terms })
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Display name for a score-file level code, `None` when unmapped.
    /// Level codes like `ME_07` are reduced to their trailing segment
    /// before lookup.
    pub fn display_name(&self, level_code: &str) -> Option<&str> {
        let normalized = level_code.rsplit('_').next().unwrap_or(level_code);
        self.terms.get(normalized).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tsv::VecSource;

    #[test]
    fn keeps_only_modencode_rows() {
        let mut source = VecSource::from_lines(&[
            "modENCODE\tT07\tx\tNo expression\ty\tz",
            "FlyAtlas\tT08\tx\tHigh expression\ty\tz",
            "modENCODE\ttoo\tfew\tcols",
        ]);
        let vocab = TermVocabulary::load(&mut source).unwrap();

        assert_eq!(vocab.len(), 1);
        assert_eq!(vocab.display_name("ME_07"), Some("No expression"));
        assert_eq!(vocab.display_name("ME_08"), None);
    }

    #[test]
    fn lookup_normalizes_level_codes() {
        let mut source = VecSource::from_lines(&["modENCODE\tT01\tx\tExtremely low\ty\tz"]);
        let vocab = TermVocabulary::load(&mut source).unwrap();

        assert_eq!(vocab.display_name("ME_01"), Some("Extremely low"));
        assert_eq!(vocab.display_name("01"), Some("Extremely low"));
        assert_eq!(vocab.display_name("XX_02"), None);
    }
}
