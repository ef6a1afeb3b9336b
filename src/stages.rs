use std::collections::HashMap;

use crate::domain::{STAGE_PREFIX, Stage};
use crate::error::ExpressionError;
use crate::tsv::TabularSource;

/// Stage-code vocabulary: raw score-file codes to human-readable names.
/// Loaded once per run, before any score row is processed.
pub struct StageVocabulary {
    stages: HashMap<String, Stage>,
}

impl StageVocabulary {
    /// Loads rows of exactly 3 fields: category, code, display name.
    /// Wrong-arity rows are logged and skipped; duplicate codes keep the
    /// last row observed.
    pub fn load(source: &mut impl TabularSource) -> Result<Self, ExpressionError> {
        let mut stages = HashMap::new();
        while let Some(row) = source.next_row()? {
            if row.len() != 3 {
                tracing::error!(cols = row.len(), "skipping stage row, expected 3 cols");
                continue;
            }
            let category = row[0].trim().to_string();
            let code = row[1].trim().to_string();
            let name = row[2].trim().to_string();
            stages.insert(code, Stage { name, category });
        }
        tracing::debug!(stages = stages.len(), "stage vocabulary loaded");
        Ok(Self { stages })
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&Stage> {
        self.stages.get(code)
    }

    /// Human-readable name for a stage code. Codes missing from the
    /// vocabulary fall back to the raw code with the machine prefix
    /// chopped off.
    pub fn display_name(&self, code: &str) -> String {
        match self.stages.get(code) {
            Some(stage) => stage.name.clone(),
            None => code
                .get(STAGE_PREFIX.len()..)
                .unwrap_or(code)
                .to_string(),
        }
    }
}
