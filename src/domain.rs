use std::fmt;

use serde::{Deserialize, Serialize};

/// NCBI taxon for Drosophila melanogaster, the only organism this
/// converter handles.
pub const TAXON_FLY: &str = "7227";

/// Source label that marks rows belonging to this converter, both in the
/// score file and in the expression-level vocabulary.
pub const DATA_SOURCE_NAME: &str = "modENCODE";

/// Stage codes in the score file carry this machine prefix; it is chopped
/// off when no human-readable vocabulary entry exists.
pub const STAGE_PREFIX: &str = "me_mRNA_";

pub const DATASET_TITLE: &str = "FlyBase expression data";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organism {
    pub taxon_id: String,
}

impl Organism {
    pub fn fly() -> Self {
        Self {
            taxon_id: TAXON_FLY.to_string(),
        }
    }
}

impl fmt::Display for Organism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "taxon:{}", self.taxon_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gene {
    pub primary_identifier: String,
    /// Taxon reference back to the run's Organism singleton.
    pub organism: String,
}

impl Gene {
    pub fn new(primary_identifier: impl Into<String>, organism: &Organism) -> Self {
        Self {
            primary_identifier: primary_identifier.into(),
            organism: organism.taxon_id.clone(),
        }
    }
}

/// One row of the stage vocabulary. Never persisted; consulted only to
/// translate stage codes into display names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub name: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionObservation {
    pub stage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression_score: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression_level: Option<String>,
    /// Primary identifier of the resolved gene.
    pub gene: String,
}

/// Envelope for everything a [`crate::sink::Sink`] accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class")]
pub enum Entity {
    Organism(Organism),
    Gene(Gene),
    ExpressionObservation(ExpressionObservation),
}

impl Entity {
    pub fn class_name(&self) -> &'static str {
        match self {
            Entity::Organism(_) => "Organism",
            Entity::Gene(_) => "Gene",
            Entity::ExpressionObservation(_) => "ExpressionObservation",
        }
    }
}
