use serde::Serialize;

use crate::domain::{DATA_SOURCE_NAME, DATASET_TITLE, Entity, ExpressionObservation, Organism};
use crate::error::ExpressionError;
use crate::genes::GeneResolver;
use crate::resolver::IdResolver;
use crate::sink::Sink;
use crate::stages::StageVocabulary;
use crate::terms::TermVocabulary;
use crate::tsv::TabularSource;

/// Counters for one conversion run, reported as JSON by the CLI.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    pub dataset: String,
    pub rows_read: usize,
    pub rows_malformed: usize,
    pub rows_foreign_source: usize,
    pub rows_unresolved_gene: usize,
    pub bad_scores: usize,
    pub observations: usize,
    pub genes_created: usize,
    pub finished_at: Option<String>,
}

/// The record-joining pipeline: both vocabularies are loaded to completion
/// before the score table is streamed, genes are resolved and memoized on
/// first encounter, and every valid row becomes one observation in the
/// sink. Row-level problems are logged and skipped; only unopenable
/// sources and sink failures abort the run.
pub struct Converter<R, S> {
    stages: StageVocabulary,
    terms: TermVocabulary,
    genes: GeneResolver<R>,
    sink: S,
    stats: RunStats,
}

impl<R: IdResolver, S: Sink> Converter<R, S> {
    /// Creates the converter and stores the run's Organism singleton.
    pub fn new(
        resolver: Option<R>,
        mut sink: S,
        stages_source: &mut impl TabularSource,
        terms_source: &mut impl TabularSource,
    ) -> Result<Self, ExpressionError> {
        let organism = Organism::fly();
        sink.store(Entity::Organism(organism.clone()))?;

        let stages = StageVocabulary::load(stages_source)?;
        let terms = TermVocabulary::load(terms_source)?;

        Ok(Self {
            stages,
            terms,
            genes: GeneResolver::new(resolver, organism),
            sink,
            stats: RunStats {
                dataset: DATASET_TITLE.to_string(),
                ..RunStats::default()
            },
        })
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Streams the score table once, emitting one observation per valid
    /// row.
    pub fn run(&mut self, scores: &mut impl TabularSource) -> Result<(), ExpressionError> {
        while let Some(row) = scores.next_row()? {
            self.stats.rows_read += 1;
            self.process_row(&row)?;
        }
        self.stats.genes_created = self.genes.created();
        self.stats.finished_at = Some(chrono::Utc::now().to_rfc3339());
        tracing::info!(
            rows = self.stats.rows_read,
            observations = self.stats.observations,
            genes = self.stats.genes_created,
            "score file processed"
        );
        Ok(())
    }

    fn process_row(&mut self, row: &[String]) -> Result<(), ExpressionError> {
        if row.len() < 5 {
            tracing::error!(cols = row.len(), "skipping score row, expected at least 5 cols");
            self.stats.rows_malformed += 1;
            return Ok(());
        }

        let fbgn = &row[1]; // FBgn0000003
        let source = &row[4]; // modENCODE_mRNA-Seq_U

        // rows from other pipelines are not this converter's concern
        if !source.starts_with(DATA_SOURCE_NAME) {
            self.stats.rows_foreign_source += 1;
            return Ok(());
        }

        let Some(stage) = row.get(6) else {
            tracing::error!(cols = row.len(), "skipping score row, no stage column");
            self.stats.rows_malformed += 1;
            return Ok(());
        };

        let mut observation = ExpressionObservation {
            stage: self.stages.display_name(stage),
            expression_score: None,
            expression_level: None,
            gene: String::new(),
        };

        if let Some(rpkm) = row.get(7).filter(|value| !value.is_empty()) {
            match rpkm.parse::<i64>() {
                Ok(score) => observation.expression_score = Some(score),
                Err(_) => {
                    tracing::warn!(score = %rpkm, "bad score");
                    self.stats.bad_scores += 1;
                }
            }
        }

        if let Some(level) = row.get(8).filter(|value| !value.is_empty()) {
            if let Some(name) = self.terms.display_name(level) {
                observation.expression_level = Some(name.to_string());
            }
        }

        match self.genes.resolve(fbgn, &mut self.sink)? {
            Some(gene) => {
                observation.gene = gene.primary_identifier;
                self.sink.store(Entity::ExpressionObservation(observation))?;
                self.stats.observations += 1;
            }
            None => {
                tracing::warn!(identifier = %fbgn, "gene did not resolve, dropping row");
                self.stats.rows_unresolved_gene += 1;
            }
        }
        Ok(())
    }

    /// Hands back the sink and the final stats.
    pub fn finish(mut self) -> (S, RunStats) {
        self.stats.genes_created = self.genes.created();
        (self.sink, self.stats)
    }
}
