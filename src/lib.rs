//! Converter for modENCODE FlyBase RNA-Seq expression dumps.
//!
//! Three tab-delimited inputs (stage vocabulary, expression-level
//! vocabulary, score table) are reconciled into a stream of normalized
//! entities: one Organism, one Gene per resolved identifier, and one
//! ExpressionObservation per valid score row.

pub mod config;
pub mod domain;
pub mod error;
pub mod genes;
pub mod output;
pub mod pipeline;
pub mod resolver;
pub mod sink;
pub mod stages;
pub mod terms;
pub mod tsv;
