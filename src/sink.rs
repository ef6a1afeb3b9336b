use std::fs;
use std::io::{BufWriter, Write};

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::NamedTempFile;

use crate::domain::Entity;
use crate::error::ExpressionError;

/// Persistence boundary. A failed write means the output backend itself is
/// unusable, so errors here abort the run.
pub trait Sink {
    fn store(&mut self, entity: Entity) -> Result<(), ExpressionError>;
}

/// Writes one JSON object per line to a temporary file, then persists it
/// over the final path on [`JsonLinesSink::finish`]. An aborted run leaves
/// no partial output behind.
pub struct JsonLinesSink {
    destination: Utf8PathBuf,
    writer: BufWriter<NamedTempFile>,
    written: usize,
}

impl JsonLinesSink {
    pub fn create(destination: &Utf8Path) -> Result<Self, ExpressionError> {
        let parent = destination
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or(Utf8Path::new("."));
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| ExpressionError::Filesystem(err.to_string()))?;
        let temp = tempfile::Builder::new()
            .prefix("fbexpr-out")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| ExpressionError::Filesystem(err.to_string()))?;
        Ok(Self {
            destination: destination.to_owned(),
            writer: BufWriter::new(temp),
            written: 0,
        })
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn finish(self) -> Result<usize, ExpressionError> {
        let temp = self
            .writer
            .into_inner()
            .map_err(|err| ExpressionError::Sink(err.to_string()))?;
        temp.persist(self.destination.as_std_path())
            .map_err(|err| ExpressionError::Filesystem(err.to_string()))?;
        Ok(self.written)
    }
}

impl Sink for JsonLinesSink {
    fn store(&mut self, entity: Entity) -> Result<(), ExpressionError> {
        let json =
            serde_json::to_string(&entity).map_err(|err| ExpressionError::Sink(err.to_string()))?;
        self.writer
            .write_all(json.as_bytes())
            .and_then(|()| self.writer.write_all(b"\n"))
            .map_err(|err| ExpressionError::Sink(err.to_string()))?;
        self.written += 1;
        Ok(())
    }
}

/// Collects entities in memory. Used for dry runs and in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub entities: Vec<Entity>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn genes(&self) -> impl Iterator<Item = &crate::domain::Gene> {
        self.entities.iter().filter_map(|entity| match entity {
            Entity::Gene(gene) => Some(gene),
            _ => None,
        })
    }

    pub fn observations(&self) -> impl Iterator<Item = &crate::domain::ExpressionObservation> {
        self.entities.iter().filter_map(|entity| match entity {
            Entity::ExpressionObservation(obs) => Some(obs),
            _ => None,
        })
    }
}

impl Sink for MemorySink {
    fn store(&mut self, entity: Entity) -> Result<(), ExpressionError> {
        self.entities.push(entity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;

    use super::*;
    use crate::domain::Organism;

    #[test]
    fn jsonl_sink_persists_on_finish() {
        let temp = tempfile::tempdir().unwrap();
        let out = Utf8PathBuf::from_path_buf(temp.path().join("entities.jsonl")).unwrap();

        let mut sink = JsonLinesSink::create(&out).unwrap();
        sink.store(Entity::Organism(Organism::fly())).unwrap();
        assert!(!out.as_std_path().exists());

        let written = sink.finish().unwrap();
        assert_eq!(written, 1);
        let content = std::fs::read_to_string(out.as_std_path()).unwrap();
        assert_eq!(
            content.trim(),
            r#"{"class":"Organism","taxon_id":"7227"}"#
        );
    }

    #[test]
    fn memory_sink_filters_by_class() {
        let mut sink = MemorySink::new();
        sink.store(Entity::Organism(Organism::fly())).unwrap();
        assert_eq!(sink.genes().count(), 0);
        assert_eq!(sink.entities.len(), 1);
        assert_eq!(sink.entities[0].class_name(), "Organism");
    }
}
