use std::fs::File;
use std::io::{BufRead, BufReader, Read};

use camino::Utf8Path;
use flate2::read::MultiGzDecoder;

use crate::error::ExpressionError;

/// A sequence of tab-delimited rows in file order. Each component of the
/// converter opens its own source; sources are consumed exactly once and
/// are not restartable.
pub trait TabularSource {
    /// Next data row, or `None` at exhaustion. Comment (`#`-prefixed) and
    /// blank lines are not data rows.
    fn next_row(&mut self) -> Result<Option<Vec<String>>, ExpressionError>;
}

pub struct FileSource {
    path: String,
    reader: BufReader<Box<dyn Read>>,
}

impl std::fmt::Debug for FileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSource")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl FileSource {
    /// Opens a tab-delimited file, transparently decompressing it when the
    /// path ends in `.gz` (FlyBase publishes the score dumps gzipped).
    pub fn open(path: &Utf8Path) -> Result<Self, ExpressionError> {
        let file = File::open(path.as_std_path()).map_err(|err| ExpressionError::SourceOpen {
            path: path.to_string(),
            message: err.to_string(),
        })?;
        let reader: Box<dyn Read> = if path.as_str().ends_with(".gz") {
            Box::new(MultiGzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(Self {
            path: path.to_string(),
            reader: BufReader::new(reader),
        })
    }
}

impl TabularSource for FileSource {
    fn next_row(&mut self) -> Result<Option<Vec<String>>, ExpressionError> {
        loop {
            let mut line = String::new();
            let read = self.reader.read_line(&mut line).map_err(|err| {
                ExpressionError::SourceRead {
                    path: self.path.clone(),
                    message: err.to_string(),
                }
            })?;
            if read == 0 {
                return Ok(None);
            }
            let trimmed = line.trim_end_matches(['\n', '\r']);
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Ok(Some(split_row(trimmed)));
        }
    }
}

fn split_row(line: &str) -> Vec<String> {
    line.split('\t').map(str::to_string).collect()
}

/// In-memory source for tests.
pub struct VecSource {
    rows: std::vec::IntoIter<Vec<String>>,
}

impl VecSource {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows: rows.into_iter(),
        }
    }

    /// Builds a source from `\t`-joined literal lines.
    pub fn from_lines(lines: &[&str]) -> Self {
        Self::new(lines.iter().map(|line| split_row(line)).collect())
    }
}

impl TabularSource for VecSource {
    fn next_row(&mut self) -> Result<Option<Vec<String>>, ExpressionError> {
        Ok(self.rows.next())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use camino::Utf8PathBuf;
    use flate2::Compression;
    use flate2::write::GzEncoder;

    use super::*;

    fn drain(mut source: impl TabularSource) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        while let Some(row) = source.next_row().unwrap() {
            rows.push(row);
        }
        rows
    }

    #[test]
    fn splits_on_tabs_and_skips_comments() {
        let temp = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(temp.path().join("rows.tsv")).unwrap();
        std::fs::write(
            path.as_std_path(),
            "# header comment\na\tb\tc\n\nd\te\n",
        )
        .unwrap();

        let rows = drain(FileSource::open(&path).unwrap());
        assert_eq!(rows, vec![vec!["a", "b", "c"], vec!["d", "e"]]);
    }

    #[test]
    fn preserves_empty_trailing_fields() {
        let mut source = VecSource::from_lines(&["a\tb\t"]);
        let row = source.next_row().unwrap().unwrap();
        assert_eq!(row, vec!["a", "b", ""]);
    }

    #[test]
    fn reads_gzipped_files() {
        let temp = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(temp.path().join("rows.tsv.gz")).unwrap();
        let file = std::fs::File::create(path.as_std_path()).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(b"x\ty\n").unwrap();
        encoder.finish().unwrap();

        let rows = drain(FileSource::open(&path).unwrap());
        assert_eq!(rows, vec![vec!["x", "y"]]);
    }

    #[test]
    fn open_missing_file_fails() {
        let err = FileSource::open(Utf8Path::new("/nonexistent/scores.tsv")).unwrap_err();
        assert!(matches!(err, ExpressionError::SourceOpen { .. }));
    }
}
