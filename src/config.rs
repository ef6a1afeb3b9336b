use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::error::ExpressionError;

/// On-disk run configuration, `fbexpr.json` by convention. Any path may
/// also be supplied (and overridden) on the command line.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub scores: Option<String>,
    #[serde(default)]
    pub stages: Option<String>,
    #[serde(default)]
    pub levels: Option<String>,
    #[serde(default)]
    pub resolver: Option<String>,
    #[serde(default)]
    pub out: Option<String>,
}

/// Fully-resolved file layout for one conversion run.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub scores: Utf8PathBuf,
    pub stages: Utf8PathBuf,
    pub levels: Utf8PathBuf,
    pub resolver: Option<Utf8PathBuf>,
    pub out: Utf8PathBuf,
}

/// Command-line values layered over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub scores: Option<String>,
    pub stages: Option<String>,
    pub levels: Option<String>,
    pub resolver: Option<String>,
    pub out: Option<String>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Reads the config file (default `fbexpr.json`) and applies CLI
    /// overrides. When every required path is overridden, the config file
    /// is optional.
    pub fn resolve(
        path: Option<&str>,
        overrides: &Overrides,
    ) -> Result<ResolvedConfig, ExpressionError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from("fbexpr.json"),
        };

        let config = if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .map_err(|_| ExpressionError::ConfigRead(config_path.clone()))?;
            serde_json::from_str::<Config>(&content)
                .map_err(|err| ExpressionError::ConfigParse(err.to_string()))?
        } else if path.is_some() {
            return Err(ExpressionError::ConfigRead(config_path));
        } else if overrides_complete(overrides) {
            Config::default()
        } else {
            return Err(ExpressionError::MissingConfig);
        };

        Self::resolve_config(config, overrides)
    }

    pub fn resolve_config(
        config: Config,
        overrides: &Overrides,
    ) -> Result<ResolvedConfig, ExpressionError> {
        let require = |name: &str, over: &Option<String>, file: Option<String>| {
            over.clone()
                .or(file)
                .map(Utf8PathBuf::from)
                .ok_or_else(|| ExpressionError::ConfigMissingPath(name.to_string()))
        };

        Ok(ResolvedConfig {
            schema_version: config.schema_version.unwrap_or(1),
            scores: require("scores", &overrides.scores, config.scores)?,
            stages: require("stages", &overrides.stages, config.stages)?,
            levels: require("levels", &overrides.levels, config.levels)?,
            resolver: overrides
                .resolver
                .clone()
                .or(config.resolver)
                .map(Utf8PathBuf::from),
            out: overrides
                .out
                .clone()
                .or(config.out)
                .map(Utf8PathBuf::from)
                .unwrap_or_else(|| Utf8PathBuf::from("expression.jsonl")),
        })
    }
}

fn overrides_complete(overrides: &Overrides) -> bool {
    overrides.scores.is_some() && overrides.stages.is_some() && overrides.levels.is_some()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn overrides_take_precedence_over_file_values() {
        let config = Config {
            schema_version: None,
            scores: Some("a.tsv".to_string()),
            stages: Some("b.tsv".to_string()),
            levels: Some("c.tsv".to_string()),
            resolver: None,
            out: None,
        };
        let overrides = Overrides {
            scores: Some("override.tsv".to_string()),
            ..Overrides::default()
        };

        let resolved = ConfigLoader::resolve_config(config, &overrides).unwrap();
        assert_eq!(resolved.schema_version, 1);
        assert_eq!(resolved.scores, "override.tsv");
        assert_eq!(resolved.stages, "b.tsv");
        assert_eq!(resolved.resolver, None);
        assert_eq!(resolved.out, "expression.jsonl");
    }

    #[test]
    fn missing_required_path_is_an_error() {
        let err =
            ConfigLoader::resolve_config(Config::default(), &Overrides::default()).unwrap_err();
        assert_matches!(err, ExpressionError::ConfigMissingPath(name) if name == "scores");
    }
}
