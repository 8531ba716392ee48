pub mod catalog;
pub mod characters;
pub mod fallback;
pub mod flows;
mod normalizer;
mod parser;

pub use catalog::{
    Catalog, CatalogMeta, CatalogStatistics, Condition, DemoMetrics, Document, DocumentFields,
    Domain, Field, FieldKind, FieldSource, ModeDescriptor, ADMINISTRATION_DOMAIN_ID,
};
pub use characters::{Character, CharacterDomain};
pub use flows::{ChecklistItem, FlowCatalog, Question, QuestionOption, BASE_GROUP};

use serde::Serialize;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug)]
pub enum DatasetError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json(serde_json::Error),
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetError::Io { path, source } => {
                write!(f, "failed to read dataset {}: {}", path.display(), source)
            }
            DatasetError::Json(err) => write!(f, "invalid dataset JSON: {}", err),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetError::Io { source, .. } => Some(source),
            DatasetError::Json(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for DatasetError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl Catalog {
    pub fn from_json(raw: &str) -> Result<Self, DatasetError> {
        let parsed: parser::RawCatalog = serde_json::from_str(raw)?;
        Ok(normalizer::normalize_catalog(parsed))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let parsed: parser::RawCatalog = serde_json::from_reader(reader)?;
        Ok(normalizer::normalize_catalog(parsed))
    }
}

impl FlowCatalog {
    pub fn from_json(raw: &str) -> Result<Self, DatasetError> {
        let parsed: parser::RawFlows = serde_json::from_str(raw)?;
        Ok(normalizer::normalize_flows(parsed))
    }
}

pub fn characters_from_json(raw: &str) -> Result<Vec<Character>, DatasetError> {
    let file: characters::CharacterFile = serde_json::from_str(raw)?;
    Ok(file.characters)
}

/// Where a loaded dataset came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "lowercase")]
pub enum DatasetSource {
    File(PathBuf),
    Fallback,
}

/// A dataset plus whether it had to be replaced by the built-in fallback.
#[derive(Debug, Clone)]
pub struct LoadOutcome<T> {
    pub value: T,
    pub source: DatasetSource,
    pub warning: Option<String>,
}

impl<T> LoadOutcome<T> {
    pub fn degraded(&self) -> bool {
        self.source == DatasetSource::Fallback
    }
}

fn read_dataset(path: &Path) -> Result<String, DatasetError> {
    fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_with_fallback<T>(
    label: &str,
    path: &Path,
    parse: impl FnOnce(&str) -> Result<T, DatasetError>,
    fallback: impl FnOnce() -> T,
) -> LoadOutcome<T> {
    match read_dataset(path).and_then(|raw| parse(&raw)) {
        Ok(value) => {
            info!(dataset = label, path = %path.display(), "dataset loaded");
            LoadOutcome {
                value,
                source: DatasetSource::File(path.to_path_buf()),
                warning: None,
            }
        }
        Err(err) => {
            warn!(dataset = label, path = %path.display(), error = %err, "using built-in fallback dataset");
            LoadOutcome {
                value: fallback(),
                source: DatasetSource::Fallback,
                warning: Some(format!(
                    "{label} dataset unavailable ({err}); showing built-in sample data"
                )),
            }
        }
    }
}

pub fn load_catalog(path: &Path) -> LoadOutcome<Catalog> {
    load_with_fallback("domains", path, Catalog::from_json, fallback::fallback_catalog)
}

pub fn load_flows(path: &Path) -> LoadOutcome<FlowCatalog> {
    load_with_fallback("flows", path, FlowCatalog::from_json, fallback::fallback_flows)
}

pub fn load_characters(path: &Path) -> LoadOutcome<Vec<Character>> {
    load_with_fallback("characters", path, characters_from_json, Vec::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_degrades_to_fallback() {
        let outcome = load_catalog(Path::new("/nonexistent/dx-sim/domains.json"));
        assert!(outcome.degraded());
        assert!(outcome
            .warning
            .as_deref()
            .is_some_and(|warning| warning.contains("domains dataset unavailable")));
        assert!(!outcome.value.domains.is_empty());
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = Catalog::from_json("{\"domains\": 12}").expect_err("domains must be a list");
        assert!(err.to_string().starts_with("invalid dataset JSON"));
    }

    #[test]
    fn characters_parse_from_wrapper() {
        let characters = characters_from_json(
            r#"{"characters": [{"id": "tanaka", "name": "Tanaka", "painPoints": ["queues"]}]}"#,
        )
        .expect("characters parse");
        assert_eq!(characters[0].pain_points, vec!["queues".to_string()]);
    }
}
