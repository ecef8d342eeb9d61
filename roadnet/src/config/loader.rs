//! Rules document loader.
//!
//! The loading pipeline for rules YAML files:
//! 1. Size limit check
//! 2. UTF-8 BOM stripping
//! 3. YAML parsing (an empty document is an error)
//! 4. Deserialization to [`RulesDocument`]
//! 5. Validation
//! 6. Freeze with `Arc`
//!
//! Parsed documents are cached per path so that a file serving several
//! books (a multilane description, for instance) is read once.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_yaml::Value;

use crate::config::RulesDocument;
use crate::config::validation::Validator;
use crate::error::ConfigError;

// ============================================================================
// Public API
// ============================================================================

/// Limits for rules documents to prevent resource exhaustion.
#[derive(Debug, Clone)]
pub struct ConfigLimits {
    /// Maximum number of phase rings.
    pub max_phase_rings: usize,

    /// Maximum rules file size in bytes.
    pub max_file_size: usize,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_phase_rings: env_or("ROADNET_MAX_PHASE_RINGS", 1000),
            max_file_size: env_or("ROADNET_MAX_RULES_FILE_SIZE", 10 * 1024 * 1024),
        }
    }
}

/// Files providing each book of a road network.
///
/// The same file may be named more than once.
#[derive(Debug, Clone, Default)]
pub struct RuleSources {
    /// Source of the discrete and range value rules.
    pub road_rule_book: Option<PathBuf>,

    /// Source of the phase rings.
    pub phase_ring_book: Option<PathBuf>,

    /// Source of the intersections.
    pub intersection_book: Option<PathBuf>,
}

impl RuleSources {
    /// Every book comes from the same file.
    #[must_use]
    pub fn single(path: &Path) -> Self {
        Self {
            road_rule_book: Some(path.to_path_buf()),
            phase_ring_book: Some(path.to_path_buf()),
            intersection_book: Some(path.to_path_buf()),
        }
    }
}

/// Result of loading rules.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated document.
    pub document: Arc<RulesDocument>,

    /// Warnings encountered during loading.
    pub warnings: Vec<LoadWarning>,
}

/// Warning during rules loading.
#[derive(Debug, Clone)]
pub struct LoadWarning {
    /// Warning message.
    pub message: String,

    /// Location where the warning occurred.
    pub location: Option<String>,
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} at {location}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Rules document loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    limits: ConfigLimits,
    cache: HashMap<PathBuf, Arc<RulesDocument>>,
}

impl ConfigLoader {
    /// Creates a new loader with the given limits.
    #[must_use]
    pub fn new(limits: ConfigLimits) -> Self {
        Self {
            limits,
            cache: HashMap::new(),
        }
    }

    /// Creates a new loader with limits read from the environment.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ConfigLimits::default())
    }

    /// Loads and validates a single rules file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, exceeds the size limit,
    /// fails to parse, or fails validation.
    pub fn load(&mut self, path: &Path) -> Result<LoadResult, ConfigError> {
        let document = self.parse(path)?;
        let warnings = self.validate(&document, &path.display().to_string())?;
        Ok(LoadResult { document, warnings })
    }

    /// Loads and validates a rules document held in memory.
    ///
    /// `origin` names the document in error messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the content fails to parse or fails validation.
    pub fn load_from_str(&self, content: &str, origin: &str) -> Result<LoadResult, ConfigError> {
        let document = Arc::new(parse_document(content, Path::new(origin))?);
        let warnings = self.validate(&document, origin)?;
        Ok(LoadResult { document, warnings })
    }

    /// Loads each book from its source and validates the combination.
    ///
    /// Only the section relevant to a book is taken from its file. Books
    /// without a source are empty.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be loaded or the combined
    /// document fails validation.
    pub fn load_books(&mut self, sources: &RuleSources) -> Result<LoadResult, ConfigError> {
        let mut combined = RulesDocument::default();
        let mut origins = Vec::new();

        if let Some(path) = &sources.road_rule_book {
            let doc = self.parse(path)?;
            combined.road_geometry.clone_from(&doc.road_geometry);
            combined
                .discrete_value_rules
                .clone_from(&doc.discrete_value_rules);
            combined.range_value_rules.clone_from(&doc.range_value_rules);
            origins.push(path.display().to_string());
        }
        if let Some(path) = &sources.phase_ring_book {
            let doc = self.parse(path)?;
            combined.phase_rings.clone_from(&doc.phase_rings);
            origins.push(path.display().to_string());
        }
        if let Some(path) = &sources.intersection_book {
            let doc = self.parse(path)?;
            combined.intersections.clone_from(&doc.intersections);
            origins.push(path.display().to_string());
        }

        origins.dedup();
        let document = Arc::new(combined);
        let warnings = self.validate(&document, &origins.join(", "))?;
        Ok(LoadResult { document, warnings })
    }

    /// Reads and parses a file, consulting the cache first.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, too large, empty, or not a
    /// valid rules document.
    pub fn parse(&mut self, path: &Path) -> Result<Arc<RulesDocument>, ConfigError> {
        if let Some(doc) = self.cache.get(path) {
            tracing::trace!(path = %path.display(), "rules cache hit");
            return Ok(Arc::clone(doc));
        }

        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        let file_size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if file_size > self.limits.max_file_size {
            return Err(ConfigError::InvalidValue {
                field: "file_size".to_string(),
                value: format!("{file_size} bytes"),
                expected: format!("at most {} bytes", self.limits.max_file_size),
            });
        }

        let raw_content = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        let document = Arc::new(parse_document(&raw_content, path)?);
        tracing::debug!(
            path = %path.display(),
            phase_rings = document.phase_rings.len(),
            intersections = document.intersections.len(),
            "parsed rules document"
        );
        self.cache.insert(path.to_path_buf(), Arc::clone(&document));
        Ok(document)
    }

    fn validate(
        &self,
        document: &RulesDocument,
        origin: &str,
    ) -> Result<Vec<LoadWarning>, ConfigError> {
        let mut validator = Validator::new();
        let result = validator.validate(document, &self.limits);

        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: origin.to_string(),
                errors: result.errors,
            });
        }

        Ok(result
            .warnings
            .into_iter()
            .map(|issue| LoadWarning {
                message: issue.message,
                location: Some(issue.path),
            })
            .collect())
    }
}

fn parse_document(raw_content: &str, path: &Path) -> Result<RulesDocument, ConfigError> {
    let content = raw_content.strip_prefix('\u{feff}').unwrap_or(raw_content);

    let root: Value = serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        line: e.location().map(|l| l.line()),
        message: e.to_string(),
    })?;

    if root.is_null() {
        return Err(ConfigError::ParseError {
            path: path.to_path_buf(),
            line: None,
            message: "Rules file is empty".to_string(),
        });
    }

    serde_yaml::from_value(root).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        line: None,
        message: format!("Failed to deserialize rules: {e}"),
    })
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const RINGS: &str = r"
PhaseRings:
  - ID: CrosswalkRing
    Phases:
      - ID: AllGoPhase
      - ID: AllStopPhase
    PhaseTransitionGraph:
      AllGoPhase:
        - ID: AllStopPhase
      AllStopPhase:
        - ID: AllGoPhase
";

    const INTERSECTIONS: &str = r"
Intersections:
  - ID: Crosswalk
    PhaseRing: CrosswalkRing
";

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn limits() -> ConfigLimits {
        ConfigLimits {
            max_phase_rings: 100,
            max_file_size: 1024 * 1024,
        }
    }

    #[test]
    fn test_load_valid_file() {
        let file = write_temp(RINGS);
        let mut loader = ConfigLoader::new(limits());
        let result = loader.load(file.path()).unwrap();
        assert_eq!(result.document.phase_rings.len(), 1);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let mut loader = ConfigLoader::new(limits());
        let err = loader
            .load(Path::new("/nonexistent/rules.yaml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn test_load_empty_file() {
        let file = write_temp("");
        let mut loader = ConfigLoader::new(limits());
        let err = loader.load(file.path()).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_load_strips_bom() {
        let file = write_temp(&format!("\u{feff}{RINGS}"));
        let mut loader = ConfigLoader::new(limits());
        assert!(loader.load(file.path()).is_ok());
    }

    #[test]
    fn test_load_malformed_yaml_reports_line() {
        let file = write_temp("PhaseRings:\n  - ID: [unclosed\n");
        let mut loader = ConfigLoader::new(limits());
        let err = loader.load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { line: Some(_), .. }));
    }

    #[test]
    fn test_load_file_size_limit() {
        let file = write_temp(RINGS);
        let mut loader = ConfigLoader::new(ConfigLimits {
            max_file_size: 16,
            ..limits()
        });
        let err = loader.load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "file_size"));
    }

    #[test]
    fn test_load_validation_failure() {
        let file = write_temp(&RINGS.replace("        - ID: AllGoPhase\n", "        - ID: Missing\n"));
        let mut loader = ConfigLoader::new(limits());
        let err = loader.load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn test_parse_is_cached() {
        let file = write_temp(RINGS);
        let mut loader = ConfigLoader::new(limits());
        let first = loader.parse(file.path()).unwrap();
        let second = loader.parse(file.path()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_load_books_from_separate_files() {
        let rings = write_temp(RINGS);
        let intersections = write_temp(INTERSECTIONS);
        let mut loader = ConfigLoader::new(limits());
        let result = loader
            .load_books(&RuleSources {
                road_rule_book: None,
                phase_ring_book: Some(rings.path().to_path_buf()),
                intersection_book: Some(intersections.path().to_path_buf()),
            })
            .unwrap();
        assert_eq!(result.document.phase_rings.len(), 1);
        assert_eq!(result.document.intersections.len(), 1);
    }

    #[test]
    fn test_load_books_takes_only_relevant_sections() {
        let both = write_temp(&format!("{RINGS}{INTERSECTIONS}"));
        let mut loader = ConfigLoader::new(limits());
        let result = loader
            .load_books(&RuleSources {
                road_rule_book: None,
                phase_ring_book: Some(both.path().to_path_buf()),
                intersection_book: None,
            })
            .unwrap();
        assert_eq!(result.document.phase_rings.len(), 1);
        assert!(result.document.intersections.is_empty());
    }

    #[test]
    fn test_load_books_intersection_without_rings_fails() {
        let intersections = write_temp(INTERSECTIONS);
        let mut loader = ConfigLoader::new(limits());
        let err = loader
            .load_books(&RuleSources {
                intersection_book: Some(intersections.path().to_path_buf()),
                ..RuleSources::default()
            })
            .unwrap_err();
        assert!(err.to_string().contains("Unknown phase ring"));
    }

    #[test]
    fn test_load_from_str() {
        let loader = ConfigLoader::new(limits());
        let result = loader
            .load_from_str(&format!("{RINGS}{INTERSECTIONS}"), "<inline>")
            .unwrap();
        assert_eq!(result.document.intersections[0].phase_ring, "CrosswalkRing");
    }

    #[test]
    fn test_load_warning_display() {
        let warning = LoadWarning {
            message: "ring never changes".to_string(),
            location: Some("PhaseRings[0]".to_string()),
        };
        assert_eq!(warning.to_string(), "ring never changes at PhaseRings[0]");
    }
}
