//! This module provides loaders for instruction tables and inductor configurations, from
//! files, directories and strings.

use crate::inductor::InductorConfig;
use crate::parser::parse;
use crate::types::{InductionError, InstructionTable};
use std::fs;
use std::path::{Path, PathBuf};

/// The file extension of textual instruction tables.
pub const TABLE_EXTENSION: &str = "tm";

/// `TableLoader` is a utility struct for loading instruction tables.
pub struct TableLoader;

impl TableLoader {
    /// Loads a single instruction table from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(InstructionTable)` if the file is successfully read and parsed.
    /// * `Err(InductionError::FileError)` if the file cannot be read.
    /// * `Err(InductionError::ParseError)` if the file content is not a valid table.
    pub fn load_table(path: &Path) -> Result<InstructionTable, InductionError> {
        parse(&read(path)?)
    }

    /// Loads a single instruction table from the provided string content.
    pub fn load_table_from_string(content: &str) -> Result<InstructionTable, InductionError> {
        parse(content)
    }

    /// Loads every `.tm` file in `directory`, sorted by path.
    ///
    /// Directories and files with other extensions are skipped. Each element of the
    /// result is either the path and its table, or the error met while loading it.
    pub fn load_tables(
        directory: &Path,
    ) -> Vec<Result<(PathBuf, InstructionTable), InductionError>> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(InductionError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| {
                path.is_file() && path.extension().is_some_and(|ext| ext == TABLE_EXTENSION)
            })
            .collect();
        paths.sort();

        paths
            .into_iter()
            .map(|path| Self::load_table(&path).map(|table| (path, table)))
            .collect()
    }
}

/// `ConfigLoader` reads an [`InductorConfig`] from JSON. Missing fields take their
/// defaults, and the result is validated.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load_config(path: &Path) -> Result<InductorConfig, InductionError> {
        Self::load_config_from_string(&read(path)?)
    }

    pub fn load_config_from_string(content: &str) -> Result<InductorConfig, InductionError> {
        let config: InductorConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

fn read(path: &Path) -> Result<String, InductionError> {
    fs::read_to_string(path).map_err(|e| {
        InductionError::FileError(format!("Failed to read file {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_table_from_file() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "fill.tm", "0, 0 -> 0, 1, R\n0, 1 -> halt\n");

        let table = TableLoader::load_table(&path).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let result = TableLoader::load_table(Path::new("/nonexistent/table.tm"));
        assert!(matches!(result, Err(InductionError::FileError(_))));
    }

    #[test]
    fn test_load_tables_from_directory() {
        let dir = tempdir().unwrap();
        write(dir.path(), "b.tm", "0, 0 -> halt");
        write(dir.path(), "a.tm", "0, 0 -> 0, 1, R");
        write(dir.path(), "broken.tm", "0, 0 -> sideways");
        write(dir.path(), "notes.txt", "not a table");

        let results = TableLoader::load_tables(dir.path());
        assert_eq!(results.len(), 3);

        let (first, _) = results[0].as_ref().unwrap();
        assert!(first.ends_with("a.tm"));
        assert!(results[1].is_ok());
        assert!(matches!(results[2], Err(InductionError::ParseError(_))));
    }

    #[test]
    fn test_load_tables_from_missing_directory() {
        let results = TableLoader::load_tables(Path::new("/nonexistent/tables"));
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(InductionError::FileError(_))));
    }

    #[test]
    fn test_load_config() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "config.json",
            r#"{"base_numerator": 1, "base_denominator": 2, "batch_steps": 50}"#,
        );

        let config = ConfigLoader::load_config(&path).unwrap();
        assert_eq!(config.base_numerator, 1);
        assert_eq!(config.base_denominator, 2);
        assert_eq!(config.batch_steps, 50);
    }

    #[test]
    fn test_invalid_config() {
        let result = ConfigLoader::load_config_from_string(
            r#"{"base_numerator": 3, "base_denominator": 2}"#,
        );
        assert!(matches!(result, Err(InductionError::InvalidConfig(_))));

        let result = ConfigLoader::load_config_from_string("{ not json");
        assert!(matches!(result, Err(InductionError::JsonError(_))));
    }
}
