//! Test case loading from YAML and JSON files

use std::path::Path;

use stepwise_common::TestCase;

use crate::error::{EngineError, EngineResult};

/// Parse a test case from YAML
pub fn from_yaml(yaml: &str) -> EngineResult<TestCase> {
    serde_yaml::from_str(yaml).map_err(EngineError::from)
}

/// Parse a test case from JSON
pub fn from_json(json: &str) -> EngineResult<TestCase> {
    serde_json::from_str(json).map_err(EngineError::from)
}

fn is_test_case_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == "yaml" || ext == "yml" || ext == "json")
        .unwrap_or(false)
}

/// Parse a test case file, picking the format from its extension
pub fn from_file(path: &Path) -> EngineResult<TestCase> {
    let content = std::fs::read_to_string(path)?;
    let parsed = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => from_yaml(&content),
        Some("json") => from_json(&content),
        _ => return Err(EngineError::UnsupportedFile(path.to_path_buf())),
    };
    parsed.map_err(|e| EngineError::TestCaseParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Load all test cases below a directory, sorted by path.
///
/// Unreadable entries fail the whole load.
pub fn load_all(dir: &Path) -> EngineResult<Vec<TestCase>> {
    let mut paths = Vec::new();
    for entry in walkdir::WalkDir::new(dir) {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() && is_test_case_file(entry.path()) {
            paths.push(entry.into_path());
        }
    }
    paths.sort();

    paths.iter().map(|p| from_file(p)).collect()
}

/// Load test cases from a mix of files and directories
pub fn load_paths<P: AsRef<Path>>(paths: &[P]) -> EngineResult<Vec<TestCase>> {
    let mut cases = Vec::new();
    for path in paths {
        let path = path.as_ref();
        if path.is_dir() {
            cases.extend(load_all(path)?);
        } else {
            cases.push(from_file(path)?);
        }
    }
    Ok(cases)
}

/// Filter test cases by tag
pub fn filter_by_tag(cases: Vec<TestCase>, tag: &str) -> Vec<TestCase> {
    cases.into_iter().filter(|c| c.has_tag(tag)).collect()
}
