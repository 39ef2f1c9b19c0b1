use crate::skeleton::Adjacency;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = ".skeldoc.json";

/// Controls source discovery for `render` (what to skip).
///
/// Note: `.gitignore` is always respected by the scanner; these are additional
/// hard skips.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directory *names* to skip anywhere in the tree (e.g. "generated", "vendor").
    ///
    /// These are compared against path components, not full paths.
    pub exclude_dir_names: Vec<String>,
    pub max_file_bytes: u64,
}

/// Hard ceiling: larger files are always skipped, regardless of config.
pub const ABSOLUTE_MAX_FILE_BYTES: u64 = 1_000_000; // 1 MB

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclude_dir_names: vec![],
            max_file_bytes: 512 * 1024,
        }
    }
}

impl ScanConfig {
    pub fn effective_max_file_bytes(&self) -> u64 {
        self.max_file_bytes.min(ABSOLUTE_MAX_FILE_BYTES)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where rendered docs and the index are written.
    pub output_dir: PathBuf,
    /// Path prefix for rendered docs inside `output_dir`.
    pub namespace: String,
    /// Index document name, relative to `output_dir`.
    pub index_file: String,
    /// Section header the index update writes once.
    pub index_sentinel: String,
    /// URL template with `{file}`, `{start}` and `{end}`. Empty disables links.
    pub link_template: String,
    /// When a comment counts as attached to the declaration below it.
    pub adjacency: Adjacency,
    pub scan: ScanConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("docs"),
            namespace: "api".to_string(),
            index_file: "SUMMARY.md".to_string(),
            index_sentinel: "## API Reference".to_string(),
            link_template: String::new(),
            adjacency: Adjacency::Strict,
            scan: ScanConfig::default(),
        }
    }
}

pub fn load_config(repo_root: &Path) -> Config {
    let primary = repo_root.join(CONFIG_FILE);

    let text = std::fs::read_to_string(&primary);
    let Ok(text) = text else { return Config::default() };

    serde_json::from_str::<Config>(&text).unwrap_or_else(|_| Config::default())
}
