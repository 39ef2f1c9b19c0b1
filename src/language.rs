use serde::{Deserialize, Serialize};
use std::path::Path;

/// Source dialects the extraction engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageId {
    CSharp,
    Dart,
    Go,
    JavaScript,
    Php,
    Ruby,
    Rust,
    TypeScript,
    /// TypeScript with JSX; shares every rule with [`LanguageId::TypeScript`]
    /// except the grammar used to parse it.
    Tsx,
}

impl LanguageId {
    pub const ALL: [LanguageId; 9] = [
        LanguageId::CSharp,
        LanguageId::Dart,
        LanguageId::Go,
        LanguageId::JavaScript,
        LanguageId::Php,
        LanguageId::Ruby,
        LanguageId::Rust,
        LanguageId::TypeScript,
        LanguageId::Tsx,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::CSharp => "csharp",
            Self::Dart => "dart",
            Self::Go => "go",
            Self::JavaScript => "javascript",
            Self::Php => "php",
            Self::Ruby => "ruby",
            Self::Rust => "rust",
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
        }
    }

    /// Primary file extensions (lowercase, without dot).
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::CSharp => &["cs"],
            Self::Dart => &["dart"],
            Self::Go => &["go"],
            Self::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Self::Php => &["php"],
            Self::Ruby => &["rb"],
            Self::Rust => &["rs"],
            Self::TypeScript => &["ts", "mts", "cts"],
            Self::Tsx => &["tsx"],
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.extensions().contains(&ext.as_str()))
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Accepts either a [`LanguageId::name`] or a file extension.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.name() == lower)
            .or_else(|| Self::from_extension(&lower))
    }
}

impl std::fmt::Display for LanguageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
