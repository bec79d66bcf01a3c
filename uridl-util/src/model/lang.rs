use std::fmt;

use serde::{Deserialize, Serialize};

/// Extension used for languages missing from the table.
pub const DEFAULT_EXTENSION: &str = "txt";

static EXTENSIONS: &[(&str, &str)] = &[
    ("c++17", "cpp"),
    ("c++", "cpp"),
    ("c99", "c"),
    ("c", "c"),
    ("python2", "py"),
    ("python3", "py"),
    ("go", "go"),
    ("postgresql", "sql"),
    ("c#", "cs"),
    ("haskell", "hs"),
    ("java", "java"),
    ("javascript", "js"),
    ("kotlin", "kt"),
    ("lua", "lua"),
    ("ocaml", "ml"),
    ("pascal", "pas"),
    ("ruby", "rb"),
    ("scala", "scala"),
];

/// Language label as rendered in the runs table, e.g. `C++17` or `Python 3`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct LangName(String);

impl LangName {
    /// Normalizes a label scraped from the site: spaces removed, lowercased.
    pub fn normalize(label: &str) -> Self {
        Self(label.trim().replace(' ', "").to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns file extension for the language, falling back to `txt`.
    ///
    /// Lookup ignores case so both lowercase and mixed-case labels match.
    pub fn file_extension(&self) -> &'static str {
        EXTENSIONS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&self.0))
            .map(|(_, ext)| *ext)
            .unwrap_or(DEFAULT_EXTENSION)
    }
}

impl<T: Into<String>> From<T> for LangName {
    fn from(name: T) -> Self {
        Self(name.into())
    }
}

impl fmt::Display for LangName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}
