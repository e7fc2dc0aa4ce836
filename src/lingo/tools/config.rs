use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::lingo::tools::error::Result;

/// How the XML to spreadsheet path treats an entry that cannot be decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowPolicy {
    /// Skip the entry, log a warning and count it as skipped.
    #[default]
    Lenient,
    /// Abort the whole conversion with a parse error.
    Strict,
}

/// Background colours (0xRRGGBB) applied to reconciled rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub modified: u32,
    pub added: u32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            modified: 0xFFFF00,
            added: 0x92D050,
        }
    }
}

/// Options shared by all operations. Every operation receives its own copy;
/// nothing is stored globally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub row_policy: RowPolicy,
    /// Also collect entries nested under `entry/Children` when parsing.
    pub include_nested: bool,
    /// Worksheet to read. `None` selects the first sheet.
    pub sheet: Option<String>,
    pub palette: Palette,
}

impl Settings {
    /// Loads settings from a JSON file. Absent fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}
