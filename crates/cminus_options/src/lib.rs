//! cminus_options: analysis options.
//!
//! Parses the JSON options block that controls the semantic analysis:
//! error handling mode, storage layout and symbol listing output.

use serde::{Deserialize, Serialize};

pub const DEFAULT_WORD_SIZE: u32 = 4;
pub const DEFAULT_LOCAL_BASE: i32 = 0;

/// Semantic analysis options. Every field is optional; the accessors
/// supply the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOptions {
    // -- Error Handling --
    /// Stop each pass at its first error. Defaults to true.
    pub stop_on_first_error: Option<bool>,

    // -- Storage Layout --
    /// Bytes per storage slot.
    pub word_size: Option<u32>,
    /// Value of the local offset counter at each function entry.
    pub local_base: Option<i32>,

    // -- Output --
    /// Print the symbol listing after each pass.
    pub trace_analyze: Option<bool>,
}

impl AnalysisOptions {
    pub fn stop_on_first_error(&self) -> bool {
        self.stop_on_first_error.unwrap_or(true)
    }

    pub fn word_size(&self) -> u32 {
        self.word_size.unwrap_or(DEFAULT_WORD_SIZE)
    }

    pub fn local_base(&self) -> i32 {
        self.local_base.unwrap_or(DEFAULT_LOCAL_BASE)
    }

    pub fn trace_analyze(&self) -> bool {
        self.trace_analyze.unwrap_or(false)
    }

    /// Overlay `other` on top of `self`: fields set in `other` win.
    pub fn merge(&self, other: &AnalysisOptions) -> AnalysisOptions {
        AnalysisOptions {
            stop_on_first_error: other.stop_on_first_error.or(self.stop_on_first_error),
            word_size: other.word_size.or(self.word_size),
            local_base: other.local_base.or(self.local_base),
            trace_analyze: other.trace_analyze.or(self.trace_analyze),
        }
    }
}

/// Parse analysis options from a JSON string.
pub fn parse_options(content: &str) -> Result<AnalysisOptions, serde_json::Error> {
    serde_json::from_str(content)
}

/// Parse analysis options from a JSON file.
pub fn parse_options_file(path: &str) -> Result<AnalysisOptions, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let options = parse_options(&content)?;
    Ok(options)
}
