use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const FALLBACK_CODE: &str = "GEN";
pub const FALLBACK_NAME: &str = "General";

/// A `(subject code, subject name)` pair. Serializes as a two-element array,
/// the shape the upload front end expects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectMatch(pub String, pub String);

impl SubjectMatch {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self(code.into(), name.into())
    }

    pub fn fallback() -> Self {
        Self::new(FALLBACK_CODE, FALLBACK_NAME)
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    pub fn name(&self) -> &str {
        &self.1
    }

    pub fn is_fallback(&self) -> bool {
        self.0 == FALLBACK_CODE
    }
}

impl fmt::Display for SubjectMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.0, self.1)
    }
}

/// What to do when several subjects share the top score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiePolicy {
    /// Ambiguous filenames are filed under the fallback subject.
    #[default]
    Fallback,
    /// The first subject in syllabus order that reached the top score wins.
    FirstSeen,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Report,
    Copy,
    Move,
}

/// How copied or moved files are laid out under the output directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortLayout {
    /// `<CODE>/<relative path>`, keeps the input tree below each subject.
    #[default]
    SubjectCode,
    /// `<snake_case subject name>/<file name>`, flattened.
    SubjectName,
}

impl SortLayout {
    /// Destination of `file` relative to the output directory.
    pub fn destination(&self, file: &str, subject: &SubjectMatch) -> String {
        match self {
            SortLayout::SubjectCode => format!("{}/{}", subject.code(), file),
            SortLayout::SubjectName => {
                let base = file.rsplit(['/', '\\']).next().unwrap_or(file);
                format!("{}/{}", subject_folder(subject.name()), base)
            }
        }
    }
}

/// "Engineering Physics-I" -> "engineering_physics-i"
pub fn subject_folder(name: &str) -> String {
    name.to_lowercase().split_whitespace().collect::<Vec<_>>().join("_")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    Json,
    Csv,
    Tsv,
}

impl ReportFormat {
    pub const ALL: [&'static str; 3] = ["json", "csv", "tsv"];

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            "tsv" => Some(ReportFormat::Tsv),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
            ReportFormat::Tsv => "tsv",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortEntry {
    pub file: String,
    pub subject_code: String,
    pub subject_name: String,
    /// Where the file ended up, when it was copied or moved.
    pub destination: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortReport {
    pub generated_at: DateTime<Utc>,
    pub mode: SortMode,
    pub total_files: usize,
    pub subject_counts: BTreeMap<String, usize>,
    pub entries: Vec<SortEntry>,
}

impl SortReport {
    pub fn new(mode: SortMode, entries: Vec<SortEntry>) -> Self {
        let mut subject_counts = BTreeMap::new();
        for entry in &entries {
            *subject_counts.entry(entry.subject_code.clone()).or_insert(0) += 1;
        }

        Self {
            generated_at: Utc::now(),
            mode,
            total_files: entries.len(),
            subject_counts,
            entries,
        }
    }

    pub fn unsorted_count(&self) -> usize {
        self.subject_counts.get(FALLBACK_CODE).copied().unwrap_or(0)
    }
}
