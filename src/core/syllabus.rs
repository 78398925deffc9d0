use crate::utils::error::{Result, SorterError};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

pub const DEFAULT_PROGRAM_YEAR: &str = "First Year Engineering";

/// Module-name words must be longer than this to become keywords.
const MODULE_WORD_MIN_EXCLUSIVE: usize = 2;

/// Roman-numeral part suffixes, e.g. "physics-i" also indexes "physics".
const PART_SUFFIXES: [&str; 2] = ["-ii", "-i"];

#[derive(Debug, Clone)]
pub struct SyllabusOptions {
    /// Top-level keys to read. At least one must be present.
    pub program_years: Vec<String>,
    /// Semesters to read under each year; `None` reads all of them in key order.
    pub semesters: Option<Vec<String>>,
}

impl Default for SyllabusOptions {
    fn default() -> Self {
        Self {
            program_years: vec![DEFAULT_PROGRAM_YEAR.to_string()],
            semesters: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct SubjectEntry {
    #[serde(rename = "Subject Code")]
    code: Option<String>,
    #[serde(rename = "Subject Name")]
    name: Option<String>,
    #[serde(rename = "Modules")]
    modules: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct ModuleEntry {
    #[serde(rename = "Module Name")]
    name: Option<String>,
}

/// One subject as read from the syllabus document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyllabusSubject {
    pub code: String,
    pub name: String,
    pub module_names: Vec<String>,
}

/// The parsed syllabus, subjects in document order.
#[derive(Debug, Clone, Default)]
pub struct Syllabus {
    subjects: Vec<SyllabusSubject>,
}

impl Syllabus {
    /// 從 JSON 檔案載入課綱
    pub fn from_file<P: AsRef<Path>>(path: P, options: &SyllabusOptions) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SorterError::config(format!(
                "Syllabus file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content, options)
    }

    pub fn from_json_str(content: &str, options: &SyllabusOptions) -> Result<Self> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| SorterError::config(format!("Invalid JSON in syllabus: {}", e)))?;
        Self::from_value(&value, options)
    }

    pub fn from_value(value: &Value, options: &SyllabusOptions) -> Result<Self> {
        let root = value.as_object().ok_or_else(|| {
            SorterError::config("Invalid syllabus structure: top level must be an object")
        })?;

        let mut subjects = Vec::new();
        let mut years_found = 0usize;

        for year in &options.program_years {
            let Some(year_value) = root.get(year) else {
                tracing::debug!("Program year '{}' not present in syllabus", year);
                continue;
            };
            let Some(semesters) = year_value.as_object() else {
                tracing::warn!("Skipping program year '{}': expected an object", year);
                continue;
            };
            years_found += 1;

            let semester_names: Vec<&String> = match &options.semesters {
                Some(wanted) => wanted.iter().filter(|s| semesters.contains_key(*s)).collect(),
                None => semesters.keys().collect(),
            };

            for semester in semester_names {
                let Some(entries) = semesters.get(semester).and_then(Value::as_array) else {
                    tracing::warn!("Skipping '{} / {}': expected a list of subjects", year, semester);
                    continue;
                };

                for entry in entries {
                    if let Some(subject) = parse_subject(year, semester, entry) {
                        subjects.push(subject);
                    }
                }
            }
        }

        if years_found == 0 {
            return Err(SorterError::config(format!(
                "Invalid syllabus structure: missing {} data",
                options.program_years.join(" / ")
            )));
        }

        Ok(Self { subjects })
    }

    pub fn subjects(&self) -> &[SyllabusSubject] {
        &self.subjects
    }
}

fn parse_subject(year: &str, semester: &str, entry: &Value) -> Option<SyllabusSubject> {
    let subject: SubjectEntry = match serde_json::from_value(entry.clone()) {
        Ok(subject) => subject,
        Err(e) => {
            tracing::warn!("Skipping malformed subject in '{} / {}': {}", year, semester, e);
            return None;
        }
    };

    let code = subject.code.map(|c| c.trim().to_string()).filter(|c| !c.is_empty())?;
    let name = subject.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())?;

    let module_names = match subject.modules {
        Some(Value::Array(modules)) => modules
            .into_iter()
            .filter_map(|m| serde_json::from_value::<ModuleEntry>(m).ok())
            .filter_map(|m| m.name)
            .collect(),
        _ => Vec::new(),
    };

    Some(SyllabusSubject {
        code,
        name,
        module_names,
    })
}

/// Lower-cased words split on whitespace and hyphens. Hyphenated words are
/// also kept whole so part suffixes ("physics-i") survive for the synonym pass.
pub fn extract_words(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut words = Vec::new();

    for chunk in lowered.split_whitespace() {
        let compound = chunk.trim_matches('-');
        if compound.contains('-') {
            words.push(compound.to_string());
        }
        words.extend(
            compound
                .split('-')
                .filter(|w| !w.is_empty())
                .map(str::to_string),
        );
    }

    words
}

pub fn subject_keywords(name: &str, module_names: &[String]) -> BTreeSet<String> {
    let mut keywords: BTreeSet<String> = extract_words(name).into_iter().collect();

    for module in module_names {
        keywords.extend(
            extract_words(module)
                .into_iter()
                .filter(|w| w.chars().count() > MODULE_WORD_MIN_EXCLUSIVE),
        );
    }

    add_part_synonyms(&mut keywords);
    keywords
}

fn add_part_synonyms(keywords: &mut BTreeSet<String>) {
    let snapshot: Vec<String> = keywords.iter().cloned().collect();
    for keyword in snapshot {
        let stripped = PART_SUFFIXES
            .iter()
            .find_map(|suffix| keyword.strip_suffix(suffix))
            .filter(|base| !base.is_empty());
        if let Some(base) = stripped {
            keywords.insert(base.to_string());
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndexedSubject {
    pub code: String,
    pub name: String,
    pub keywords: BTreeSet<String>,
}

/// Subject code to keyword set, built once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct SyllabusIndex {
    subjects: Vec<IndexedSubject>,
    by_code: HashMap<String, usize>,
}

impl SyllabusIndex {
    pub fn build(syllabus: &Syllabus) -> Self {
        let mut index = Self::default();

        for subject in syllabus.subjects() {
            let keywords = subject_keywords(&subject.name, &subject.module_names);

            match index.by_code.get(&subject.code) {
                Some(&pos) => {
                    // Same code listed twice: merge vocabularies, first name wins.
                    tracing::debug!("Merging duplicate subject code {}", subject.code);
                    index.subjects[pos].keywords.extend(keywords);
                }
                None => {
                    index.by_code.insert(subject.code.clone(), index.subjects.len());
                    index.subjects.push(IndexedSubject {
                        code: subject.code.clone(),
                        name: subject.name.clone(),
                        keywords,
                    });
                }
            }
        }

        index
    }

    pub fn subjects(&self) -> &[IndexedSubject] {
        &self.subjects
    }

    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn keywords(&self, code: &str) -> Option<&BTreeSet<String>> {
        self.by_code.get(code).map(|&pos| &self.subjects[pos].keywords)
    }

    pub fn subject_name(&self, code: &str) -> Option<&str> {
        self.by_code.get(code).map(|&pos| self.subjects[pos].name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "First Year Engineering": {
                "Semester I": [
                    {
                        "Subject Code": "FEC101",
                        "Subject Name": "Engineering Mathematics-I",
                        "Modules": [
                            {"Module Name": "Complex Numbers"},
                            {"Module Name": "Hyperbolic functions and Logarithm of Complex Numbers"}
                        ]
                    },
                    {
                        "Subject Code": "FEC102",
                        "Subject Name": "Engineering Physics-I",
                        "Modules": [{"Module Name": "Quantum Physics"}]
                    }
                ],
                "Semester II": [
                    {
                        "Subject Code": "FEC201",
                        "Subject Name": "Engineering Mathematics-II",
                        "Modules": [{"Module Name": "Differential Equations of First Order"}]
                    },
                    {"Subject Name": "No code here"},
                    "not a subject"
                ]
            }
        })
    }

    #[test]
    fn test_extract_words_keeps_hyphenated_compounds() {
        let words = extract_words("Engineering  Physics-I");
        assert_eq!(words, vec!["engineering", "physics-i", "physics", "i"]);
    }

    #[test]
    fn test_module_words_need_three_chars() {
        let keywords = subject_keywords("Applied Chemistry", &["Water of Crystallization".to_string()]);
        assert!(keywords.contains("water"));
        assert!(keywords.contains("crystallization"));
        assert!(!keywords.contains("of"));
        assert!(keywords.contains("applied"));
    }

    #[test]
    fn test_part_suffix_synonyms() {
        let keywords = subject_keywords("Engineering Mathematics-II", &[]);
        assert!(keywords.contains("mathematics-ii"));
        assert!(keywords.contains("mathematics"));

        let keywords = subject_keywords("Physics-I", &[]);
        assert!(keywords.contains("physics-i"));
        assert!(keywords.contains("physics"));
    }

    #[test]
    fn test_part_suffix_stripped_from_hyphenated_compound() {
        // Only the suffix pass can produce "semi-conductor"; splitting yields "semi" and "conductor".
        let keywords = subject_keywords("Semi-Conductor-I", &[]);
        assert!(keywords.contains("semi-conductor-i"));
        assert!(keywords.contains("semi-conductor"));

        let keywords = subject_keywords("Electronic Semi-Conductor-II", &["Power Semi-Conductor-II Devices".to_string()]);
        assert!(keywords.contains("semi-conductor"));
        assert!(!keywords.contains("semi-conductor-"));
        assert!(keywords.iter().all(|k| !k.ends_with('-')));
    }

    #[test]
    fn test_build_index_skips_incomplete_subjects() {
        let syllabus = Syllabus::from_value(&sample(), &SyllabusOptions::default()).unwrap();
        assert_eq!(syllabus.subjects().len(), 3);

        let index = SyllabusIndex::build(&syllabus);
        assert_eq!(index.subject_count(), 3);
        assert_eq!(index.subject_name("FEC102"), Some("Engineering Physics-I"));
        assert!(index.keywords("FEC102").unwrap().contains("quantum"));
        assert!(index.keywords("FEC101").unwrap().contains("hyperbolic"));
        assert!(index.keywords("GEN").is_none());
    }

    #[test]
    fn test_semester_filter() {
        let options = SyllabusOptions {
            semesters: Some(vec!["Semester II".to_string(), "Semester III".to_string()]),
            ..SyllabusOptions::default()
        };
        let syllabus = Syllabus::from_value(&sample(), &options).unwrap();
        let codes: Vec<&str> = syllabus.subjects().iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["FEC201"]);
    }

    #[test]
    fn test_duplicate_codes_merge_keywords() {
        let value = json!({
            "First Year Engineering": {
                "Semester I": [
                    {"Subject Code": "X1", "Subject Name": "Graphics", "Modules": []}
                ],
                "Semester II": [
                    {"Subject Code": "X1", "Subject Name": "Drawing", "Modules": [{"Module Name": "Isometric Views"}]}
                ]
            }
        });
        let index = SyllabusIndex::build(&Syllabus::from_value(&value, &SyllabusOptions::default()).unwrap());

        assert_eq!(index.subject_count(), 1);
        assert_eq!(index.subject_name("X1"), Some("Graphics"));
        let keywords = index.keywords("X1").unwrap();
        assert!(keywords.contains("graphics"));
        assert!(keywords.contains("isometric"));
    }

    #[test]
    fn test_missing_program_year_is_config_error() {
        let value = json!({"Second Year": {"Semester III": []}});
        let err = Syllabus::from_value(&value, &SyllabusOptions::default()).unwrap_err();
        assert!(matches!(err, SorterError::ConfigError { .. }));
        assert!(err.to_string().contains("First Year Engineering"));
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = Syllabus::from_json_str("{ not json", &SyllabusOptions::default()).unwrap_err();
        assert!(matches!(err, SorterError::ConfigError { .. }));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Syllabus::from_file("/definitely/not/here.json", &SyllabusOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("Syllabus file not found"));
    }
}
