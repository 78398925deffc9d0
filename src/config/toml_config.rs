use crate::core::syllabus::{SyllabusOptions, DEFAULT_PROGRAM_YEAR};
use crate::domain::model::{ReportFormat, SortLayout, SortMode, TiePolicy};
use crate::utils::error::{Result, SorterError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_SYLLABUS_PATH: &str = "syllabus_structure_new.json";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SorterConfig {
    #[serde(default)]
    pub syllabus: SyllabusConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub sort: SortConfig,
    pub remote: Option<RemoteConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyllabusConfig {
    pub path: String,
    pub program_years: Option<Vec<String>>,
    pub semesters: Option<Vec<String>>,
}

impl Default for SyllabusConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_SYLLABUS_PATH.to_string(),
            program_years: None,
            semesters: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub tie_policy: TiePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortConfig {
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default)]
    pub mode: SortMode,
    #[serde(default)]
    pub layout: SortLayout,
    pub report_formats: Option<Vec<String>>,
    pub recursive: Option<bool>,
}

fn default_output_path() -> String {
    "./sorted".to_string()
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            mode: SortMode::default(),
            layout: SortLayout::default(),
            report_formats: None,
            recursive: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<String>,
}

impl SorterConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SorterError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SorterError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SYLLABUS_PATH})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SorterError::ProcessingError {
            message: format!("Invalid env var pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn syllabus_options(&self) -> SyllabusOptions {
        SyllabusOptions {
            program_years: self
                .syllabus
                .program_years
                .clone()
                .unwrap_or_else(|| vec![DEFAULT_PROGRAM_YEAR.to_string()]),
            semesters: self.syllabus.semesters.clone(),
        }
    }

    pub fn report_formats(&self) -> Vec<ReportFormat> {
        match &self.sort.report_formats {
            Some(formats) => formats.iter().filter_map(|f| ReportFormat::parse(f)).collect(),
            None => vec![ReportFormat::Json],
        }
    }

    pub fn recursive(&self) -> bool {
        self.sort.recursive.unwrap_or(false)
    }

    pub fn remote_timeout(&self) -> Duration {
        let seconds = self
            .remote
            .as_ref()
            .and_then(|r| r.timeout_seconds)
            .unwrap_or(10);
        Duration::from_secs(seconds)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.format.as_deref())
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }
}

impl Validate for SorterConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("syllabus.path", &self.syllabus.path)?;
        validation::validate_path("sort.output_path", &self.sort.output_path)?;

        if let Some(years) = &self.syllabus.program_years {
            validation::validate_non_empty_list("syllabus.program_years", years)?;
        }

        if let Some(formats) = &self.sort.report_formats {
            validation::validate_non_empty_list("sort.report_formats", formats)?;
            let lowered: Vec<String> = formats.iter().map(|f| f.to_ascii_lowercase()).collect();
            validation::validate_allowed_values("sort.report_formats", &lowered, &ReportFormat::ALL)?;
        }

        if let Some(remote) = &self.remote {
            validation::validate_url("remote.endpoint", &remote.endpoint)?;
            if let Some(timeout) = remote.timeout_seconds {
                validation::validate_positive_number("remote.timeout_seconds", timeout, 1)?;
            }
        }

        if let Some(level) = self.log_level() {
            validation::validate_allowed_values(
                "logging.level",
                &[level.to_ascii_lowercase()],
                &LOG_LEVELS,
            )?;
        }

        if let Some(format) = self.logging.as_ref().and_then(|l| l.format.as_deref()) {
            validation::validate_allowed_values(
                "logging.format",
                &[format.to_ascii_lowercase()],
                &["compact", "json"],
            )?;
        }

        Ok(())
    }
}
