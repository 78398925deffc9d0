use crate::utils::error::{Result, SorterError};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(SorterError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(SorterError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(SorterError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(SorterError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(SorterError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(SorterError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_list(field_name: &str, values: &[String]) -> Result<()> {
    if values.iter().all(|v| v.trim().is_empty()) {
        return Err(SorterError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    Ok(())
}

pub fn validate_allowed_values(field_name: &str, values: &[String], allowed: &[&str]) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed.iter().copied().collect();

    for value in values {
        if !allowed_set.contains(value.as_str()) {
            return Err(SorterError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: value.clone(),
                reason: format!("Unsupported value. Allowed values: {}", allowed.join(", ")),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("remote.endpoint", "https://example.com/api/files/sort").is_ok());
        assert!(validate_url("remote.endpoint", "http://localhost:3001").is_ok());
        assert!(validate_url("remote.endpoint", "").is_err());
        assert!(validate_url("remote.endpoint", "invalid-url").is_err());
        assert!(validate_url("remote.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("remote.timeout_seconds", 5, 1).is_ok());
        assert!(validate_positive_number("remote.timeout_seconds", 0, 1).is_err());
    }

    #[test]
    fn test_validate_non_empty_list() {
        let years = vec!["First Year Engineering".to_string()];
        assert!(validate_non_empty_list("syllabus.program_years", &years).is_ok());

        let blank = vec!["  ".to_string()];
        assert!(matches!(
            validate_non_empty_list("syllabus.program_years", &blank),
            Err(SorterError::MissingConfigError { .. })
        ));
        assert!(validate_non_empty_list("syllabus.program_years", &[]).is_err());
    }

    #[test]
    fn test_validate_allowed_values() {
        let formats = vec!["json".to_string(), "csv".to_string()];
        assert!(validate_allowed_values("sort.report_formats", &formats, &["json", "csv", "tsv"]).is_ok());

        let invalid = vec!["xml".to_string()];
        assert!(validate_allowed_values("sort.report_formats", &invalid, &["json", "csv", "tsv"]).is_err());
    }
}
