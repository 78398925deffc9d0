use crate::domain::model::SubjectMatch;
use crate::domain::ports::Sorter;
use crate::utils::error::{Result, SorterError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

pub const DEFAULT_SORT_ENDPOINT: &str = "http://localhost:3001/api/files/sort";

/// Accepts both `["PH101", "Engineering Physics"]` and
/// `{"subjectCode": "PH101", "subjectName": "Engineering Physics"}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SortResponse {
    Pair(String, String),
    Object {
        #[serde(rename = "subjectCode")]
        subject_code: String,
        #[serde(rename = "subjectName")]
        subject_name: String,
    },
}

impl From<SortResponse> for SubjectMatch {
    fn from(response: SortResponse) -> Self {
        match response {
            SortResponse::Pair(code, name) => SubjectMatch::new(code, name),
            SortResponse::Object {
                subject_code,
                subject_name,
            } => SubjectMatch::new(subject_code, subject_name),
        }
    }
}

/// Asks a sorting service over HTTP instead of classifying locally.
pub struct RemoteSorter {
    endpoint: String,
    client: Client,
    cache: RwLock<HashMap<String, SubjectMatch>>,
}

impl RemoteSorter {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
            cache: RwLock::new(HashMap::new()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn cached_count(&self) -> usize {
        self.cache.read().await.len()
    }

    async fn request(&self, key: &str) -> Result<SubjectMatch> {
        tracing::debug!("POST {} fileName={}", self.endpoint, key);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "fileName": key }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SorterError::ProcessingError {
                message: format!("sort service returned {}", status),
            });
        }

        let body: SortResponse = response.json().await?;
        Ok(body.into())
    }
}

/// Cache key used by the upload front end: lower-cased basename, cut at the first dot.
pub fn remote_key(file_name: &str) -> Option<String> {
    let lowered = file_name.trim().to_lowercase();
    let base = lowered.rsplit(['/', '\\']).next().unwrap_or_default();
    let key = base.split('.').next().unwrap_or_default().trim();
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

#[async_trait]
impl Sorter for RemoteSorter {
    async fn sort_file(&self, file_name: &str) -> SubjectMatch {
        let Some(key) = remote_key(file_name) else {
            return SubjectMatch::fallback();
        };

        if let Some(hit) = self.cache.read().await.get(&key) {
            return hit.clone();
        }

        match self.request(&key).await {
            Ok(result) => {
                self.cache.write().await.insert(key, result.clone());
                result
            }
            Err(e) => {
                tracing::warn!("Remote sort failed for '{}': {}", file_name, e);
                SubjectMatch::fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_key() {
        assert_eq!(remote_key("Quantum_Notes.v2.pdf").as_deref(), Some("quantum_notes"));
        assert_eq!(remote_key("week2/Loops_Lab.c").as_deref(), Some("loops_lab"));
        assert_eq!(remote_key(r"C:\uploads\chem.v1.docx").as_deref(), Some("chem"));
        assert_eq!(remote_key("week2/"), None);
        assert_eq!(remote_key(".hidden"), None);
        assert_eq!(remote_key("  "), None);
    }

    #[test]
    fn test_response_shapes() {
        let pair: SortResponse = serde_json::from_str(r#"["PH101","Engineering Physics"]"#).unwrap();
        assert_eq!(SubjectMatch::from(pair), SubjectMatch::new("PH101", "Engineering Physics"));

        let obj: SortResponse =
            serde_json::from_str(r#"{"subjectCode":"CS101","subjectName":"Programming"}"#).unwrap();
        assert_eq!(SubjectMatch::from(obj).code(), "CS101");
    }
}
