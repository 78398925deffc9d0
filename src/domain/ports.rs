use crate::domain::model::SubjectMatch;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    /// Lists regular files under `dir`, as paths relative to `dir`.
    fn list_files(
        &self,
        dir: &str,
        recursive: bool,
    ) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn copy_file(&self, from: &str, to: &str)
        -> impl std::future::Future<Output = Result<()>> + Send;
    fn move_file(&self, from: &str, to: &str)
        -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Maps a filename to a subject. Implementations never fail: anything they
/// cannot decide resolves to [`SubjectMatch::fallback`].
#[async_trait]
pub trait Sorter: Send + Sync {
    async fn sort_file(&self, file_name: &str) -> SubjectMatch;
}
