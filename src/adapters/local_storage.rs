use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

/// Local file system storage. Relative paths resolve against `base_path`,
/// absolute paths are used as they are.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        Path::new(&self.base_path).join(path)
    }

    async fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

impl Storage for LocalStorage {
    async fn list_files(&self, dir: &str, recursive: bool) -> Result<Vec<String>> {
        let root = self.resolve(dir);
        let mut pending = vec![root.clone()];
        let mut files = Vec::new();

        while let Some(current) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&current).await?;
            while let Some(entry) = entries.next_entry().await? {
                let file_type = entry.file_type().await?;
                let path = entry.path();

                if file_type.is_dir() {
                    if recursive {
                        pending.push(path);
                    }
                } else if file_type.is_file() {
                    if let Ok(relative) = path.strip_prefix(&root) {
                        files.push(relative.to_string_lossy().replace('\\', "/"));
                    }
                }
            }
        }

        files.sort();
        Ok(files)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);
        Self::ensure_parent(&full_path).await?;
        tokio::fs::write(full_path, data).await?;
        Ok(())
    }

    async fn copy_file(&self, from: &str, to: &str) -> Result<()> {
        let target = self.resolve(to);
        Self::ensure_parent(&target).await?;
        tokio::fs::copy(self.resolve(from), target).await?;
        Ok(())
    }

    async fn move_file(&self, from: &str, to: &str) -> Result<()> {
        let source = self.resolve(from);
        let target = self.resolve(to);
        Self::ensure_parent(&target).await?;

        // rename fails across devices; fall back to copy + remove.
        if tokio::fs::rename(&source, &target).await.is_err() {
            tokio::fs::copy(&source, &target).await?;
            tokio::fs::remove_file(&source).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_list_files_recursive_and_flat() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().to_str().unwrap().to_string();
        let storage = LocalStorage::new(base);

        storage.write_file("in/a.pdf", b"a").await.unwrap();
        storage.write_file("in/nested/b.pdf", b"b").await.unwrap();

        let flat = storage.list_files("in", false).await.unwrap();
        assert_eq!(flat, vec!["a.pdf".to_string()]);

        let all = storage.list_files("in", true).await.unwrap();
        assert_eq!(all, vec!["a.pdf".to_string(), "nested/b.pdf".to_string()]);
    }

    #[tokio::test]
    async fn test_copy_and_move() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        storage.write_file("src.txt", b"hello").await.unwrap();
        storage.copy_file("src.txt", "out/X/copy.txt").await.unwrap();
        let base = temp_dir.path();
        assert_eq!(tokio::fs::read(base.join("out/X/copy.txt")).await.unwrap(), b"hello");

        storage.move_file("src.txt", "out/Y/moved.txt").await.unwrap();
        assert!(!base.join("src.txt").exists());
        assert_eq!(tokio::fs::read(base.join("out/Y/moved.txt")).await.unwrap(), b"hello");
    }
}
