use crate::core::report;
use crate::domain::model::{ReportFormat, SortEntry, SortLayout, SortMode, SortReport, SubjectMatch};
use crate::domain::ports::{Sorter, Storage};
use crate::utils::error::{Result, SorterError};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SortOptions {
    pub input_dir: String,
    pub output_path: String,
    pub mode: SortMode,
    pub layout: SortLayout,
    pub report_formats: Vec<ReportFormat>,
    pub recursive: bool,
}

#[derive(Debug, Clone)]
pub struct SortOutcome {
    pub report: SortReport,
    /// Path of the first report written.
    pub report_path: String,
}

/// Files every document of a directory under its guessed subject.
pub struct SortEngine<S: Storage> {
    storage: S,
    sorter: Arc<dyn Sorter>,
    options: SortOptions,
}

fn join(base: &str, rest: &str) -> String {
    Path::new(base).join(rest).to_string_lossy().replace('\\', "/")
}

/// Drops `.` and folds `..` without touching the file system.
fn lexical(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Location of `output` inside `input`, relative to `input`.
fn nested_in(input: &str, output: &str) -> Option<PathBuf> {
    let (mut input, mut output) = (PathBuf::from(input), PathBuf::from(output));
    if input.is_absolute() != output.is_absolute() {
        input = std::path::absolute(&input).ok()?;
        output = std::path::absolute(&output).ok()?;
    }
    let output = lexical(&output);
    let nested = output.strip_prefix(lexical(&input)).ok()?;
    Some(nested.to_path_buf())
}

impl<S: Storage> SortEngine<S> {
    pub fn new(storage: S, sorter: Arc<dyn Sorter>, options: SortOptions) -> Self {
        Self {
            storage,
            sorter,
            options,
        }
    }

    pub async fn run(&self) -> Result<SortOutcome> {
        if self.options.report_formats.is_empty() {
            return Err(SorterError::MissingConfigError {
                field: "sort.report_formats".to_string(),
            });
        }

        let nested = nested_in(&self.options.input_dir, &self.options.output_path);
        if nested.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
            return Err(SorterError::ConfigValidationError {
                field: "sort.output_path".to_string(),
                message: "output directory must differ from the input directory".to_string(),
            });
        }

        tracing::info!("Scanning {}", self.options.input_dir);
        let files = self.extract(nested.as_deref()).await?;
        tracing::info!("Found {} files", files.len());

        let entries = self.classify(files).await;
        let outcome = self.load(entries).await?;

        tracing::info!(
            "Sorted {} files into {} subjects ({} unsorted)",
            outcome.report.total_files,
            outcome.report.subject_counts.len(),
            outcome.report.unsorted_count()
        );
        Ok(outcome)
    }

    /// Lists the input files, skipping anything under `exclude` (the output
    /// directory when it lives inside the input directory).
    async fn extract(&self, exclude: Option<&Path>) -> Result<Vec<String>> {
        let mut files = self
            .storage
            .list_files(&self.options.input_dir, self.options.recursive)
            .await?;

        if let Some(exclude) = exclude {
            let before = files.len();
            files.retain(|file| !Path::new(file).starts_with(exclude));
            if files.len() < before {
                tracing::debug!(
                    "Skipped {} files under output directory {}",
                    before - files.len(),
                    exclude.display()
                );
            }
        }
        Ok(files)
    }

    async fn classify(&self, files: Vec<String>) -> Vec<SortEntry> {
        let mut entries = Vec::with_capacity(files.len());

        for file in files {
            let subject = self.sorter.sort_file(&file).await;
            tracing::debug!("{} -> {}", file, subject);
            entries.push(SortEntry {
                file,
                subject_code: subject.code().to_string(),
                subject_name: subject.name().to_string(),
                destination: None,
            });
        }

        entries
    }

    async fn load(&self, mut entries: Vec<SortEntry>) -> Result<SortOutcome> {
        for entry in &mut entries {
            let source = join(&self.options.input_dir, &entry.file);
            let subject = SubjectMatch::new(entry.subject_code.as_str(), entry.subject_name.as_str());
            let relative = self.options.layout.destination(&entry.file, &subject);
            let target = join(&self.options.output_path, &relative);

            match self.options.mode {
                SortMode::Report => continue,
                SortMode::Copy => self.storage.copy_file(&source, &target).await?,
                SortMode::Move => self.storage.move_file(&source, &target).await?,
            }
            entry.destination = Some(relative);
        }

        let report = SortReport::new(self.options.mode, entries);

        let mut report_path = None;
        for format in &self.options.report_formats {
            let path = join(&self.options.output_path, &report::report_filename(*format));
            let data = report::render(&report, *format)?;
            self.storage.write_file(&path, &data).await?;
            tracing::debug!("Wrote {:?} report to {}", format, path);
            report_path.get_or_insert(path);
        }

        let report_path = report_path.ok_or_else(|| SorterError::MissingConfigError {
            field: "sort.report_formats".to_string(),
        })?;

        Ok(SortOutcome {
            report,
            report_path,
        })
    }
}
