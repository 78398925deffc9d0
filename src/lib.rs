pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{local_storage::LocalStorage, remote::RemoteSorter};
pub use config::SorterConfig;
pub use core::{
    classifier::{ClassifierStats, KeywordSubjectClassifier},
    sort_engine::{SortEngine, SortOptions, SortOutcome},
    syllabus::{Syllabus, SyllabusIndex, SyllabusOptions},
};
pub use domain::model::{ReportFormat, SortLayout, SortMode, SubjectMatch, TiePolicy};
pub use domain::ports::Sorter;
pub use utils::error::{Result, SorterError};
