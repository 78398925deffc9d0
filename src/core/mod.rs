pub mod classifier;
pub mod report;
pub mod sort_engine;
pub mod syllabus;

pub use crate::domain::model::{SortEntry, SortReport, SubjectMatch, TiePolicy};
pub use crate::domain::ports::{Sorter, Storage};
pub use crate::utils::error::Result;
