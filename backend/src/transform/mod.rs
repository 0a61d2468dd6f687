//! Gradebook transformation.
//!
//! - Classifier: decides what each input column is
//! - Prioritizer: moves name columns to the front
//! - Grouper: groups graded columns by category and averages them
//! - Assembler: builds the output table and display hints
//! - Pipeline: parse → transform → export, with progress logs

pub mod assembler;
pub mod classifier;
pub mod gradebook;
pub mod grouper;
pub mod pipeline;
pub mod prioritizer;

pub use assembler::{assemble, average_column_name, GradebookOutput};
pub use classifier::ColumnClassifier;
pub use gradebook::{plan_columns, transform_gradebook, ColumnPlan};
pub use grouper::{category_averages, group_by_category, mean_skip_missing, CategoryGroup};
pub use pipeline::*;
pub use prioritizer::{prioritize_name_columns, PrioritizedColumns};
