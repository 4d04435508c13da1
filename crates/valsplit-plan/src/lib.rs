//! Recency ranking and sample planning for valsplit.
//!
//! Planning happens in two steps per category:
//!
//! 1. [`RecencyRanker`] gives every document a [`RankKey`]: files whose name
//!    starts with a number rank by that number, the rest by modification time,
//!    and numbered files always come first.
//! 2. [`SamplePlanner`] computes how many documents to hold out with
//!    [`sample_count`] and takes that many from the front of the ranking.
//!
//! ```rust,ignore
//! use valsplit_plan::SamplePlanner;
//! use valsplit_scan::{CategoryScanner, SplitConfig};
//!
//! let config = SplitConfig::new("/path/to/corpus");
//! let categories = CategoryScanner::new(&config)?.scan()?;
//!
//! let plan = SamplePlanner::new(config.proportion).plan(categories);
//! for (name, category) in plan.iter() {
//!     println!("{name}: moving {} of {}", category.selected.len(), category.total);
//! }
//! ```

pub mod rank;
mod sample;

pub use rank::{RankedDocument, RecencyRanker, leading_id};
pub use sample::{
    CategoryPlan, MIN_FLOOR_COUNT, PartitionPlan, SamplePlanner, Selection, sample_count,
};

// Re-export core types
pub use valsplit_core::{Category, Document, RankKey};
