//! Sample sizing and per-category selection.

use std::path::Path;

use compact_str::CompactString;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use valsplit_core::{Category, Document, RankKey};

use crate::rank::RecencyRanker;

/// Categories with at least this many documents always contribute one.
pub const MIN_FLOOR_COUNT: usize = 5;

/// Number of documents to hold out from a category of `total` documents.
///
/// `round(total * proportion)` (half away from zero), raised to 1 when it
/// rounds to zero but `total >= 5`, and clamped to `[0, total]`.
///
/// Exact halves round up, not to even: 5 documents at 0.5 hold out 3, where
/// banker's rounding would hold out 2.
pub fn sample_count(total: usize, proportion: f64) -> usize {
    let rounded = (total as f64 * proportion).round();
    let mut count = if rounded.is_finite() && rounded > 0.0 {
        rounded as usize
    } else {
        0
    };
    if count == 0 && total >= MIN_FLOOR_COUNT {
        count = 1;
    }
    count.min(total)
}

/// A document chosen for the validation partition.
#[derive(Debug, Clone, Serialize)]
pub struct Selection {
    /// 1-based position within the category selection.
    pub position: usize,
    /// Recency key the document was selected by.
    pub key: RankKey,
    /// The selected document.
    pub document: Document,
}

impl Selection {
    /// Position recorded in the manifest: only set for identified documents.
    pub fn id_rank(&self) -> Option<usize> {
        self.key.has_id.then_some(self.position)
    }
}

/// Selection for one category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryPlan {
    /// Category name.
    pub name: CompactString,
    /// Eligible documents found.
    pub total: usize,
    /// Eligible documents carrying a leading identifier.
    pub with_id: usize,
    /// Documents to move, newest first.
    pub selected: Vec<Selection>,
}

impl CategoryPlan {
    /// Whether this category contributes nothing to the run.
    pub fn is_skipped(&self) -> bool {
        self.total == 0 || self.selected.is_empty()
    }

    /// Bytes that would be moved.
    pub fn selected_bytes(&self) -> u64 {
        self.selected.iter().map(|s| s.document.size).sum()
    }

    /// Destination directory of this category inside the validation partition.
    pub fn destination(&self, validation_root: &Path) -> std::path::PathBuf {
        validation_root.join(self.name.as_str())
    }
}

/// Ordered mapping from category name to its selection.
///
/// Ephemeral: only the manifest entries produced from it are persisted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PartitionPlan {
    categories: IndexMap<CompactString, CategoryPlan>,
}

impl PartitionPlan {
    /// Iterate categories in scan order.
    pub fn iter(&self) -> impl Iterator<Item = (&CompactString, &CategoryPlan)> {
        self.categories.iter()
    }

    /// Look up a category plan by name.
    pub fn get(&self, name: &str) -> Option<&CategoryPlan> {
        self.categories.get(name)
    }

    /// Total documents selected across all categories.
    pub fn total_selected(&self) -> usize {
        self.categories.values().map(|c| c.selected.len()).sum()
    }

    /// Total bytes selected across all categories.
    pub fn total_bytes(&self) -> u64 {
        self.categories.values().map(CategoryPlan::selected_bytes).sum()
    }
}

impl FromIterator<CategoryPlan> for PartitionPlan {
    fn from_iter<I: IntoIterator<Item = CategoryPlan>>(iter: I) -> Self {
        Self {
            categories: iter.into_iter().map(|c| (c.name.clone(), c)).collect(),
        }
    }
}

/// Chooses the newest documents of each category.
#[derive(Debug, Clone)]
pub struct SamplePlanner {
    proportion: f64,
    ranker: RecencyRanker,
}

impl SamplePlanner {
    /// Create a planner that holds out `proportion` of each category.
    pub fn new(proportion: f64) -> Self {
        Self {
            proportion,
            ranker: RecencyRanker::new(),
        }
    }

    /// Rank one category and keep its first `sample_count` documents.
    pub fn plan_category(&self, category: Category) -> CategoryPlan {
        let total = category.documents.len();
        let count = sample_count(total, self.proportion);
        let ranked = self.ranker.rank(category.documents);
        let with_id = ranked.iter().filter(|r| r.key.has_id).count();

        let selected: Vec<Selection> = ranked
            .into_iter()
            .take(count)
            .enumerate()
            .map(|(i, r)| Selection {
                position: i + 1,
                key: r.key,
                document: r.document,
            })
            .collect();

        debug!(
            category = %category.name,
            total,
            with_id,
            selected = selected.len(),
            "Planned category"
        );

        CategoryPlan {
            name: category.name,
            total,
            with_id,
            selected,
        }
    }

    /// Plan every category. Categories are independent, so ranking runs in
    /// parallel; the result keeps the input order.
    pub fn plan(&self, categories: Vec<Category>) -> PartitionPlan {
        categories
            .into_par_iter()
            .map(|c| self.plan_category(c))
            .collect::<Vec<_>>()
            .into_iter()
            .collect()
    }
}
