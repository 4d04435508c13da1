//! Recency ranking of documents.
//!
//! "Newer" is decided by the leading number in a file name when there is one
//! (crawled pages are named like `826016-title.html`, with ids growing over
//! time), and by modification time otherwise.

use serde::Serialize;

use valsplit_core::{Document, RankKey};

/// A document paired with its recency key.
#[derive(Debug, Clone, Serialize)]
pub struct RankedDocument {
    /// Recency key.
    pub key: RankKey,
    /// The ranked document.
    pub document: Document,
}

/// Assigns rank keys and orders documents newest first.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecencyRanker;

impl RecencyRanker {
    /// Create a new ranker.
    pub fn new() -> Self {
        Self
    }

    /// Compute the rank key of a document. Total: never fails.
    pub fn key(&self, document: &Document) -> RankKey {
        match leading_id(&document.stem) {
            Some(id) => RankKey::identified(id, document.name.clone()),
            None => RankKey::unidentified(document.modified, document.name.clone()),
        }
    }

    /// Rank documents, newest first.
    pub fn rank(&self, documents: Vec<Document>) -> Vec<RankedDocument> {
        let mut ranked: Vec<RankedDocument> = documents
            .into_iter()
            .map(|document| RankedDocument {
                key: self.key(&document),
                document,
            })
            .collect();
        ranked.sort_by(|a, b| a.key.cmp(&b.key));
        ranked
    }
}

/// Parse the run of ASCII digits at the start of a file stem.
///
/// Leading zeros are ignored (`000123` is 123, `000` is 0). Runs too long
/// for a `u128` saturate.
pub fn leading_id(stem: &str) -> Option<u128> {
    let end = stem
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(stem.len());
    if end == 0 {
        return None;
    }

    let digits = stem[..end].trim_start_matches('0');
    if digits.is_empty() {
        return Some(0);
    }
    Some(digits.parse().unwrap_or(u128::MAX))
}
