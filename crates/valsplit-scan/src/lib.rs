//! Category and document discovery for valsplit.
//!
//! A corpus root holds one directory per category. [`CategoryScanner`]
//! lists those directories (skipping the validation partition) and walks
//! each one with jwalk, collecting every file whose extension is accepted.
//!
//! # Example
//!
//! ```rust,no_run
//! use valsplit_scan::{CategoryScanner, SplitConfig};
//!
//! let config = SplitConfig::new("/path/to/corpus");
//! let scanner = CategoryScanner::new(&config).unwrap();
//!
//! for category in scanner.scan().unwrap() {
//!     println!("{}: {} documents", category.name, category.len());
//! }
//! ```

mod scanner;

pub use scanner::CategoryScanner;

// Re-export core types for convenience
pub use valsplit_core::{Category, Document, SplitConfig, SplitError};
