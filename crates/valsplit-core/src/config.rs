//! Split configuration types.

use std::path::{Component, Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Name of the validation partition directory under the corpus root.
pub const DEFAULT_VALIDATION_DIR: &str = "Validacion";

/// Share of each category moved into the validation partition.
pub const DEFAULT_PROPORTION: f64 = 0.20;

/// Accepted document extensions (hypertext documents).
pub const DEFAULT_EXTENSIONS: [&str; 2] = [".html", ".htm"];

/// Manifest filename, resolved against the corpus root.
pub const DEFAULT_MANIFEST_NAME: &str = "manifest_validacion.csv";

/// Configuration for a partitioning run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct SplitConfig {
    /// Corpus root containing one directory per category.
    pub root: PathBuf,

    /// Name of the validation partition directory under the root.
    #[builder(default = "DEFAULT_VALIDATION_DIR.to_string()")]
    #[serde(default = "default_validation_dir")]
    pub validation_dir: String,

    /// Proportion of each category to move (0.0 ..= 1.0).
    #[builder(default = "DEFAULT_PROPORTION")]
    #[serde(default = "default_proportion")]
    pub proportion: f64,

    /// Accepted file extensions, with or without the leading dot.
    #[builder(default = "default_extensions()")]
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Print the plan without touching the filesystem.
    #[builder(default = "false")]
    #[serde(default)]
    pub dry_run: bool,

    /// Manifest location. Relative paths resolve against `root`.
    #[builder(default = "PathBuf::from(DEFAULT_MANIFEST_NAME)")]
    #[serde(default = "default_manifest_path")]
    pub manifest_path: PathBuf,
}

fn default_validation_dir() -> String {
    DEFAULT_VALIDATION_DIR.to_string()
}

fn default_proportion() -> f64 {
    DEFAULT_PROPORTION
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from(DEFAULT_MANIFEST_NAME)
}

impl SplitConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.root {
            Some(ref root) if root.as_os_str().is_empty() => {
                return Err("Root path cannot be empty".to_string());
            }
            None => return Err("Root path is required".to_string()),
            Some(_) => {}
        }

        if let Some(p) = self.proportion {
            if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                return Err(format!("Proportion must be within [0, 1], got {p}"));
            }
        }

        if let Some(ref name) = self.validation_dir {
            let mut components = Path::new(name).components();
            let single = matches!(
                (components.next(), components.next()),
                (Some(Component::Normal(_)), None)
            );
            if !single {
                return Err(format!(
                    "Validation folder must be a single directory name, got '{name}'"
                ));
            }
        }

        Ok(())
    }
}

impl SplitConfig {
    /// Create a new split config builder.
    pub fn builder() -> SplitConfigBuilder {
        SplitConfigBuilder::default()
    }

    /// Create a config with defaults for everything but the root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            validation_dir: default_validation_dir(),
            proportion: DEFAULT_PROPORTION,
            extensions: default_extensions(),
            dry_run: false,
            manifest_path: default_manifest_path(),
        }
    }

    /// Absolute location of the validation partition.
    pub fn validation_root(&self) -> PathBuf {
        self.root.join(&self.validation_dir)
    }

    /// Manifest location with relative paths resolved against the root.
    pub fn manifest_file(&self) -> PathBuf {
        self.root.join(&self.manifest_path)
    }

    /// Extensions in canonical form: lower-case with a leading dot, sorted.
    pub fn normalized_extensions(&self) -> Vec<String> {
        let mut exts: Vec<String> = self
            .extensions
            .iter()
            .map(|e| normalize_extension(e))
            .filter(|e| e.len() > 1)
            .collect();
        exts.sort();
        exts.dedup();
        exts
    }
}

/// Lower-case an extension and ensure it starts with a dot.
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}
