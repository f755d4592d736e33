//! Dataset catalog backed by a directory tree.
//!
//! A dataset `A.B.C` lives at `<base>/A/B/C`. A regular file is a sequential
//! dataset; a directory is a partitioned dataset whose members are the files
//! inside it. Datasets may also be defined explicitly to give them attributes
//! other than the `RECFM=FB,LRECL=80` default, or to place them on a volume.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::NameError;
use crate::names::{DatasetName, MemberName};
use crate::types::{DatasetAttributes, RecordFormat};

/// Explicit dataset definition, as found in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetDefinition {
    /// Dataset name.
    pub name: String,
    /// Record format.
    #[serde(default)]
    pub recfm: RecordFormat,
    /// Logical record length.
    #[serde(default = "default_lrecl")]
    pub lrecl: usize,
    /// Volume serial the dataset resides on.
    #[serde(default)]
    pub volume: Option<String>,
    /// Whether the dataset is partitioned.
    #[serde(default)]
    pub partitioned: bool,
}

fn default_lrecl() -> usize {
    80
}

/// A resolved catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Dataset name.
    pub name: DatasetName,
    /// Backing file or directory.
    pub path: PathBuf,
    /// Record attributes.
    pub attributes: DatasetAttributes,
    /// Volume serial, if known.
    pub volume: Option<String>,
    /// Whether members are addressed under `path`.
    pub partitioned: bool,
}

impl CatalogEntry {
    /// Backing file for the dataset or one of its members.
    pub fn member_path(&self, member: Option<&MemberName>) -> PathBuf {
        match member {
            Some(m) => self.path.join(m.as_str()),
            None => self.path.clone(),
        }
    }
}

/// The dataset catalog.
#[derive(Debug)]
pub struct Catalog {
    base_dir: PathBuf,
    defined: HashMap<DatasetName, CatalogEntry>,
    available: AtomicBool,
}

impl Catalog {
    /// An empty catalog rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            defined: HashMap::new(),
            available: AtomicBool::new(true),
        }
    }

    /// A catalog rooted at `base_dir` with the given explicit definitions.
    pub fn with_definitions(
        base_dir: impl Into<PathBuf>,
        definitions: &[DatasetDefinition],
    ) -> Result<Self, NameError> {
        let mut catalog = Self::new(base_dir);
        for def in definitions {
            catalog.define(def)?;
        }
        Ok(catalog)
    }

    /// Add or replace an explicit definition.
    pub fn define(&mut self, def: &DatasetDefinition) -> Result<(), NameError> {
        let name = DatasetName::new(&def.name)?;
        let entry = CatalogEntry {
            path: self.path_for(&name),
            name: name.clone(),
            attributes: DatasetAttributes {
                recfm: def.recfm,
                lrecl: def.lrecl,
            },
            volume: def.volume.as_ref().map(|v| v.to_ascii_uppercase()),
            partitioned: def.partitioned,
        };
        self.defined.insert(name, entry);
        Ok(())
    }

    /// Root directory of the catalog.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Mark the catalog reachable or unreachable.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Whether catalog lookups can be served.
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Resolve a dataset name. Explicit definitions win over discovery.
    pub fn locate(&self, name: &DatasetName) -> Option<CatalogEntry> {
        if let Some(entry) = self.defined.get(name) {
            return Some(entry.clone());
        }
        let path = self.path_for(name);
        let meta = std::fs::metadata(&path).ok()?;
        Some(CatalogEntry {
            name: name.clone(),
            path,
            attributes: DatasetAttributes::default(),
            volume: None,
            partitioned: meta.is_dir(),
        })
    }

    fn path_for(&self, name: &DatasetName) -> PathBuf {
        name.as_str()
            .split('.')
            .fold(self.base_dir.clone(), |path, qualifier| path.join(qualifier))
    }
}
