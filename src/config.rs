// Library install roots needed by the library-backed benchmarks.
// Resolved once at startup (environment, optionally overridden by a JSON file)
// and handed to the benchmarks explicitly.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A named install root, looked up through an environment variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LibraryRoot {
    Cosma,
    CosmaScalapack,
    Legate,
    LegateNumpy,
    OpenblasLib,
    Ctf,
}

impl LibraryRoot {
    pub const ALL: [LibraryRoot; 6] = [
        LibraryRoot::Cosma,
        LibraryRoot::CosmaScalapack,
        LibraryRoot::Legate,
        LibraryRoot::LegateNumpy,
        LibraryRoot::OpenblasLib,
        LibraryRoot::Ctf,
    ];

    pub fn var(&self) -> &'static str {
        match self {
            LibraryRoot::Cosma => "COSMA_DIR",
            LibraryRoot::CosmaScalapack => "COSMA_SCALAPACK_DIR",
            LibraryRoot::Legate => "LEGATE_DIR",
            LibraryRoot::LegateNumpy => "LEGATE_NUMPY_DIR",
            LibraryRoot::OpenblasLib => "OPENBLAS_LIB_DIR",
            LibraryRoot::Ctf => "CTF_DIR",
        }
    }
}

const LD_LIBRARY_PATH: &str = "LD_LIBRARY_PATH";

/// Every root a benchmark might ask for, plus the inherited loader path.
///
/// The JSON form uses the environment variable names as keys:
///
/// ```json
/// { "COSMA_DIR": "/usr/workspace/cosma", "CTF_DIR": "/opt/ctf" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LibraryRoots {
    #[serde(rename = "COSMA_DIR", default, skip_serializing_if = "Option::is_none")]
    pub cosma_dir: Option<PathBuf>,
    #[serde(rename = "COSMA_SCALAPACK_DIR", default, skip_serializing_if = "Option::is_none")]
    pub cosma_scalapack_dir: Option<PathBuf>,
    #[serde(rename = "LEGATE_DIR", default, skip_serializing_if = "Option::is_none")]
    pub legate_dir: Option<PathBuf>,
    #[serde(rename = "LEGATE_NUMPY_DIR", default, skip_serializing_if = "Option::is_none")]
    pub legate_numpy_dir: Option<PathBuf>,
    #[serde(rename = "OPENBLAS_LIB_DIR", default, skip_serializing_if = "Option::is_none")]
    pub openblas_lib_dir: Option<PathBuf>,
    #[serde(rename = "CTF_DIR", default, skip_serializing_if = "Option::is_none")]
    pub ctf_dir: Option<PathBuf>,
    #[serde(rename = "LD_LIBRARY_PATH", default, skip_serializing_if = "Option::is_none")]
    pub ld_library_path: Option<String>,
}

impl LibraryRoots {
    /// Resolve every root through `lookup`, typically `std::env::var_os`.
    /// Empty values count as unset.
    pub fn from_lookup<F>(mut lookup: F) -> Self
    where
        F: FnMut(&str) -> Option<OsString>,
    {
        let mut roots = LibraryRoots::default();
        for root in LibraryRoot::ALL {
            if let Some(value) = lookup(root.var()).filter(|v| !v.is_empty()) {
                *roots.slot_mut(root) = Some(PathBuf::from(value));
            }
        }
        roots.ld_library_path = lookup(LD_LIBRARY_PATH)
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string_lossy().into_owned());
        roots
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::RootsFile {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::RootsParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Values set in `overrides` win over values in `self`.
    pub fn merge(mut self, overrides: LibraryRoots) -> Self {
        for root in LibraryRoot::ALL {
            if let Some(path) = overrides.get(root) {
                *self.slot_mut(root) = Some(path.to_path_buf());
            }
        }
        if overrides.ld_library_path.is_some() {
            self.ld_library_path = overrides.ld_library_path;
        }
        self
    }

    pub fn get(&self, root: LibraryRoot) -> Option<&Path> {
        match root {
            LibraryRoot::Cosma => self.cosma_dir.as_deref(),
            LibraryRoot::CosmaScalapack => self.cosma_scalapack_dir.as_deref(),
            LibraryRoot::Legate => self.legate_dir.as_deref(),
            LibraryRoot::LegateNumpy => self.legate_numpy_dir.as_deref(),
            LibraryRoot::OpenblasLib => self.openblas_lib_dir.as_deref(),
            LibraryRoot::Ctf => self.ctf_dir.as_deref(),
        }
    }

    fn slot_mut(&mut self, root: LibraryRoot) -> &mut Option<PathBuf> {
        match root {
            LibraryRoot::Cosma => &mut self.cosma_dir,
            LibraryRoot::CosmaScalapack => &mut self.cosma_scalapack_dir,
            LibraryRoot::Legate => &mut self.legate_dir,
            LibraryRoot::LegateNumpy => &mut self.legate_numpy_dir,
            LibraryRoot::OpenblasLib => &mut self.openblas_lib_dir,
            LibraryRoot::Ctf => &mut self.ctf_dir,
        }
    }
}
