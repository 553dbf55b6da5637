//! Collision-free output file names
use std::collections::HashSet;
use std::path::PathBuf;

use log::debug;

use crate::geometry::SurfaceRecord;

/// Used when a name sanitizes down to nothing
pub const FALLBACK_NAME: &str = "surface";

pub const OBJ_EXTENSION: &str = "obj";

/// Reduce a surface name to a portable file-name stem.
///
/// Every run of characters other than alphanumerics, `_`, `.` and `-`
/// collapses into a single `_`.
pub fn sanitize_name(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    let mut in_run = false;

    for c in name.trim().chars() {
        if c.is_alphanumeric() || matches!(c, '_' | '.' | '-') {
            sanitized.push(c);
            in_run = false;
        } else if !in_run {
            sanitized.push('_');
            in_run = true;
        }
    }

    if sanitized.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        sanitized
    }
}

/// Unsanitized base name for the record at 1-based `position`
pub fn base_name(record: &SurfaceRecord, position: usize) -> String {
    match record.display_name() {
        Some(name) => name.to_string(),
        None => format!("surface_{:03}", position),
    }
}

/// Hands out file names that are unique within a run and absent on disk
#[derive(Debug)]
pub struct NameRegistry {
    dir: PathBuf,
    used: HashSet<String>,
}

impl NameRegistry {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            used: HashSet::new(),
        }
    }

    /// Reserve a file name for `base`, appending `_01`, `_02`, ... on collision.
    pub fn reserve(&mut self, base: &str) -> String {
        let stem = sanitize_name(base);
        let mut candidate = format!("{}.{}", stem, OBJ_EXTENSION);
        let mut suffix = 1;

        while self.is_taken(&candidate) {
            candidate = format!("{}_{:02}.{}", stem, suffix, OBJ_EXTENSION);
            suffix += 1;
        }

        if suffix > 1 {
            debug!("{:?} collided, using {}", stem, candidate);
        }
        self.used.insert(candidate.clone());
        candidate
    }

    /// Like [`reserve`](Self::reserve) but returns the full path
    pub fn reserve_path(&mut self, base: &str) -> PathBuf {
        let file_name = self.reserve(base);
        self.dir.join(file_name)
    }

    fn is_taken(&self, file_name: &str) -> bool {
        self.used.contains(file_name) || self.dir.join(file_name).exists()
    }
}
