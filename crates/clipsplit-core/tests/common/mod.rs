//! Shared helpers for scheduler integration tests.

pub mod fake_engine;

use std::fs;
use std::path::Path;

/// Create empty descriptor files (and their directories) under `root`.
pub fn catalog(root: &Path, files: &[&str]) {
    for f in files {
        let p = root.join(f);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, "").unwrap();
    }
}
