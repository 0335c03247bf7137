//! Test fixture loader and shared test doubles for the sillage workspace.
//!
//! Golden JSON tables live under `golden/`; [`mocks`] holds scripted
//! providers, stores and publishers used by integration tests across crates.

pub mod mocks;

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::de::DeserializeOwned;

/// Directory holding `golden/`; fixed at compile time so every dependent
/// crate resolves the same tables.
fn fixtures_root() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
}

/// Absolute path of a fixture below the fixtures root.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// Deserialize the JSON fixture at `relative_path`.
///
/// # Panics
/// On a missing file or a schema mismatch; both are test bugs.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixture_path(relative_path);
    let raw = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    serde_json::from_str(&raw).unwrap_or_else(|e| panic!("cannot parse {}: {e}", path.display()))
}

/// Sorted `*.json` files directly under `subdir`.
pub fn list_fixtures(subdir: &str) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(fixture_path(subdir)) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

/// `sin(i / 100)` for `i` in `0..dims`, the canonical provider output in tests.
pub fn sin_embedding(dims: usize) -> Vec<f32> {
    (0..dims).map(|i| (i as f32 / 100.0).sin()).collect()
}

/// Deterministic pseudo-random unit vector for document `seed`.
pub fn document_embedding(seed: u64, dims: usize) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut v: Vec<f32> = (0..dims).map(|_| rng.gen_range(-0.5f32..0.5)).collect();
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        v.iter_mut().for_each(|x| *x /= norm);
    }
    v
}
