//! Fixture file loading.

use std::fs;
use std::path::Path;

use crate::core::fixture::Fixture;
use crate::error::SelfTestFailure;

/// Load a plugin's fixtures. An empty list is an error: it proves nothing.
pub fn load_fixtures(path: &Path) -> Result<Vec<Fixture>, SelfTestFailure> {
    if !path.is_file() {
        return Err(SelfTestFailure::Missing {
            path: path.to_path_buf(),
        });
    }
    let contents = fs::read_to_string(path).map_err(|source| SelfTestFailure::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let fixtures: Vec<Fixture> =
        serde_json::from_str(&contents).map_err(|source| SelfTestFailure::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    if fixtures.is_empty() {
        return Err(SelfTestFailure::NoFixtures {
            path: path.to_path_buf(),
        });
    }
    Ok(fixtures)
}
