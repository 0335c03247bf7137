use serde::{Deserialize, Serialize};

use super::defaults;
use crate::errors::ConfigError;

/// Ascending sequence of target embedding dimensions, shared by the
/// generator, cache, search, and index layers.
///
/// Invariant: non-empty, every entry > 0, strictly ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct DimensionLadder(Vec<usize>);

impl DimensionLadder {
    /// Validate and build a ladder.
    pub fn new(dims: Vec<usize>) -> Result<Self, ConfigError> {
        if dims.is_empty() {
            return Err(ConfigError::EmptyLadder);
        }
        if dims.contains(&0) {
            return Err(ConfigError::ZeroDimension);
        }
        for pair in dims.windows(2) {
            if pair[1] <= pair[0] {
                return Err(ConfigError::NonAscendingLadder {
                    previous: pair[0],
                    next: pair[1],
                });
            }
        }
        Ok(Self(dims))
    }

    /// Dimensions in ascending order.
    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Highest precision on the ladder.
    pub fn max(&self) -> usize {
        // Non-empty by construction.
        self.0[self.0.len() - 1]
    }

    /// Lowest precision on the ladder.
    pub fn min(&self) -> usize {
        self.0[0]
    }

    pub fn contains(&self, dim: usize) -> bool {
        self.0.binary_search(&dim).is_ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for DimensionLadder {
    fn default() -> Self {
        Self(defaults::DEFAULT_DIMENSION_LADDER.to_vec())
    }
}

impl TryFrom<Vec<usize>> for DimensionLadder {
    type Error = ConfigError;

    fn try_from(dims: Vec<usize>) -> Result<Self, Self::Error> {
        Self::new(dims)
    }
}

impl From<DimensionLadder> for Vec<usize> {
    fn from(ladder: DimensionLadder) -> Self {
        ladder.0
    }
}
