//! Explicit outcome of a point lookup.

use crate::error::{StoreError, WardenError, WardenResult};

/// Outcome of a lookup that keeps "absent" and "infrastructure failure" on
/// separate channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Unavailable(StoreError),
}

impl<T> Lookup<T> {
    /// Keep a found value only if `predicate` holds, otherwise report it as
    /// not found.
    pub fn filter(self, predicate: impl FnOnce(&T) -> bool) -> Self {
        match self {
            Self::Found(value) if predicate(&value) => Self::Found(value),
            Self::Found(_) => Self::NotFound,
            other => other,
        }
    }

    pub fn into_result(self) -> WardenResult<T> {
        match self {
            Self::Found(value) => Ok(value),
            Self::NotFound => Err(WardenError::NotFound),
            Self::Unavailable(err) => Err(WardenError::StoreUnavailable(err)),
        }
    }
}

impl<T> From<Result<Option<T>, StoreError>> for Lookup<T> {
    fn from(result: Result<Option<T>, StoreError>) -> Self {
        match result {
            Ok(Some(value)) => Self::Found(value),
            Ok(None) => Self::NotFound,
            Err(err) => Self::Unavailable(err),
        }
    }
}
