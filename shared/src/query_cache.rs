//! Keyed query cache with generation-based invalidation.
//!
//! Entries are only written by fetch resolutions. Invalidation bumps the
//! entry generation, which orphans any fetch still in flight: its response
//! resolves as [`Resolution::Superseded`] and is dropped.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::ApiError;
use crate::model::UserId;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum QueryResource {
    Profile,
}

impl QueryResource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Profile => "profile",
        }
    }
}

/// `(users, user id, resource)`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub user_id: UserId,
    pub resource: QueryResource,
}

impl QueryKey {
    #[must_use]
    pub fn profile(user_id: UserId) -> Self {
        Self {
            user_id,
            resource: QueryResource::Profile,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "users/{}/{}", self.user_id, self.resource.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FetchState {
    #[default]
    Idle,
    Fetching {
        generation: u64,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct CacheEntry<T> {
    data: Option<T>,
    generation: u64,
    state: FetchState,
    last_error: Option<ApiError>,
}

impl<T> Default for CacheEntry<T> {
    fn default() -> Self {
        Self {
            data: None,
            generation: 0,
            state: FetchState::Idle,
            last_error: None,
        }
    }
}

impl<T> CacheEntry<T> {
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn last_error(&self) -> Option<&ApiError> {
        self.last_error.as_ref()
    }

    /// True only when the in-flight fetch belongs to the current generation.
    pub fn is_fetching(&self) -> bool {
        matches!(self.state, FetchState::Fetching { generation } if generation == self.generation)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Stored,
    Failed,
    Superseded { current: u64 },
    Evicted,
}

#[derive(Debug)]
pub struct QueryCache<T> {
    entries: HashMap<QueryKey, CacheEntry<T>>,
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> QueryCache<T> {
    pub fn entry(&self, key: &QueryKey) -> Option<&CacheEntry<T>> {
        self.entries.get(key)
    }

    pub fn data(&self, key: &QueryKey) -> Option<&T> {
        self.entries.get(key).and_then(CacheEntry::data)
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.entries.get(key).is_some_and(CacheEntry::is_fetching)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the generation to tag the request with, or `None` when a
    /// fetch for the current generation is already in flight.
    pub fn begin_fetch(&mut self, key: &QueryKey) -> Option<u64> {
        let entry = self.entries.entry(key.clone()).or_default();
        if entry.is_fetching() {
            return None;
        }
        entry.state = FetchState::Fetching {
            generation: entry.generation,
        };
        Some(entry.generation)
    }

    pub fn resolve(
        &mut self,
        key: &QueryKey,
        generation: u64,
        outcome: Result<T, ApiError>,
    ) -> Resolution {
        let Some(entry) = self.entries.get_mut(key) else {
            return Resolution::Evicted;
        };

        if generation != entry.generation {
            return Resolution::Superseded {
                current: entry.generation,
            };
        }

        entry.state = FetchState::Idle;
        match outcome {
            Ok(data) => {
                entry.data = Some(data);
                entry.last_error = None;
                Resolution::Stored
            }
            Err(error) => {
                entry.last_error = Some(error);
                Resolution::Failed
            }
        }
    }

    /// Orphans any in-flight fetch by bumping the generation. Data is kept
    /// until the refetch lands.
    pub fn invalidate(&mut self, key: &QueryKey) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.generation += 1;
                entry.state = FetchState::Idle;
                true
            }
            None => false,
        }
    }

    /// Drops every entry that does not belong to `user_id`.
    pub fn retain_user(&mut self, user_id: &UserId) {
        self.entries.retain(|key, _| &key.user_id == user_id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
