//! Typed access to slot documents.
//!
//! Every mutation is a read-modify-write of the whole slot, committed with a
//! compare-and-swap on the slot version and retried when another writer got
//! there first.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use sqlx::SqlitePool;

use super::{MemorySlotStore, Slot, SlotStore, SqliteSlotStore};
use crate::errors::AppError;

/// Attempts per read-modify-write before a conflict is surfaced.
pub const MAX_WRITE_ATTEMPTS: u32 = 3;

/// A decoded slot document with the version it was read at.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    /// `None` when the slot is absent or its document does not decode
    pub value: Option<T>,
    pub version: i64,
}

/// Result of a mutation closure passed to [`Store::modify`].
pub enum Step<R> {
    /// Persist the modified document and return `R`
    Commit(R),
    /// Leave the slot untouched and return `R`
    Skip(R),
}

/// Whether a tolerant operation changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied,
    NoOp,
}

/// Typed slot store shared by all services.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn SlotStore>,
}

impl Store {
    pub fn new(backend: Arc<dyn SlotStore>) -> Self {
        Self { backend }
    }

    /// Store backed by a SQLite pool.
    pub fn sqlite(pool: SqlitePool) -> Self {
        Self::new(Arc::new(SqliteSlotStore::new(pool)))
    }

    /// Store living only in this process.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySlotStore::new()))
    }

    /// Read and decode a slot. Undecodable documents count as absent.
    pub async fn load<T: DeserializeOwned>(&self, slot: Slot) -> Result<Versioned<T>, AppError> {
        let Some((raw, version)) = self.backend.read(slot).await? else {
            return Ok(Versioned {
                value: None,
                version: 0,
            });
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Versioned {
                value: Some(value),
                version,
            }),
            Err(err) => {
                tracing::warn!(slot = %slot, version, "Discarding undecodable slot: {}", err);
                Ok(Versioned {
                    value: None,
                    version,
                })
            }
        }
    }

    /// Read a slot's value only.
    pub async fn get<T: DeserializeOwned>(&self, slot: Slot) -> Result<Option<T>, AppError> {
        Ok(self.load(slot).await?.value)
    }

    /// Encode and write a document against `expected_version`.
    pub async fn save<T: Serialize>(
        &self,
        slot: Slot,
        value: &T,
        expected_version: i64,
    ) -> Result<i64, AppError> {
        let raw = serde_json::to_string(value)?;
        self.backend.write(slot, &raw, expected_version).await
    }

    /// Write `value` only when the slot is absent or undecodable.
    ///
    /// Returns `true` if this call seeded the slot. Losing the race to another
    /// initializer is not an error.
    pub async fn seed_if_absent<T, F>(&self, slot: Slot, value: F) -> Result<bool, AppError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        let current = self.load::<T>(slot).await?;
        if current.value.is_some() {
            return Ok(false);
        }

        match self.save(slot, &value(), current.version).await {
            Ok(_) => {
                tracing::info!(slot = %slot, "Seeded slot with defaults");
                Ok(true)
            }
            Err(AppError::Conflict { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Overwrite a slot regardless of its current contents.
    pub async fn replace<T: Serialize>(&self, slot: Slot, value: &T) -> Result<(), AppError> {
        let raw = serde_json::to_string(value)?;
        let mut attempt = 0;
        loop {
            attempt += 1;
            let version = self
                .backend
                .read(slot)
                .await?
                .map(|(_, version)| version)
                .unwrap_or(0);
            match self.backend.write(slot, &raw, version).await {
                Ok(_) => return Ok(()),
                Err(AppError::Conflict { .. }) if attempt < MAX_WRITE_ATTEMPTS => {
                    tracing::warn!(slot = %slot, attempt, "Retrying overwrite after conflict");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Drop a slot.
    pub async fn remove(&self, slot: Slot) -> Result<(), AppError> {
        self.backend.remove(slot).await
    }

    /// Read-modify-write a slot.
    ///
    /// `default` supplies the document when the slot is absent. `apply` may run
    /// more than once if a concurrent writer bumps the version in between.
    pub async fn modify<T, R, D, F>(&self, slot: Slot, default: D, mut apply: F) -> Result<R, AppError>
    where
        T: Serialize + DeserializeOwned,
        D: Fn() -> T,
        F: FnMut(&mut T) -> Result<Step<R>, AppError>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let current = self.load::<T>(slot).await?;
            let mut value = current.value.unwrap_or_else(&default);

            let out = match apply(&mut value)? {
                Step::Skip(out) => return Ok(out),
                Step::Commit(out) => out,
            };

            match self.save(slot, &value, current.version).await {
                Ok(_) => return Ok(out),
                Err(AppError::Conflict { .. }) if attempt < MAX_WRITE_ATTEMPTS => {
                    tracing::warn!(slot = %slot, attempt, "Retrying write after conflict");
                }
                Err(e) => return Err(e),
            }
        }
    }
}
