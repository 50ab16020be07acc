//! Raw slot backends.
//!
//! A backend stores one JSON document per [`Slot`] together with a version.
//! Version `0` means the slot is absent. Writes are compare-and-swap: they only
//! succeed when the caller saw the current version.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;

/// Named storage slots, one per collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Orders,
    Session,
    AvailableItems,
    Locations,
    Alerts,
}

impl Slot {
    pub const ALL: [Slot; 5] = [
        Slot::Orders,
        Slot::Session,
        Slot::AvailableItems,
        Slot::Locations,
        Slot::Alerts,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Slot::Orders => "orders",
            Slot::Session => "session",
            Slot::AvailableItems => "available_items",
            Slot::Locations => "locations",
            Slot::Alerts => "alerts",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Storage backend for slot documents.
#[async_trait]
pub trait SlotStore: Send + Sync {
    /// Read the raw document and its version, `None` when absent.
    async fn read(&self, slot: Slot) -> Result<Option<(String, i64)>, AppError>;

    /// Write `value` if the stored version still equals `expected_version`.
    /// Returns the new version.
    async fn write(&self, slot: Slot, value: &str, expected_version: i64)
        -> Result<i64, AppError>;

    /// Drop the slot unconditionally.
    async fn remove(&self, slot: Slot) -> Result<(), AppError>;
}

fn conflict(slot: Slot, expected_version: i64, current_version: i64) -> AppError {
    AppError::Conflict {
        message: format!(
            "Slot {} changed concurrently: expected version {}, current {}",
            slot, expected_version, current_version
        ),
        current_version,
    }
}

/// SQLite-backed slots.
#[derive(Clone)]
pub struct SqliteSlotStore {
    pool: SqlitePool,
}

impl SqliteSlotStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn current_version(&self, slot: Slot) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT version FROM slots WHERE key = ?")
            .bind(slot.key())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| row.get("version")).unwrap_or(0))
    }
}

#[async_trait]
impl SlotStore for SqliteSlotStore {
    async fn read(&self, slot: Slot) -> Result<Option<(String, i64)>, AppError> {
        let row = sqlx::query("SELECT value, version FROM slots WHERE key = ?")
            .bind(slot.key())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| (row.get("value"), row.get("version"))))
    }

    async fn write(
        &self,
        slot: Slot,
        value: &str,
        expected_version: i64,
    ) -> Result<i64, AppError> {
        let now = Utc::now().to_rfc3339();
        let new_version = expected_version + 1;

        let result = if expected_version == 0 {
            sqlx::query(
                "INSERT INTO slots (key, value, version, updated_at) VALUES (?, ?, 1, ?) ON CONFLICT(key) DO NOTHING",
            )
            .bind(slot.key())
            .bind(value)
            .bind(&now)
            .execute(&self.pool)
            .await?
        } else {
            // Conditional UPDATE so a concurrent writer cannot be overwritten blindly
            sqlx::query(
                "UPDATE slots SET value = ?, version = ?, updated_at = ? WHERE key = ? AND version = ?",
            )
            .bind(value)
            .bind(new_version)
            .bind(&now)
            .bind(slot.key())
            .bind(expected_version)
            .execute(&self.pool)
            .await?
        };

        if result.rows_affected() == 0 {
            let current = self.current_version(slot).await?;
            return Err(conflict(slot, expected_version, current));
        }

        Ok(new_version)
    }

    async fn remove(&self, slot: Slot) -> Result<(), AppError> {
        sqlx::query("DELETE FROM slots WHERE key = ?")
            .bind(slot.key())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// In-process slots, lost when dropped.
#[derive(Default)]
pub struct MemorySlotStore {
    slots: Mutex<HashMap<Slot, (String, i64)>>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Slot, (String, i64)>>, AppError> {
        self.slots
            .lock()
            .map_err(|_| AppError::Internal("Slot store lock poisoned".to_string()))
    }
}

#[async_trait]
impl SlotStore for MemorySlotStore {
    async fn read(&self, slot: Slot) -> Result<Option<(String, i64)>, AppError> {
        Ok(self.lock()?.get(&slot).cloned())
    }

    async fn write(
        &self,
        slot: Slot,
        value: &str,
        expected_version: i64,
    ) -> Result<i64, AppError> {
        let mut slots = self.lock()?;
        let current = slots.get(&slot).map(|(_, version)| *version).unwrap_or(0);
        if current != expected_version {
            return Err(conflict(slot, expected_version, current));
        }
        let new_version = expected_version + 1;
        slots.insert(slot, (value.to_string(), new_version));
        Ok(new_version)
    }

    async fn remove(&self, slot: Slot) -> Result<(), AppError> {
        self.lock()?.remove(&slot);
        Ok(())
    }
}
