// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded user preference database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `user_preferences`: wallet_address → serialized UserPreference
//! - `meta`: key → value (schema version)

use std::path::Path;

use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use crate::models::{Language, UserPreference, WalletAddress};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: wallet_address → serialized UserPreference (JSON bytes).
const USER_PREFERENCES: TableDefinition<&str, &[u8]> = TableDefinition::new("user_preferences");

/// Database metadata: key → value bytes.
const META: TableDefinition<&str, &[u8]> = TableDefinition::new("meta");

const SCHEMA_VERSION_KEY: &str = "schema_version";
const SCHEMA_VERSION: u32 = 1;

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PreferenceDbError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("unsupported schema version {found}, expected {expected}")]
    SchemaVersion { found: u32, expected: u32 },
}

pub type PreferenceDbResult<T> = Result<T, PreferenceDbError>;

// =============================================================================
// PreferenceDatabase
// =============================================================================

/// Persistent store of per-wallet language preferences.
pub struct PreferenceDatabase {
    db: Database,
}

impl PreferenceDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> PreferenceDbResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USER_PREFERENCES)?;
            let mut meta = write_txn.open_table(META)?;

            let found = meta
                .get(SCHEMA_VERSION_KEY)?
                .map(|v| decode_version(v.value()));
            match found {
                None => {
                    meta.insert(SCHEMA_VERSION_KEY, SCHEMA_VERSION.to_be_bytes().as_slice())?;
                }
                Some(version) if version == SCHEMA_VERSION => {}
                Some(version) => {
                    return Err(PreferenceDbError::SchemaVersion {
                        found: version,
                        expected: SCHEMA_VERSION,
                    })
                }
            }
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Insert or update the preference for a wallet.
    ///
    /// A new row gets `created_at == updated_at`; an existing row keeps its
    /// `created_at` and has `language` and `updated_at` replaced. Runs in a
    /// single write transaction.
    pub fn upsert(
        &self,
        wallet_address: &WalletAddress,
        language: Language,
    ) -> PreferenceDbResult<UserPreference> {
        let now = Utc::now();

        let write_txn = self.db.begin_write()?;
        let preference = {
            let mut table = write_txn.open_table(USER_PREFERENCES)?;

            let existing_bytes = table
                .get(wallet_address.as_str())?
                .map(|existing| existing.value().to_vec());

            let preference = match existing_bytes {
                Some(bytes) => {
                    let mut preference: UserPreference = serde_json::from_slice(&bytes)?;
                    preference.language = language;
                    preference.updated_at = now;
                    preference
                }
                None => UserPreference {
                    wallet_address: wallet_address.clone(),
                    language,
                    created_at: now,
                    updated_at: now,
                },
            };

            let json = serde_json::to_vec(&preference)?;
            table.insert(wallet_address.as_str(), json.as_slice())?;
            preference
        };
        write_txn.commit()?;

        Ok(preference)
    }

    /// Look up the preference for a wallet.
    pub fn get(&self, wallet_address: &WalletAddress) -> PreferenceDbResult<Option<UserPreference>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USER_PREFERENCES)?;
        match table.get(wallet_address.as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Number of stored preferences.
    pub fn count(&self) -> PreferenceDbResult<usize> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USER_PREFERENCES)?;
        let mut count = 0;
        for entry in table.iter()? {
            entry?;
            count += 1;
        }
        Ok(count)
    }
}

fn decode_version(bytes: &[u8]) -> u32 {
    bytes
        .get(..4)
        .and_then(|b| <[u8; 4]>::try_from(b).ok())
        .map(u32::from_be_bytes)
        .unwrap_or(0)
}
