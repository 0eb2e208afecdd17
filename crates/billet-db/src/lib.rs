pub mod error;
pub mod ids;
pub mod login;
pub mod models;
pub mod repo;
mod tables;

use std::path::Path;

use redb::{Database, ReadTransaction, WriteTransaction};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

pub use error::StoreError;
pub use login::LOGIN_TTL_SECS;
pub use models::{Login, Message, Response, User};

/// The keyed object store: four buckets inside one redb file.
///
/// All repository operations run through `read`/`write`, one transaction
/// per operation. redb serializes writers, so concurrent callers never
/// observe a torn intermediate state.
pub struct Store {
    db: Database,
}

impl Store {
    /// Open (or create) the store file and create the buckets idempotently.
    ///
    /// A failure here means the process must not run; the caller is
    /// expected to propagate it out of `main`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let db = Database::create(path)?;

        let txn = db.begin_write()?;
        {
            txn.open_table(tables::MESSAGES)?;
            txn.open_table(tables::USERS)?;
            txn.open_table(tables::LOGINS)?;
            txn.open_table(tables::RESPONSES)?;
        }
        txn.commit()?;

        info!("store opened at {}", path.display());
        Ok(Self { db })
    }

    /// Run `f` inside one read transaction.
    pub fn read<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&ReadTransaction) -> Result<T, StoreError>,
    {
        let txn = self.db.begin_read()?;
        f(&txn)
    }

    /// Run `f` inside one write transaction. Commits when `f` returns `Ok`,
    /// aborts otherwise: either every write in `f` becomes visible or none.
    pub fn write<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&WriteTransaction) -> Result<T, StoreError>,
    {
        let txn = self.db.begin_write()?;
        match f(&txn) {
            Ok(value) => {
                txn.commit()?;
                Ok(value)
            }
            Err(err) => {
                txn.abort()?;
                Err(err)
            }
        }
    }
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    Ok(serde_json::to_vec(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    Ok(serde_json::from_slice(bytes)?)
}
