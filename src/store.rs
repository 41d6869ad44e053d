//! Persistence gateway for parcel records.
//!
//! Every operation reads and writes through to the shared connection. Guarded
//! mutations check the persisted status and apply the change inside one
//! `IMMEDIATE` transaction, so the status a guard sees is the status the
//! statement acts on.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use tracing::{debug, warn};

use crate::error::{Result, TrackerError};
use crate::parcel::{encode_timestamp, parse_timestamp, ClientId, Parcel, ParcelNumber, ParcelStatus};

/// Connection handle shared between every user of the database.
pub type SharedConnection = Arc<Mutex<Connection>>;

const SELECT_COLUMNS: &str = "SELECT number, client, status, address, created_at FROM parcel";

/// Stateless façade over the `parcel` table.
///
/// Cloning is cheap; clones share the same connection.
#[derive(Clone)]
pub struct ParcelStore {
    conn: SharedConnection,
}

impl ParcelStore {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Wrap a connection the store will share with its clones only.
    pub fn from_connection(conn: Connection) -> Self {
        Self::new(Arc::new(Mutex::new(conn)))
    }

    /// The underlying shared handle.
    pub fn connection(&self) -> &SharedConnection {
        &self.conn
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| TrackerError::ConnectionPoisoned)
    }

    /// Insert `parcel` and return its freshly assigned number.
    ///
    /// `parcel.number` is ignored.
    #[tracing::instrument(skip(self, parcel), fields(client = parcel.client, status = %parcel.status))]
    pub fn add(&self, parcel: &Parcel) -> Result<ParcelNumber> {
        let created_at = encode_timestamp(&parcel.created_at)?;
        let conn = self.lock()?;
        let number: ParcelNumber = conn.query_row(
            "INSERT INTO parcel (client, status, address, created_at) \
             VALUES (?1, ?2, ?3, ?4) RETURNING number",
            params![
                parcel.client,
                parcel.status,
                parcel.address,
                created_at,
            ],
            |row| row.get(0),
        )?;
        debug!(number, "parcel added");
        Ok(number)
    }

    /// Fetch a single parcel.
    #[tracing::instrument(skip(self))]
    pub fn get(&self, number: ParcelNumber) -> Result<Parcel> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("{SELECT_COLUMNS} WHERE number = ?1"),
            params![number],
            parcel_from_row,
        )
        .optional()?
        .ok_or(TrackerError::NotFound { number })
    }

    /// Every parcel owned by `client`, ordered by number. Empty if none.
    #[tracing::instrument(skip(self))]
    pub fn get_by_client(&self, client: ClientId) -> Result<Vec<Parcel>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare_cached(&format!("{SELECT_COLUMNS} WHERE client = ?1 ORDER BY number"))?;
        let parcels = stmt
            .query_map(params![client], parcel_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(count = parcels.len(), "parcels loaded");
        Ok(parcels)
    }

    /// Replace the delivery address of a `registered` parcel.
    #[tracing::instrument(skip(self, address))]
    pub fn set_address(&self, number: ParcelNumber, address: &str) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let status = current_status(&tx, number)?;
        if !status.is_editable() {
            warn!(%status, "address change rejected");
            return Err(TrackerError::InvalidState { number, status });
        }

        tx.execute(
            "UPDATE parcel SET address = ?1 WHERE number = ?2",
            params![address, number],
        )?;
        tx.commit()?;
        debug!("address updated");
        Ok(())
    }

    /// Move a parcel to `status`, which must be the next lifecycle step.
    #[tracing::instrument(skip(self), fields(to = %status))]
    pub fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current = current_status(&tx, number)?;
        if !current.can_transition_to(status) {
            warn!(from = %current, "status change rejected");
            return Err(TrackerError::InvalidTransition {
                number,
                from: current,
                to: status,
            });
        }

        tx.execute(
            "UPDATE parcel SET status = ?1 WHERE number = ?2",
            params![status, number],
        )?;
        tx.commit()?;
        debug!(from = %current, "status updated");
        Ok(())
    }

    /// Permanently remove a `registered` parcel.
    #[tracing::instrument(skip(self))]
    pub fn delete(&self, number: ParcelNumber) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let status = current_status(&tx, number)?;
        if !status.is_editable() {
            warn!(%status, "delete rejected");
            return Err(TrackerError::InvalidState { number, status });
        }

        tx.execute("DELETE FROM parcel WHERE number = ?1", params![number])?;
        tx.commit()?;
        debug!("parcel deleted");
        Ok(())
    }
}

// Called inside the caller's transaction; an early return drops it, which
// rolls back.
fn current_status(conn: &Connection, number: ParcelNumber) -> Result<ParcelStatus> {
    conn.query_row(
        "SELECT status FROM parcel WHERE number = ?1",
        params![number],
        |row| row.get(0),
    )
    .optional()?
    .ok_or(TrackerError::NotFound { number })
}

fn parcel_from_row(row: &Row<'_>) -> rusqlite::Result<Parcel> {
    let raw: String = row.get(4)?;
    let created_at = parse_timestamp(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(Parcel {
        number: row.get(0)?,
        client: row.get(1)?,
        status: row.get(2)?,
        address: row.get(3)?,
        created_at,
    })
}
