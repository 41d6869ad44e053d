use tracing::info;

use crate::error::{Result, TrackerError};
use crate::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus};
use crate::store::ParcelStore;

/// Parcel workflows built on top of [`ParcelStore`].
#[derive(Clone)]
pub struct ParcelService {
    store: ParcelStore,
}

impl ParcelService {
    pub fn new(store: ParcelStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ParcelStore {
        &self.store
    }

    /// Create and persist a new `registered` parcel for `client`.
    pub fn register(&self, client: ClientId, address: &str) -> Result<Parcel> {
        let mut parcel = Parcel::new(client, address);
        parcel.number = self.store.add(&parcel)?;

        info!(
            number = parcel.number,
            client,
            address,
            created_at = %parcel.created_at,
            "parcel registered"
        );
        Ok(parcel)
    }

    pub fn client_parcels(&self, client: ClientId) -> Result<Vec<Parcel>> {
        let parcels = self.store.get_by_client(client)?;
        info!(client, count = parcels.len(), "client parcels listed");
        Ok(parcels)
    }

    /// Advance a parcel one lifecycle step and return its new status.
    pub fn next_status(&self, number: ParcelNumber) -> Result<ParcelStatus> {
        let current = self.store.get(number)?.status;
        let next = current
            .next()
            .ok_or(TrackerError::InvalidTransition {
                number,
                from: current,
                to: current,
            })?;

        self.store.set_status(number, next)?;
        info!(number, from = %current, to = %next, "parcel status advanced");
        Ok(next)
    }

    pub fn change_address(&self, number: ParcelNumber, address: &str) -> Result<()> {
        self.store.set_address(number, address)?;
        info!(number, address, "parcel address changed");
        Ok(())
    }

    pub fn delete(&self, number: ParcelNumber) -> Result<()> {
        self.store.delete(number)?;
        info!(number, "parcel deleted");
        Ok(())
    }
}
