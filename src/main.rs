use anyhow::{Context, Result};
use parcel_tracker::config::TrackerConfig;
use parcel_tracker::logging::init_logging;
use parcel_tracker::sqlite::{initialize_schema, parcel_schema};
use parcel_tracker::{ParcelService, ParcelStore, TrackerError};

const DEMO_CLIENT: i64 = 1;

fn main() -> Result<()> {
    init_logging();

    let config = TrackerConfig::load_default()?;
    let conn = config
        .database
        .open()
        .with_context(|| format!("opening {}", config.database.db_path))?;
    initialize_schema(&conn, &parcel_schema()).context("provisioning schema")?;

    let service = ParcelService::new(ParcelStore::from_connection(conn));

    let parcel = service.register(DEMO_CLIENT, "Psk, Voennaya d. 4, kv. 2")?;
    service.change_address(parcel.number, "Saratov, Verkhnyaya d. 3")?;
    service.next_status(parcel.number)?;
    service.client_parcels(DEMO_CLIENT)?;

    // Already sent, so this must be refused.
    match service.delete(parcel.number) {
        Err(TrackerError::InvalidState { status, .. }) => {
            tracing::info!(number = parcel.number, %status, "delete refused as expected");
        }
        other => other?,
    }

    service.next_status(parcel.number)?;
    service.client_parcels(DEMO_CLIENT)?;

    let spare = service.register(DEMO_CLIENT, "Moscow, Lenina d. 1")?;
    service.delete(spare.number)?;
    service.client_parcels(DEMO_CLIENT)?;

    Ok(())
}
