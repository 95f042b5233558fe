use anyhow::Result;
use geom::Time;
use gtfs::{BlockID, ServiceID, StopID, TripID};
use rusqlite::{Connection, OptionalExtension};

use crate::TripRecord;

// rowid keeps the order of trips within a group deterministic, so departure time ties break the
// same way every run
const SORTED_TRIPS: &str = "
SELECT t.trip_id, t.block_id, t.service_id, t.start_time,
       t.start_stop_id, t.end_stop_id, s.stop_id, e.stop_id
FROM trips t
LEFT JOIN stops s ON s.stop_id = t.start_stop_id
LEFT JOIN stops e ON e.stop_id = t.end_stop_id
ORDER BY t.block_id, t.service_id, t.rowid";

const ONE_TRIP: &str = "
SELECT t.trip_id, t.block_id, t.service_id, t.start_time,
       t.start_stop_id, t.end_stop_id, s.stop_id, e.stop_id
FROM trips t
LEFT JOIN stops s ON s.stop_id = t.start_stop_id
LEFT JOIN stops e ON e.stop_id = t.end_stop_id
WHERE t.trip_id = ?1";

struct TripRow {
    trip_id: String,
    block_id: Option<String>,
    service_id: Option<String>,
    start_time: f64,
    start_ref: String,
    end_ref: String,
    start_stop: Option<String>,
    end_stop: Option<String>,
}

/// Streams every trip, sorted by (block, service), into `f`. Rows are read lazily from `conn`,
/// which should be a connection dedicated to this read. A trip with a block and service whose
/// start or end stop doesn't exist shows up as an error.
pub fn with_sorted_trips<T, F>(conn: &Connection, f: F) -> Result<T>
where
    F: FnOnce(&mut dyn Iterator<Item = Result<TripRecord>>) -> Result<T>,
{
    let mut stmt = conn.prepare(SORTED_TRIPS)?;
    let rows = stmt.query_map([], read_row)?;
    let mut trips = rows.map(|row| -> Result<TripRecord> { resolve(row?) });
    f(&mut trips)
}

pub fn lookup(conn: &Connection, trip_id: &TripID) -> Result<Option<TripRecord>> {
    let row = conn
        .query_row(ONE_TRIP, [trip_id.as_str()], read_row)
        .optional()?;
    row.map(resolve).transpose()
}

fn read_row(row: &rusqlite::Row) -> rusqlite::Result<TripRow> {
    Ok(TripRow {
        trip_id: row.get(0)?,
        block_id: row.get(1)?,
        service_id: row.get(2)?,
        start_time: row.get(3)?,
        start_ref: row.get(4)?,
        end_ref: row.get(5)?,
        start_stop: row.get(6)?,
        end_stop: row.get(7)?,
    })
}

fn resolve(row: TripRow) -> Result<TripRecord> {
    let block_id = row.block_id.map(BlockID::new);
    let service_id = row.service_id.map(ServiceID::new);
    // Trips without a block or service get dropped before anything looks at their stops, so a
    // dangling reference there isn't an error
    let keyed = block_id.is_some() && service_id.is_some();
    let start_stop_id = match (row.start_stop, keyed) {
        (Some(id), _) => StopID::new(id),
        (None, false) => StopID::new(row.start_ref),
        (None, true) => bail!("Trip {} starts at unknown stop {}", row.trip_id, row.start_ref),
    };
    let end_stop_id = match (row.end_stop, keyed) {
        (Some(id), _) => StopID::new(id),
        (None, false) => StopID::new(row.end_ref),
        (None, true) => bail!("Trip {} ends at unknown stop {}", row.trip_id, row.end_ref),
    };
    if !row.start_time.is_finite() || row.start_time < 0.0 {
        bail!("Trip {} has bad start_time {}", row.trip_id, row.start_time);
    }
    Ok(TripRecord {
        trip_id: TripID::new(row.trip_id),
        block_id,
        service_id,
        departure: Time::seconds_since_midnight(row.start_time),
        start_stop_id,
        end_stop_id,
    })
}
