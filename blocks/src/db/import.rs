use abstutil::Timer;
use anyhow::Result;
use gtfs::Feed;
use rusqlite::{params, Connection};

/// Loads stops and trips row-for-row in one transaction. Stop references aren't checked here.
pub fn import_feed(conn: &mut Connection, feed: &Feed, timer: &mut Timer) -> Result<()> {
    timer.start("import feed");
    let result = insert_feed(conn, feed);
    timer.stop("import feed");
    result
}

fn insert_feed(conn: &mut Connection, feed: &Feed) -> Result<()> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO stops (stop_id, code, name, description, lon, lat)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for stop in feed.stops.values() {
            stmt.execute(params![
                stop.stop_id.as_str(),
                stop.code,
                stop.name,
                stop.description,
                stop.lon,
                stop.lat,
            ])?;
        }
    }
    {
        let mut stmt = tx.prepare(
            "INSERT INTO trips
             (trip_id, route_id, service_id, block_id, headsign, start_time, start_stop_id, end_stop_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for trip in &feed.trips {
            let (departure, first, last) =
                match (trip.departure_time(), trip.first_stop(), trip.last_stop()) {
                    (Some(departure), Some(first), Some(last)) => (departure, first, last),
                    _ => bail!("Trip {} has no departure time at its first stop", trip.trip_id),
                };
            stmt.execute(params![
                trip.trip_id.as_str(),
                trip.route_id.as_str(),
                trip.service_id.as_ref().map(|id| id.as_str()),
                trip.block_id.as_ref().map(|id| id.as_str()),
                trip.headsign,
                departure.inner_seconds(),
                first.as_str(),
                last.as_str(),
            ])?;
        }
    }
    tx.commit()?;
    info!(
        "Imported {} stops and {} trips",
        feed.stops.len(),
        feed.trips.len()
    );
    Ok(())
}

/// Empties every table, derived ones included.
pub fn clear_feed(conn: &Connection) -> Result<()> {
    conn.execute_batch("DELETE FROM blocks; DELETE FROM trips; DELETE FROM stops;")?;
    Ok(())
}
