use anyhow::Result;
use rusqlite::Connection;

// Raw tables, loaded row-for-row from the feed
const CREATE_STOPS: &str = "
CREATE TABLE IF NOT EXISTS stops (
    stop_id TEXT PRIMARY KEY NOT NULL,
    code TEXT,
    name TEXT,
    description TEXT,
    lon REAL,
    lat REAL
)";

// start_time is seconds since midnight of the service day, taken from the first stop time
const CREATE_TRIPS: &str = "
CREATE TABLE IF NOT EXISTS trips (
    trip_id TEXT PRIMARY KEY NOT NULL,
    route_id TEXT NOT NULL,
    service_id TEXT,
    block_id TEXT,
    headsign TEXT,
    start_time REAL NOT NULL,
    start_stop_id TEXT NOT NULL,
    end_stop_id TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS trips_block_service ON trips (block_id, service_id)";

// Derived; only ever written by populating blocks
const CREATE_BLOCKS: &str = "
CREATE TABLE IF NOT EXISTS blocks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    sequence INTEGER NOT NULL,
    block_id TEXT NOT NULL,
    service_id TEXT NOT NULL,
    trip_id TEXT NOT NULL,
    prev_trip_id TEXT,
    next_trip_id TEXT,
    start_stop_id TEXT NOT NULL,
    end_stop_id TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS blocks_block_id ON blocks (block_id);
CREATE INDEX IF NOT EXISTS blocks_service_id ON blocks (service_id);
CREATE INDEX IF NOT EXISTS blocks_trip_id ON blocks (trip_id);
CREATE INDEX IF NOT EXISTS blocks_start_stop_id ON blocks (start_stop_id);
CREATE INDEX IF NOT EXISTS blocks_end_stop_id ON blocks (end_stop_id)";

pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_STOPS)?;
    conn.execute_batch(CREATE_TRIPS)?;
    conn.execute_batch(CREATE_BLOCKS)?;
    Ok(())
}
