//! SQLite storage for the trip table and the derived block table.

mod blocks;
mod import;
mod schema;
mod stops;
mod trips;

use std::path::{Path, PathBuf};
use std::time::Duration;

use abstutil::Timer;
use anyhow::{Context, Result};
use gtfs::{Feed, Stop, StopID, TripID};
use rusqlite::Connection;

use crate::{populate, Block, Config, StopIDs, Summary, TripRecord};

pub use self::blocks::SqliteBlockStore;
pub use self::trips::with_sorted_trips;

use self::blocks::StopColumn;

pub struct Database {
    path: PathBuf,
    conn: Connection,
}

impl Database {
    /// Opens or creates a database file, creating any missing tables.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = connect(&path)?;
        schema::create_tables(&conn)?;
        Ok(Self { path, conn })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// For ad-hoc queries. Don't write to the blocks table through this.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn import_feed(&mut self, feed: &Feed, timer: &mut Timer) -> Result<()> {
        import::import_feed(&mut self.conn, feed, timer)
    }

    /// Deletes everything: raw and derived tables.
    pub fn clear_feed(&self) -> Result<()> {
        import::clear_feed(&self.conn)
    }

    /// Derives blocks from the trip table and appends them to the block table. Existing blocks
    /// aren't touched, so call [`Database::clear_blocks`] first to rebuild them.
    pub fn populate_blocks(&mut self, config: &Config, timer: &mut Timer) -> Result<Summary> {
        // Trips stream through their own connection while batches commit on the main one
        let reader = connect(&self.path)?;
        let conn = &mut self.conn;
        trips::with_sorted_trips(&reader, |trips| {
            let mut store = SqliteBlockStore::new(conn);
            populate(trips, &mut store, config, timer)
        })
    }

    /// Returns how many rows were deleted.
    pub fn clear_blocks(&self) -> Result<usize> {
        let deleted = blocks::clear(&self.conn)?;
        debug!("Cleared {deleted} blocks");
        Ok(deleted)
    }

    pub fn blocks(&self) -> Result<Vec<Block>> {
        blocks::load_all(&self.conn)
    }

    pub fn num_blocks(&self) -> Result<usize> {
        blocks::count(&self.conn)
    }

    pub fn trip(&self, trip_id: &TripID) -> Result<Option<TripRecord>> {
        trips::lookup(&self.conn, trip_id)
    }

    pub fn stop(&self, stop_id: &StopID) -> Result<Option<Stop>> {
        stops::lookup(&self.conn, stop_id)
    }

    /// The trip this block row was derived from. `None` if it's since been deleted from the
    /// trip table.
    pub fn block_trip(&self, block: &Block) -> Result<Option<TripRecord>> {
        self.trip(&block.trip_id)
    }

    /// The trip run just before this one in the same block and service. `None` for the first.
    pub fn prev_trip(&self, block: &Block) -> Result<Option<TripRecord>> {
        match block.prev_trip_id {
            Some(ref id) => self.trip(id),
            None => Ok(None),
        }
    }

    pub fn next_trip(&self, block: &Block) -> Result<Option<TripRecord>> {
        match block.next_trip_id {
            Some(ref id) => self.trip(id),
            None => Ok(None),
        }
    }

    pub fn start_stop(&self, block: &Block) -> Result<Option<Stop>> {
        self.stop(&block.start_stop_id)
    }

    pub fn end_stop(&self, block: &Block) -> Result<Option<Stop>> {
        self.stop(&block.end_stop_id)
    }

    /// Distinct stops where some block trip starts, in the order first written.
    pub fn start_stop_ids(&self) -> Result<Vec<StopID>> {
        let mut ids = StopIDs::new();
        blocks::collect_stop_ids(&self.conn, StopColumn::Start, &mut ids)?;
        Ok(ids.into_vec())
    }

    /// Distinct stops where some block trip ends, in the order first written.
    pub fn end_stop_ids(&self) -> Result<Vec<StopID>> {
        let mut ids = StopIDs::new();
        blocks::collect_stop_ids(&self.conn, StopColumn::End, &mut ids)?;
        Ok(ids.into_vec())
    }

    /// Start stops, then any end stops not already included.
    pub fn unique_stop_ids(&self) -> Result<Vec<StopID>> {
        let mut ids = StopIDs::new();
        blocks::collect_stop_ids(&self.conn, StopColumn::Start, &mut ids)?;
        blocks::collect_stop_ids(&self.conn, StopColumn::End, &mut ids)?;
        Ok(ids.into_vec())
    }
}

fn connect(path: &Path) -> Result<Connection> {
    let conn =
        Connection::open(path).with_context(|| format!("opening database {}", path.display()))?;
    conn.busy_timeout(Duration::from_secs(5))?;
    // Readers don't block the writer, so trips can stream while blocks are committed
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    if !mode.eq_ignore_ascii_case("wal") {
        warn!("{} is using journal_mode {mode}, not WAL", path.display());
    }
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    Ok(conn)
}
