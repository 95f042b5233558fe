use anyhow::Result;
use gtfs::{BlockID, ServiceID, StopID, TripID};
use rusqlite::{params, Connection};

use crate::{Block, BlockStore, StopIDs};

const INSERT_BLOCK: &str = "INSERT INTO blocks
    (sequence, block_id, service_id, trip_id, prev_trip_id, next_trip_id, start_stop_id, end_stop_id)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

/// Writes each batch of blocks in its own transaction.
pub struct SqliteBlockStore<'a> {
    conn: &'a mut Connection,
}

impl<'a> SqliteBlockStore<'a> {
    pub fn new(conn: &'a mut Connection) -> Self {
        Self { conn }
    }
}

impl BlockStore for SqliteBlockStore<'_> {
    fn write_batch(&mut self, blocks: &[Block]) -> Result<()> {
        // Dropping the transaction without committing rolls it back
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(INSERT_BLOCK)?;
            for b in blocks {
                stmt.execute(params![
                    b.sequence as i64,
                    b.block_id.as_str(),
                    b.service_id.as_str(),
                    b.trip_id.as_str(),
                    b.prev_trip_id.as_ref().map(|id| id.as_str()),
                    b.next_trip_id.as_ref().map(|id| id.as_str()),
                    b.start_stop_id.as_str(),
                    b.end_stop_id.as_str(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

/// In the order they were written.
pub fn load_all(conn: &Connection) -> Result<Vec<Block>> {
    let mut stmt = conn.prepare(
        "SELECT sequence, block_id, service_id, trip_id, prev_trip_id, next_trip_id,
                start_stop_id, end_stop_id
         FROM blocks ORDER BY id",
    )?;
    let rows = stmt.query_map([], |row| {
        let sequence: i64 = row.get(0)?;
        let prev: Option<String> = row.get(4)?;
        let next: Option<String> = row.get(5)?;
        Ok(Block {
            sequence: sequence as usize,
            block_id: BlockID::new(row.get::<_, String>(1)?),
            service_id: ServiceID::new(row.get::<_, String>(2)?),
            trip_id: TripID::new(row.get::<_, String>(3)?),
            prev_trip_id: prev.map(TripID::new),
            next_trip_id: next.map(TripID::new),
            start_stop_id: StopID::new(row.get::<_, String>(6)?),
            end_stop_id: StopID::new(row.get::<_, String>(7)?),
        })
    })?;

    let mut blocks = Vec::new();
    for row in rows {
        blocks.push(row?);
    }
    Ok(blocks)
}

pub fn count(conn: &Connection) -> Result<usize> {
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM blocks", [], |row| row.get(0))?;
    Ok(n as usize)
}

pub fn clear(conn: &Connection) -> Result<usize> {
    Ok(conn.execute("DELETE FROM blocks", [])?)
}

#[derive(Clone, Copy)]
pub enum StopColumn {
    Start,
    End,
}

impl StopColumn {
    fn query(self) -> &'static str {
        match self {
            StopColumn::Start => "SELECT start_stop_id FROM blocks ORDER BY id",
            StopColumn::End => "SELECT end_stop_id FROM blocks ORDER BY id",
        }
    }
}

/// Adds the distinct stops in one column to `ids`, streaming through the table once.
pub fn collect_stop_ids(conn: &Connection, column: StopColumn, ids: &mut StopIDs) -> Result<()> {
    let mut stmt = conn.prepare(column.query())?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    for row in rows {
        ids.insert(StopID::new(row?));
    }
    Ok(())
}
