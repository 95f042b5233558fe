use anyhow::Result;
use gtfs::{Stop, StopID};
use rusqlite::{Connection, OptionalExtension};

pub fn lookup(conn: &Connection, stop_id: &StopID) -> Result<Option<Stop>> {
    let stop = conn
        .query_row(
            "SELECT stop_id, code, name, description, lon, lat FROM stops WHERE stop_id = ?1",
            [stop_id.as_str()],
            |row| {
                Ok(Stop {
                    stop_id: StopID::new(row.get::<_, String>(0)?),
                    code: row.get(1)?,
                    name: row.get(2)?,
                    description: row.get(3)?,
                    lon: row.get(4)?,
                    lat: row.get(5)?,
                })
            },
        )
        .optional()?;
    Ok(stop)
}
