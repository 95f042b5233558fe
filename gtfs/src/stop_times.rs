use std::collections::BTreeMap;

use anyhow::Result;
use geom::Time;
use serde::{Deserialize, Serialize};

use super::{StopID, TripID};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StopTime {
    // Both are blank at stops that aren't timepoints
    pub arrival_time: Option<Time>,
    pub departure_time: Option<Time>,
    pub stop_id: StopID,
}

pub fn load<R: std::io::Read>(reader: R) -> Result<BTreeMap<TripID, Vec<StopTime>>> {
    let mut stop_times = BTreeMap::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        let arrival_time = parse_optional(&rec.arrival_time)?;
        let departure_time = parse_optional(&rec.departure_time)?;
        if let (Some(arrival), Some(departure)) = (arrival_time, departure_time) {
            if arrival > departure {
                bail!(
                    "{:?} arrives at {:?} at {arrival}, after departing at {departure}",
                    rec.trip_id,
                    rec.stop_id
                );
            }
        }
        stop_times
            .entry(rec.trip_id)
            .or_insert_with(Vec::new)
            .push((
                rec.stop_sequence,
                StopTime {
                    arrival_time,
                    departure_time,
                    stop_id: rec.stop_id,
                },
            ));
    }

    // Sort by stop_sequence, in case the file isn't in order
    let mut results = BTreeMap::new();
    for (trip_id, mut stops) in stop_times {
        stops.sort_by_key(|(seq, _)| *seq);
        results.insert(
            trip_id,
            stops.into_iter().map(|(_, stop_time)| stop_time).collect(),
        );
    }
    Ok(results)
}

// Blank at stops that aren't timepoints
fn parse_optional(raw: &str) -> Result<Option<Time>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    Time::parse(raw).map(Some)
}

#[derive(Deserialize)]
struct Record {
    trip_id: TripID,
    #[serde(default)]
    arrival_time: String,
    #[serde(default)]
    departure_time: String,
    stop_id: StopID,
    stop_sequence: usize,
}
