use std::collections::BTreeSet;

use anyhow::Result;
use geom::Time;
use serde::{Deserialize, Serialize};

use super::{BlockID, RouteID, ServiceID, StopID, StopTime, TripID};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Trip {
    pub trip_id: TripID,
    pub route_id: RouteID,
    // Required by GTFS, but some feeds leave it blank
    pub service_id: Option<ServiceID>,
    pub block_id: Option<BlockID>,
    pub headsign: Option<String>,

    pub stop_times: Vec<StopTime>,
}

impl Trip {
    /// When the vehicle leaves the first stop. Falls back to the arrival time there.
    pub fn departure_time(&self) -> Option<Time> {
        let first = self.stop_times.first()?;
        first.departure_time.or(first.arrival_time)
    }

    pub fn first_stop(&self) -> Option<&StopID> {
        self.stop_times.first().map(|st| &st.stop_id)
    }

    pub fn last_stop(&self) -> Option<&StopID> {
        self.stop_times.last().map(|st| &st.stop_id)
    }
}

pub fn load<R: std::io::Read>(reader: R) -> Result<Vec<Trip>> {
    let mut trips = Vec::new();
    let mut seen = BTreeSet::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        if !seen.insert(rec.trip_id.clone()) {
            bail!("Duplicate {:?}", rec.trip_id);
        }
        trips.push(Trip {
            trip_id: rec.trip_id,
            route_id: rec.route_id,
            service_id: rec.service_id,
            block_id: rec.block_id,
            headsign: rec.trip_headsign,

            stop_times: Vec::new(),
        });
    }
    Ok(trips)
}

#[derive(Deserialize)]
struct Record {
    trip_id: TripID,
    route_id: RouteID,
    service_id: Option<ServiceID>,
    #[serde(default)]
    block_id: Option<BlockID>,
    #[serde(default)]
    trip_headsign: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_block_and_service() {
        let input = "route_id,service_id,trip_id,block_id\n\
                     r1,wkdy,t1,b1\n\
                     r1,wkdy,t2,\n\
                     r1,,t3,b1\n";
        let trips = load(input.as_bytes()).unwrap();
        assert_eq!(trips.len(), 3);
        assert_eq!(trips[0].block_id, Some(BlockID::new("b1")));
        assert_eq!(trips[1].block_id, None);
        assert_eq!(trips[2].service_id, None);
    }

    #[test]
    fn no_block_column() {
        let input = "route_id,service_id,trip_id\nr1,wkdy,t1\n";
        let trips = load(input.as_bytes()).unwrap();
        assert_eq!(trips[0].block_id, None);
        assert_eq!(trips[0].headsign, None);
    }

    #[test]
    fn duplicate_trip() {
        let input = "route_id,service_id,trip_id\nr1,wkdy,t1\nr1,wkdy,t1\n";
        assert!(load(input.as_bytes()).is_err());
    }

    #[test]
    fn departure_falls_back_to_arrival() {
        let trip = Trip {
            trip_id: TripID::new("t1"),
            route_id: RouteID::new("r1"),
            service_id: None,
            block_id: None,
            headsign: None,
            stop_times: vec![
                StopTime {
                    arrival_time: Some(Time::parse("06:00:00").unwrap()),
                    departure_time: None,
                    stop_id: StopID::new("a"),
                },
                StopTime {
                    arrival_time: None,
                    departure_time: None,
                    stop_id: StopID::new("b"),
                },
            ],
        };
        assert_eq!(trip.departure_time(), Some(Time::parse("06:00:00").unwrap()));
        assert_eq!(trip.first_stop(), Some(&StopID::new("a")));
        assert_eq!(trip.last_stop(), Some(&StopID::new("b")));
    }
}
