use geom::Time;
use gtfs::{BlockID, ServiceID, StopID, TripID};
use serde::{Deserialize, Serialize};

/// One row of the trip table, with the start and end stops already resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct TripRecord {
    pub trip_id: TripID,
    pub block_id: Option<BlockID>,
    pub service_id: Option<ServiceID>,
    pub departure: Time,
    pub start_stop_id: StopID,
    pub end_stop_id: StopID,
}

impl TripRecord {
    /// Trips without both a block and a service don't belong to any block.
    pub fn key(&self) -> Option<GroupKey> {
        Some(GroupKey {
            block_id: self.block_id.clone()?,
            service_id: self.service_id.clone()?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub block_id: BlockID,
    pub service_id: ServiceID,
}

/// One trip's position within its (block, service) group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// 1-based, in order of departure time
    pub sequence: usize,
    pub block_id: BlockID,
    pub service_id: ServiceID,
    pub trip_id: TripID,
    pub prev_trip_id: Option<TripID>,
    pub next_trip_id: Option<TripID>,
    pub start_stop_id: StopID,
    pub end_stop_id: StopID,
}
