use std::cmp::Ordering;

use crate::{Block, Group};

/// Orders one group by departure time and links each trip to its neighbors. Trips departing at
/// the same time keep their input order.
pub fn sequence(group: Group) -> Vec<Block> {
    let Group { key, mut trips } = group;
    // sort_by is stable
    trips.sort_by(|a, b| {
        a.departure
            .partial_cmp(&b.departure)
            .unwrap_or(Ordering::Equal)
    });

    let mut blocks = Vec::with_capacity(trips.len());
    for (idx, trip) in trips.iter().enumerate() {
        blocks.push(Block {
            sequence: idx + 1,
            block_id: key.block_id.clone(),
            service_id: key.service_id.clone(),
            trip_id: trip.trip_id.clone(),
            prev_trip_id: idx
                .checked_sub(1)
                .map(|prev| trips[prev].trip_id.clone()),
            next_trip_id: trips.get(idx + 1).map(|next| next.trip_id.clone()),
            start_stop_id: trip.start_stop_id.clone(),
            end_stop_id: trip.end_stop_id.clone(),
        });
    }
    blocks
}
