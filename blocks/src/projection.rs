use std::collections::HashSet;

use gtfs::StopID;

use crate::Block;

/// Distinct stop IDs, in the order they were first seen.
#[derive(Default)]
pub struct StopIDs {
    seen: HashSet<StopID>,
    ordered: Vec<StopID>,
}

impl StopIDs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: StopID) {
        if !self.seen.contains(&id) {
            self.seen.insert(id.clone());
            self.ordered.push(id);
        }
    }

    pub fn into_vec(self) -> Vec<StopID> {
        self.ordered
    }
}

impl Extend<StopID> for StopIDs {
    fn extend<I: IntoIterator<Item = StopID>>(&mut self, iter: I) {
        for id in iter {
            self.insert(id);
        }
    }
}

pub fn start_stop_ids<'a, I: IntoIterator<Item = &'a Block>>(blocks: I) -> Vec<StopID> {
    let mut ids = StopIDs::new();
    ids.extend(blocks.into_iter().map(|b| b.start_stop_id.clone()));
    ids.into_vec()
}

pub fn end_stop_ids<'a, I: IntoIterator<Item = &'a Block>>(blocks: I) -> Vec<StopID> {
    let mut ids = StopIDs::new();
    ids.extend(blocks.into_iter().map(|b| b.end_stop_id.clone()));
    ids.into_vec()
}

/// All start stops first, then any end stops not already listed.
pub fn unique_stop_ids<'a, I>(blocks: I) -> Vec<StopID>
where
    I: IntoIterator<Item = &'a Block>,
    I::IntoIter: Clone,
{
    let blocks = blocks.into_iter();
    let mut ids = StopIDs::new();
    ids.extend(blocks.clone().map(|b| b.start_stop_id.clone()));
    ids.extend(blocks.map(|b| b.end_stop_id.clone()));
    ids.into_vec()
}
