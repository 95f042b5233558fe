//! Derives blocks from a trip table: the ordered chain of trips that one vehicle drives on one
//! service day.
//!
//! Trips are read sorted by (block, service), partitioned into contiguous groups, ordered by
//! departure time, linked to their neighbors, and written back in bounded batches.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod block;
mod commit;
mod config;
pub mod db;
mod partition;
mod populate;
mod projection;
mod sequence;

pub use self::block::{Block, GroupKey, TripRecord};
pub use self::commit::{BatchCommitter, BlockStore, CommitStats};
pub use self::config::{Config, DEFAULT_BATCH_SIZE};
pub use self::db::Database;
pub use self::partition::{Group, Groups};
pub use self::populate::{populate, Summary};
pub use self::projection::{end_stop_ids, start_stop_ids, unique_stop_ids, StopIDs};
pub use self::sequence::sequence;
