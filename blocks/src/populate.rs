use abstutil::Timer;
use anyhow::Result;

use crate::{sequence, BatchCommitter, BlockStore, Config, Groups, TripRecord};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Summary {
    pub groups: usize,
    pub blocks: usize,
    /// Trips without a block or service
    pub skipped_trips: usize,
    pub flushes: usize,
}

/// Derives blocks from trips sorted by (block, service) and writes them to the store in batches.
///
/// This doesn't check for existing rows in the store; running twice without clearing it first
/// writes every block twice. The first error aborts the run. Batches committed before that stay
/// in the store.
pub fn populate<I, S>(
    trips: I,
    store: &mut S,
    config: &Config,
    timer: &mut Timer,
) -> Result<Summary>
where
    I: IntoIterator<Item = Result<TripRecord>>,
    S: BlockStore,
{
    config.validate()?;
    timer.start("populate blocks");
    let result = populate_inner(trips.into_iter(), store, config.batch_size);
    timer.stop("populate blocks");

    let summary = result?;
    info!(
        "Populated {} blocks in {} groups with {} flushes, skipping {} trips without a block or service",
        summary.blocks, summary.groups, summary.flushes, summary.skipped_trips
    );
    Ok(summary)
}

fn populate_inner<I, S>(trips: I, store: &mut S, batch_size: usize) -> Result<Summary>
where
    I: Iterator<Item = Result<TripRecord>>,
    S: BlockStore,
{
    let mut committer = BatchCommitter::new(store, batch_size);
    let mut groups = Groups::new(trips);
    let mut num_groups = 0;
    for group in &mut groups {
        committer.stage_group(sequence(group?))?;
        num_groups += 1;
    }
    let stats = committer.finish()?;

    Ok(Summary {
        groups: num_groups,
        blocks: stats.rows,
        skipped_trips: groups.skipped(),
        flushes: stats.flushes,
    })
}
