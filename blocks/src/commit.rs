use anyhow::Result;

use crate::Block;

/// Somewhere to durably persist block rows.
pub trait BlockStore {
    /// Writes and commits every row as one transactional unit. If this fails, none of these rows
    /// should be visible, but earlier batches stay.
    fn write_batch(&mut self, blocks: &[Block]) -> Result<()>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CommitStats {
    pub rows: usize,
    pub flushes: usize,
}

/// Buffers whole groups of blocks and hands them to a [`BlockStore`] in bounded batches.
///
/// After each group is staged, a counter grows by the group's size minus one (the number of links
/// between its trips). Once the counter reaches the batch size, everything staged is flushed and
/// the counter resets. A group is never split across two flushes. [`BatchCommitter::finish`]
/// always flushes one last time, even with nothing staged.
pub struct BatchCommitter<'a, S: BlockStore> {
    store: &'a mut S,
    batch_size: usize,
    staged: Vec<Block>,
    counter: usize,
    stats: CommitStats,
}

impl<'a, S: BlockStore> BatchCommitter<'a, S> {
    pub fn new(store: &'a mut S, batch_size: usize) -> Self {
        Self {
            store,
            batch_size,
            staged: Vec::new(),
            counter: 0,
            stats: CommitStats::default(),
        }
    }

    pub fn stage_group(&mut self, group: Vec<Block>) -> Result<()> {
        self.counter += group.len().saturating_sub(1);
        self.staged.extend(group);
        if self.counter >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Rows staged since the last flush.
    pub fn staged(&self) -> usize {
        self.staged.len()
    }

    pub fn finish(mut self) -> Result<CommitStats> {
        self.flush()?;
        Ok(self.stats)
    }

    fn flush(&mut self) -> Result<()> {
        self.store.write_batch(&self.staged)?;
        debug!(
            "Flushed {} blocks (counter was {})",
            self.staged.len(),
            self.counter
        );
        self.stats.rows += self.staged.len();
        self.stats.flushes += 1;
        self.staged.clear();
        self.counter = 0;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::block::tests::trip;
    use crate::{sequence, Group, TripRecord};

    /// Remembers every batch written. Optionally fails on one batch.
    #[derive(Default)]
    pub struct MemoryStore {
        pub batches: Vec<Vec<Block>>,
        pub fail_on_batch: Option<usize>,
    }

    impl MemoryStore {
        pub fn rows(&self) -> Vec<&Block> {
            self.batches.iter().flatten().collect()
        }
    }

    impl BlockStore for MemoryStore {
        fn write_batch(&mut self, blocks: &[Block]) -> Result<()> {
            if self.fail_on_batch == Some(self.batches.len()) {
                bail!("disk full");
            }
            self.batches.push(blocks.to_vec());
            Ok(())
        }
    }

    /// Sequenced blocks for a group of `size` trips with this block id.
    pub fn blocks(block: &str, size: usize) -> Vec<Block> {
        let trips: Vec<TripRecord> = (0..size)
            .map(|idx| {
                trip(
                    &format!("{block}-{idx}"),
                    Some(block),
                    Some("S1"),
                    &format!("{:02}:00:00", idx),
                )
            })
            .collect();
        sequence(Group {
            key: trips[0].key().unwrap(),
            trips,
        })
    }

    fn batch_sizes(store: &MemoryStore) -> Vec<usize> {
        store.batches.iter().map(|b| b.len()).collect()
    }

    #[test]
    fn counter_counts_links() {
        let mut store = MemoryStore::default();
        let mut committer = BatchCommitter::new(&mut store, 5);
        committer.stage_group(blocks("g1", 3)).unwrap();
        // 3 - 1 = 2 < 5
        assert_eq!(committer.staged(), 3);
        committer.stage_group(blocks("g2", 4)).unwrap();
        // 2 + 3 = 5, flushed right after the second group
        assert_eq!(committer.staged(), 0);
        let stats = committer.finish().unwrap();

        // The final flush happens even with a zero counter and nothing staged
        assert_eq!(batch_sizes(&store), vec![7, 0]);
        assert_eq!(stats, CommitStats { rows: 7, flushes: 2 });
    }

    #[test]
    fn never_flushes_mid_group() {
        let mut store = MemoryStore::default();
        let mut committer = BatchCommitter::new(&mut store, 2);
        committer.stage_group(blocks("g1", 2)).unwrap();
        committer.stage_group(blocks("g2", 10)).unwrap();
        committer.stage_group(blocks("g3", 1)).unwrap();
        committer.finish().unwrap();

        assert_eq!(batch_sizes(&store), vec![12, 1]);
        for batch in &store.batches {
            for b in batch {
                let group_rows = batch.iter().filter(|x| x.block_id == b.block_id).count();
                let total = store.rows().iter().filter(|x| x.block_id == b.block_id).count();
                assert_eq!(group_rows, total);
            }
        }
    }

    #[test]
    fn single_trip_groups_dont_advance_the_counter() {
        let mut store = MemoryStore::default();
        let mut committer = BatchCommitter::new(&mut store, 1);
        for idx in 0..5 {
            committer.stage_group(blocks(&format!("g{idx}"), 1)).unwrap();
        }
        assert_eq!(committer.staged(), 5);
        committer.finish().unwrap();
        assert_eq!(batch_sizes(&store), vec![5]);
    }

    #[test]
    fn final_flush_below_threshold() {
        let mut store = MemoryStore::default();
        let mut committer = BatchCommitter::new(&mut store, 100);
        committer.stage_group(blocks("g1", 3)).unwrap();
        committer.finish().unwrap();
        assert_eq!(batch_sizes(&store), vec![3]);
    }

    #[test]
    fn failed_flush_keeps_earlier_batches() {
        let mut store = MemoryStore {
            fail_on_batch: Some(1),
            ..Default::default()
        };
        let mut committer = BatchCommitter::new(&mut store, 1);
        committer.stage_group(blocks("g1", 2)).unwrap();
        assert!(committer.stage_group(blocks("g2", 2)).is_err());
        drop(committer);
        assert_eq!(batch_sizes(&store), vec![2]);
    }
}
