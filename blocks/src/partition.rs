use anyhow::Result;

use crate::{GroupKey, TripRecord};

/// Trips sharing one (block, service) key, in input order.
#[derive(Debug)]
pub struct Group {
    pub key: GroupKey,
    pub trips: Vec<TripRecord>,
}

/// Splits a stream of trips sorted by (block, service) into contiguous groups. This is a single
/// pass; a group ends as soon as the key changes. If the input isn't sorted, one real group gets
/// split into several smaller ones.
///
/// Trips missing a block or service are dropped. An error from the source is passed along and
/// ends the stream.
pub struct Groups<I> {
    trips: I,
    // The trip that ended the previous group
    pending: Option<TripRecord>,
    skipped: usize,
    done: bool,
}

impl<I: Iterator<Item = Result<TripRecord>>> Groups<I> {
    pub fn new(trips: I) -> Self {
        Self {
            trips,
            pending: None,
            skipped: 0,
            done: false,
        }
    }

    /// How many trips have been dropped so far for lacking a block or service.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn next_trip(&mut self) -> Option<Result<TripRecord>> {
        if let Some(trip) = self.pending.take() {
            return Some(Ok(trip));
        }
        self.trips.next()
    }
}

impl<I: Iterator<Item = Result<TripRecord>>> Iterator for Groups<I> {
    type Item = Result<Group>;

    fn next(&mut self) -> Option<Result<Group>> {
        if self.done {
            return None;
        }

        let (key, first) = loop {
            match self.next_trip()? {
                Ok(trip) => match trip.key() {
                    Some(key) => break (key, trip),
                    None => {
                        self.skipped += 1;
                    }
                },
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        };

        let mut trips = vec![first];
        while let Some(next) = self.trips.next() {
            match next {
                Ok(trip) => {
                    if trip.key().as_ref() == Some(&key) {
                        trips.push(trip);
                    } else {
                        self.pending = Some(trip);
                        break;
                    }
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
        Some(Ok(Group { key, trips }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::tests::trip;

    fn ids(group: &Group) -> Vec<&str> {
        group.trips.iter().map(|t| t.trip_id.as_str()).collect()
    }

    #[test]
    fn contiguous_runs() {
        let input = vec![
            trip("a", Some("b1"), Some("s1"), "08:00:00"),
            trip("b", Some("b1"), Some("s1"), "07:00:00"),
            trip("c", Some("b1"), Some("s2"), "08:00:00"),
            trip("d", Some("b2"), Some("s1"), "08:00:00"),
            trip("e", Some("b2"), Some("s1"), "09:00:00"),
        ];
        let groups: Vec<Group> = Groups::new(input.into_iter().map(Ok))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(groups.len(), 3);
        assert_eq!(ids(&groups[0]), vec!["a", "b"]);
        assert_eq!(ids(&groups[1]), vec!["c"]);
        assert_eq!(groups[1].key.service_id.as_str(), "s2");
        assert_eq!(ids(&groups[2]), vec!["d", "e"]);
    }

    #[test]
    fn trips_without_a_key_are_dropped() {
        let input = vec![
            trip("none", None, None, "08:00:00"),
            trip("no-block", None, Some("s1"), "08:00:00"),
            trip("a", Some("b1"), Some("s1"), "08:00:00"),
            trip("no-service", Some("b1"), None, "08:00:00"),
            trip("b", Some("b1"), Some("s1"), "09:00:00"),
        ];
        let mut groups = Groups::new(input.into_iter().map(Ok));
        let all: Vec<Group> = (&mut groups).collect::<Result<_>>().unwrap();
        assert_eq!(groups.skipped(), 3);
        // The keyless trip ends the run, so the same key shows up twice
        assert_eq!(all.len(), 2);
        assert_eq!(ids(&all[0]), vec!["a"]);
        assert_eq!(ids(&all[1]), vec!["b"]);
    }

    #[test]
    fn unsorted_input_splits_groups() {
        let input = vec![
            trip("a", Some("b1"), Some("s1"), "08:00:00"),
            trip("b", Some("b2"), Some("s1"), "08:00:00"),
            trip("c", Some("b1"), Some("s1"), "09:00:00"),
        ];
        let groups: Vec<Group> = Groups::new(input.into_iter().map(Ok))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn empty_and_all_skipped() {
        assert!(Groups::new(Vec::<Result<TripRecord>>::new().into_iter()).next().is_none());

        let input = vec![trip("a", None, Some("s1"), "08:00:00")];
        let mut groups = Groups::new(input.into_iter().map(Ok));
        assert!(groups.next().is_none());
        assert_eq!(groups.skipped(), 1);
    }

    #[test]
    fn source_error_ends_the_stream() {
        let input = vec![
            Ok(trip("a", Some("b1"), Some("s1"), "08:00:00")),
            Err(anyhow!("stop missing")),
            Ok(trip("b", Some("b1"), Some("s1"), "09:00:00")),
        ];
        let mut groups = Groups::new(input.into_iter());
        assert!(groups.next().unwrap().is_err());
        assert!(groups.next().is_none());
    }
}
