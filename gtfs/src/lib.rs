//! Reads the parts of a static GTFS feed needed to build a trip table: stops, trips, and the stop
//! times that determine when and where each trip starts and ends.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod ids;
mod stop_times;
mod stops;
mod trips;

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use abstutil::Timer;
use anyhow::{Context, Result};
use zip::ZipArchive;

pub use ids::{BlockID, RouteID, ServiceID, StopID, TripID};
pub use stop_times::StopTime;
pub use stops::Stop;
pub use trips::Trip;

#[derive(Clone)]
pub struct Feed {
    pub stops: BTreeMap<StopID, Stop>,
    // In the order listed in trips.txt
    pub trips: Vec<Trip>,
}

impl Feed {
    pub fn load_from_zip<R: std::io::Read + std::io::Seek>(
        archive: &mut ZipArchive<R>,
        timer: &mut Timer,
    ) -> Result<Self> {
        let stops = timed(timer, "load stops", || {
            stops::load(get_zip_file(archive, "stops.txt")?)
        })?;
        let trips = timed(timer, "load trips", || {
            trips::load(get_zip_file(archive, "trips.txt")?)
        })?;
        let stop_times = timed(timer, "load stop times", || {
            stop_times::load(get_zip_file(archive, "stop_times.txt")?)
        })?;
        Self::assemble(stops, trips, stop_times)
    }

    pub fn load_from_dir<P: AsRef<Path>>(dir: P, timer: &mut Timer) -> Result<Self> {
        let dir = dir.as_ref();
        let stops = timed(timer, "load stops", || {
            stops::load(open_file(dir, "stops.txt")?)
        })?;
        let trips = timed(timer, "load trips", || {
            trips::load(open_file(dir, "trips.txt")?)
        })?;
        let stop_times = timed(timer, "load stop times", || {
            stop_times::load(open_file(dir, "stop_times.txt")?)
        })?;
        Self::assemble(stops, trips, stop_times)
    }

    /// Accepts either a zip archive or a directory of extracted files.
    pub fn load<P: AsRef<Path>>(path: P, timer: &mut Timer) -> Result<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            return Self::load_from_dir(path, timer);
        }
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let mut archive = ZipArchive::new(file)?;
        Self::load_from_zip(&mut archive, timer)
    }

    fn assemble(
        stops: BTreeMap<StopID, Stop>,
        mut trips: Vec<Trip>,
        mut stop_times: BTreeMap<TripID, Vec<StopTime>>,
    ) -> Result<Self> {
        for trip in &mut trips {
            trip.stop_times = match stop_times.remove(&trip.trip_id) {
                Some(list) => list,
                None => bail!("Trip {:?} has no stop times", trip.trip_id),
            };
        }

        if !stop_times.is_empty() {
            warn!(
                "Stop times defined for unknown trips: {:?}",
                stop_times.keys()
            );
        }

        Ok(Self { stops, trips })
    }
}

// Adds the path in the error message
pub fn get_zip_file<'a, R: std::io::Read + std::io::Seek>(
    archive: &'a mut ZipArchive<R>,
    path: &str,
) -> Result<zip::read::ZipFile<'a>> {
    archive
        .by_name(path)
        .map_err(|err| anyhow!("{path}: {err}"))
}

// Stops the timer even if loading fails
fn timed<T, F: FnOnce() -> Result<T>>(timer: &mut Timer, name: &str, f: F) -> Result<T> {
    timer.start(name);
    let result = f();
    timer.stop(name);
    result
}

fn open_file(dir: &Path, name: &str) -> Result<File> {
    let path = dir.join(name);
    File::open(&path).with_context(|| format!("opening {}", path.display()))
}
