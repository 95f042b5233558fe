use abstutil::Timer;
use blocks::{Config, Database};
use gtfs::Feed;
use rusqlite::params;
use tempfile::TempDir;

pub const STOPS: &str = "stop_id,stop_name,stop_lat,stop_lon
depot,Depot,45.50,-122.60
downtown,Downtown,45.52,-122.68
airport,Airport,45.58,-122.59
";

// Block 7 runs out and back three times on weekdays, listed out of order. Trip x3 has no block.
pub const TRIPS: &str = "route_id,service_id,trip_id,block_id
red,wkdy,r2,7
red,wkdy,r1,7
red,wkdy,r3,7
red,sat,s1,7
blue,wkdy,x3,
blue,wkdy,b1,9
blue,wkdy,b2,9
";

pub const STOP_TIMES: &str = "trip_id,arrival_time,departure_time,stop_id,stop_sequence
r1,06:00:00,06:00:00,depot,1
r1,06:30:00,06:30:00,downtown,2
r2,06:40:00,06:40:00,downtown,1
r2,07:10:00,07:10:00,depot,2
r3,24:10:00,24:10:00,depot,1
r3,24:40:00,24:40:00,airport,2
s1,09:00:00,09:00:00,depot,1
s1,09:30:00,09:30:00,downtown,2
x3,10:00:00,10:00:00,depot,1
x3,10:20:00,10:20:00,airport,2
b1,11:00:00,11:00:00,airport,1
b1,11:45:00,11:45:00,downtown,2
b2,12:00:00,12:00:00,downtown,1
b2,12:45:00,12:45:00,airport,2
";

/// A database in a temporary directory, loaded with the sample feed. Keep the TempDir alive for
/// as long as the database is used.
pub fn sample_db() -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let feed_dir = dir.path().join("feed");
    std::fs::create_dir(&feed_dir).unwrap();
    for (name, contents) in [
        ("stops.txt", STOPS),
        ("trips.txt", TRIPS),
        ("stop_times.txt", STOP_TIMES),
    ] {
        std::fs::write(feed_dir.join(name), contents).unwrap();
    }
    let feed = Feed::load(&feed_dir, &mut Timer::throwaway()).unwrap();

    let mut db = Database::open(dir.path().join("gtfs.db")).unwrap();
    db.import_feed(&feed, &mut Timer::throwaway()).unwrap();
    (dir, db)
}

pub fn insert_trip(
    db: &Database,
    trip_id: &str,
    block_id: Option<&str>,
    service_id: Option<&str>,
    start_time: f64,
    start_stop: &str,
    end_stop: &str,
) {
    db.connection()
        .execute(
            "INSERT INTO trips
             (trip_id, route_id, service_id, block_id, start_time, start_stop_id, end_stop_id)
             VALUES (?1, 'test', ?2, ?3, ?4, ?5, ?6)",
            params![trip_id, service_id, block_id, start_time, start_stop, end_stop],
        )
        .unwrap();
}

pub fn config(batch_size: usize) -> Config {
    Config { batch_size }
}
