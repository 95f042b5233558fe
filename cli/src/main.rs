#[macro_use]
extern crate log;

use abstutil::Timer;
use anyhow::Result;
use structopt::StructOpt;

use blocks::{Config, Database};
use gtfs::Feed;

#[derive(StructOpt)]
#[structopt(name = "gtfsdb", about = "Loads a GTFS feed into SQLite and derives vehicle blocks")]
struct Args {
    /// The path to the SQLite database. It's created if needed.
    #[structopt(long, default_value = "gtfs.db")]
    database: String,
    /// A JSON config file
    #[structopt(long)]
    config: Option<String>,
    /// Overrides batch_size from the config
    #[structopt(long)]
    batch_size: Option<usize>,
    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(StructOpt)]
enum Command {
    /// Import a feed, then derive blocks from its trips
    Load {
        /// A GTFS zip file or a directory of extracted files
        #[structopt(long)]
        feed: String,
        /// Delete everything already in the database first
        #[structopt(long)]
        reload: bool,
    },
    /// Derive blocks from trips already in the database
    Populate {
        /// Delete existing blocks first. Otherwise they'll be duplicated.
        #[structopt(long)]
        clear: bool,
    },
    /// Print the stops where blocks start or end
    Stops {
        #[structopt(long, conflicts_with = "end")]
        start: bool,
        #[structopt(long)]
        end: bool,
    },
    /// Print every block as a line of JSON
    Dump,
}

impl Args {
    fn config(&self) -> Result<Config> {
        let mut config = match self.config {
            Some(ref path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    abstutil::logger::setup();

    let args = Args::from_iter(abstutil::cli_args());
    let config = args.config()?;
    let mut db = Database::open(&args.database)?;
    let mut timer = Timer::new("gtfsdb");

    match args.cmd {
        Command::Load { feed: path, reload } => {
            if reload {
                db.clear_feed()?;
            }
            let feed = Feed::load(&path, &mut timer)?;
            db.import_feed(&feed, &mut timer)?;
            db.populate_blocks(&config, &mut timer)?;
        }
        Command::Populate { clear } => {
            if clear {
                db.clear_blocks()?;
            }
            let summary = db.populate_blocks(&config, &mut timer)?;
            println!(
                "{} blocks in {} groups, {} trips skipped",
                summary.blocks, summary.groups, summary.skipped_trips
            );
        }
        Command::Stops { start, end } => {
            let ids = if start {
                db.start_stop_ids()?
            } else if end {
                db.end_stop_ids()?
            } else {
                db.unique_stop_ids()?
            };
            for id in ids {
                println!("{id}");
            }
        }
        Command::Dump => {
            for block in db.blocks()? {
                println!("{}", serde_json::to_string(&block)?);
            }
        }
    }
    info!("Done with {}", db.path().display());
    Ok(())
}
