use std::process::ExitCode;

use log::{error, info};

use morning_trips::{
    config::Config, error::FeedError, export, filter::TimeWindow, gtfs::Feed,
    timetable::Timetable,
};

fn run(config: &Config) -> Result<(), FeedError> {
    info!("Loading feed from {:?}", config.feed_dir);
    let feed = Feed::from_dir(&config.feed_dir)?;

    let timetable = Timetable::try_from(feed)?;
    info!("Done loading data");

    let bbox = config.bounding_box();
    info!("Keeping stops inside {:?}", bbox);

    let records = export::export(&timetable, &TimeWindow::MORNING, &bbox)?;
    export::write_records(&config.output_path, &records)
}

fn main() -> ExitCode {
    env_logger::init();

    match run(&Config::default()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
