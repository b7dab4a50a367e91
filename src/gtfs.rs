use std::{fmt, fs, io, path::Path};

use chrono::NaiveTime;
use csv::StringRecord;
use log::{debug, info};

use crate::error::FeedError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Routes,
    Trips,
    StopTimes,
    Stops,
}

impl Table {
    pub fn file_name(&self) -> &'static str {
        match self {
            Table::Routes => "routes.txt",
            Table::Trips => "trips.txt",
            Table::StopTimes => "stop_times.txt",
            Table::Stops => "stops.txt",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

// Field positions are fixed by the feed layout, not looked up from the header.
const ROUTE_ID: usize = 4;
const ROUTE_SHORT_NAME: usize = 6;

const TRIP_ROUTE_ID: usize = 1;
const TRIP_ID: usize = 6;

const STOP_TIME_TRIP_ID: usize = 0;
const STOP_TIME_TIME: usize = 2;
const STOP_TIME_STOP_ID: usize = 3;

const STOP_LAT: usize = 0;
const STOP_LNG: usize = 2;
const STOP_ID: usize = 3;

const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%I:%M:%S %p"];

/// Splits a whole table into records, discarding the header row.
///
/// Commas inside double quotes do not split a field, and the enclosing quotes are
/// stripped from the value. Rows may have differing widths; positions are checked
/// when the row is read.
pub fn read_records<R: io::Read>(reader: R) -> Result<Vec<StringRecord>, FeedError> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader)
        .into_records()
        .map(|record| record.map_err(FeedError::from))
        .collect()
}

fn line(record: &StringRecord) -> u64 {
    record
        .position()
        .map(|position| position.line())
        .unwrap_or_default()
}

fn field(record: &StringRecord, table: Table, index: usize) -> Result<&str, FeedError> {
    record.get(index).ok_or_else(|| FeedError::MissingField {
        table,
        line: line(record),
        index,
    })
}

fn coordinate(record: &StringRecord, table: Table, index: usize) -> Result<f64, FeedError> {
    let value = field(record, table, index)?;
    value
        .trim()
        .parse()
        .map_err(|_| FeedError::InvalidCoordinate {
            table,
            line: line(record),
            value: value.to_owned(),
        })
}

/// Parses a same-day time of day. Times at or past 24:00:00 belong to the next
/// service day and come back as `None`.
pub fn parse_time_of_day(value: &str) -> Option<Option<NaiveTime>> {
    let value = value.trim();
    let hour: u32 = value.split(':').next()?.trim().parse().ok()?;
    if hour > 23 {
        return Some(None);
    }

    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(value, format).ok())
        .map(Some)
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteRow {
    pub route_id: String,
    pub route_short_name: String,
}

impl TryFrom<&StringRecord> for RouteRow {
    type Error = FeedError;

    fn try_from(record: &StringRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            route_id: field(record, Table::Routes, ROUTE_ID)?.to_owned(),
            route_short_name: field(record, Table::Routes, ROUTE_SHORT_NAME)?.to_owned(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripRow {
    pub route_id: String,
    pub trip_id: String,
}

impl TryFrom<&StringRecord> for TripRow {
    type Error = FeedError;

    fn try_from(record: &StringRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            route_id: field(record, Table::Trips, TRIP_ROUTE_ID)?.to_owned(),
            trip_id: field(record, Table::Trips, TRIP_ID)?.to_owned(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StopTimeRow {
    pub trip_id: String,
    pub stop_id: String,
    pub time: NaiveTime,
}

impl StopTimeRow {
    /// Reads one stop time row. Rows that roll past midnight are skipped with `Ok(None)`.
    pub fn from_record(record: &StringRecord) -> Result<Option<Self>, FeedError> {
        let raw_time = field(record, Table::StopTimes, STOP_TIME_TIME)?;
        let time = parse_time_of_day(raw_time).ok_or_else(|| FeedError::InvalidTime {
            table: Table::StopTimes,
            line: line(record),
            value: raw_time.to_owned(),
        })?;

        let Some(time) = time else {
            return Ok(None);
        };

        Ok(Some(Self {
            trip_id: field(record, Table::StopTimes, STOP_TIME_TRIP_ID)?.to_owned(),
            stop_id: field(record, Table::StopTimes, STOP_TIME_STOP_ID)?.to_owned(),
            time,
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StopRow {
    pub stop_id: String,
    pub stop_lat: f64,
    pub stop_lng: f64,
}

impl TryFrom<&StringRecord> for StopRow {
    type Error = FeedError;

    fn try_from(record: &StringRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            stop_id: field(record, Table::Stops, STOP_ID)?.to_owned(),
            stop_lat: coordinate(record, Table::Stops, STOP_LAT)?,
            stop_lng: coordinate(record, Table::Stops, STOP_LNG)?,
        })
    }
}

fn read_rows<R, T>(reader: R) -> Result<Vec<T>, FeedError>
where
    R: io::Read,
    T: for<'a> TryFrom<&'a StringRecord, Error = FeedError>,
{
    read_records(reader)?.iter().map(T::try_from).collect()
}

/// The four raw tables of a schedule feed, before any joining.
#[derive(Debug)]
pub struct Feed {
    pub routes: Vec<RouteRow>,
    pub trips: Vec<TripRow>,
    pub stop_times: Vec<StopTimeRow>,
    pub stops: Vec<StopRow>,
}

impl Feed {
    pub fn from_readers<R: io::Read>(
        routes: R,
        trips: R,
        stop_times: R,
        stops: R,
    ) -> Result<Self, FeedError> {
        let routes = read_rows::<_, RouteRow>(routes)?;
        info!("Read {} routes", routes.len());

        let trips = read_rows::<_, TripRow>(trips)?;
        info!("Read {} trips", trips.len());

        let records = read_records(stop_times)?;
        let total = records.len();
        let stop_times = records
            .iter()
            .filter_map(|record| StopTimeRow::from_record(record).transpose())
            .collect::<Result<Vec<_>, _>>()?;
        info!("Read {} stop times", stop_times.len());
        debug!(
            "Skipped {} stop times past the end of the service day",
            total - stop_times.len()
        );

        let stops = read_rows::<_, StopRow>(stops)?;
        info!("Read {} stops", stops.len());

        Ok(Self {
            routes,
            trips,
            stop_times,
            stops,
        })
    }

    /// Reads the feed tables from `dir`, each file fully into memory.
    pub fn from_dir(dir: &Path) -> Result<Self, FeedError> {
        let read = |table: Table| {
            let path = dir.join(table.file_name());
            debug!("Reading {:?}", path);
            fs::read(&path).map_err(|source| FeedError::Read { path, source })
        };

        Self::from_readers(
            io::Cursor::new(read(Table::Routes)?),
            io::Cursor::new(read(Table::Trips)?),
            io::Cursor::new(read(Table::StopTimes)?),
            io::Cursor::new(read(Table::Stops)?),
        )
    }
}
