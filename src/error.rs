use std::{io, path::PathBuf};

use thiserror::Error;

use crate::gtfs::Table;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Could not read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Could not write {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("Malformed delimited record: {0}")]
    Csv(#[from] csv::Error),

    #[error("{table} line {line}: no field at position {index}")]
    MissingField { table: Table, line: u64, index: usize },

    #[error("{table} line {line}: {value:?} is not a coordinate")]
    InvalidCoordinate {
        table: Table,
        line: u64,
        value: String,
    },

    #[error("{table} line {line}: {value:?} is not a time of day")]
    InvalidTime {
        table: Table,
        line: u64,
        value: String,
    },

    #[error("No such Route {route_id:?} for Trip {trip_id:?}")]
    UnknownRoute { route_id: String, trip_id: String },

    #[error("Route {route_id:?} for Trip {trip_id:?} is defined {count} times")]
    AmbiguousRoute {
        route_id: String,
        trip_id: String,
        count: usize,
    },

    #[error("No such Trip {trip_id:?} for a stop time at Stop {stop_id:?}")]
    UnknownTrip { trip_id: String, stop_id: String },

    #[error("Trip {0:?} is defined more than once")]
    DuplicateTrip(String),

    #[error("Stop {0:?} is defined more than once")]
    DuplicateStop(String),

    #[error("No such Stop {stop_id:?} on Trip {trip_id:?}")]
    UnknownStop { stop_id: String, trip_id: String },

    #[error("Could not serialize output: {0}")]
    Json(#[from] serde_json::Error),
}
