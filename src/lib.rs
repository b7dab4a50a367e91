//! Extracts the morning trips of a schedule feed that run through a fixed area,
//! with their stop coordinates, distance and duration, for map rendering.

pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod filter;
pub mod geo;
pub mod gtfs;
pub mod timetable;
