use chrono::NaiveTime;
use itertools::Itertools;
use serde::Serialize;

use crate::filter::TimeWindow;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub id: String,
    pub position: LatLng,
}

pub type Time = NaiveTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopTime {
    pub trip_id: String,
    pub stop_id: String,
    pub time: Time,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    pub id: String,
    pub route_id: String,
    pub stop_times: Vec<StopTime>,
}

impl Trip {
    pub fn new(id: String, route_id: String) -> Self {
        Self {
            id,
            route_id,
            stop_times: Vec::default(),
        }
    }

    /// Stop times ordered by time of day. Ties keep feed order.
    pub fn chronological(&self) -> Vec<&StopTime> {
        self.stop_times
            .iter()
            .sorted_by_key(|stop_time| stop_time.time)
            .collect()
    }

    pub fn first_stop_time(&self) -> Option<&StopTime> {
        self.stop_times.iter().min_by_key(|stop_time| stop_time.time)
    }

    pub fn runs_within(&self, window: &TimeWindow) -> bool {
        self.stop_times
            .iter()
            .any(|stop_time| window.contains(stop_time.time))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub id: String,
    pub short_name: String,
    pub trips: Vec<Trip>,
}

impl Route {
    pub fn trips_within<'a>(&'a self, window: &'a TimeWindow) -> impl Iterator<Item = &'a Trip> {
        self.trips.iter().filter(move |trip| trip.runs_within(window))
    }
}
