use chrono::NaiveTime;

use crate::data::{LatLng, Time};

const KM_PER_DEGREE_LAT: f64 = 110.574;
const KM_PER_DEGREE_LNG: f64 = 111.320;

/// An open interval of same-day times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: Time,
    pub end: Time,
}

impl TimeWindow {
    pub const MORNING: TimeWindow = TimeWindow {
        start: hms(6, 0, 0),
        end: hms(10, 0, 0),
    };

    pub fn contains(&self, time: Time) -> bool {
        time > self.start && time < self.end
    }
}

const fn hms(hour: u32, min: u32, sec: u32) -> NaiveTime {
    match NaiveTime::from_hms_opt(hour, min, sec) {
        Some(time) => time,
        None => panic!("invalid time of day"),
    }
}

/// A latitude/longitude rectangle. Points on an edge are outside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: LatLng,
    pub max: LatLng,
}

impl BoundingBox {
    pub fn new(min: LatLng, max: LatLng) -> Self {
        Self { min, max }
    }

    /// Box reaching `half_height_km` north and south and `half_width_km` east and
    /// west of `center`.
    ///
    /// The longitude scale takes the cosine of the center latitude as given, in
    /// degrees, not radians.
    pub fn around(center: LatLng, half_height_km: f64, half_width_km: f64) -> Self {
        let lat_delta = half_height_km / KM_PER_DEGREE_LAT;
        let lng_delta = half_width_km / KM_PER_DEGREE_LNG * center.lat.cos();

        Self {
            min: LatLng::new(center.lat - lat_delta, center.lng - lng_delta),
            max: LatLng::new(center.lat + lat_delta, center.lng + lng_delta),
        }
    }

    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat > self.min.lat
            && point.lat < self.max.lat
            && point.lng > self.min.lng
            && point.lng < self.max.lng
    }
}
