use std::path::PathBuf;

use crate::{data::LatLng, filter::BoundingBox};

/// Run constants for an extraction.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding `routes.txt`, `trips.txt`, `stop_times.txt` and `stops.txt`.
    pub feed_dir: PathBuf,
    pub output_path: PathBuf,
    pub center: LatLng,
    pub half_height_km: f64,
    pub half_width_km: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_dir: PathBuf::from("google_transit"),
            output_path: PathBuf::from("stops.json"),
            // central Auckland
            center: LatLng::new(-36.8500, 174.8667),
            half_height_km: 5.0,
            half_width_km: 7.0,
        }
    }
}

impl Config {
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::around(self.center, self.half_height_km, self.half_width_km)
    }
}
