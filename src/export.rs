use std::{collections::HashMap, fs, path::Path};

use chrono::Timelike;
use itertools::{Itertools, MinMaxResult};
use log::{debug, info};
use serde::Serialize;

use crate::{
    data::*,
    error::FeedError,
    filter::{BoundingBox, TimeWindow},
    geo,
    timetable::Timetable,
};

/// One trip as drawn on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputRecord {
    pub trip_id: String,
    /// Seconds since midnight of the trip's first stop time.
    pub start_time: u32,
    pub lat_lngs: Vec<LatLng>,
    /// Meters.
    pub total_distance_traveled: u32,
    /// Milliseconds between the first and last stop inside the box.
    pub total_time_taken: i64,
}

/// Summarizes the part of `trip` that lies inside `bbox`.
///
/// Returns `Ok(None)` when fewer than two stops of the trip are inside the box.
pub fn summarize_trip(
    trip: &Trip,
    stops: &HashMap<String, Stop>,
    bbox: &BoundingBox,
) -> Result<Option<OutputRecord>, FeedError> {
    let chronological = trip.chronological();

    let mut inside = Vec::with_capacity(chronological.len());
    for stop_time in &chronological {
        let stop = stops
            .get(&stop_time.stop_id)
            .ok_or_else(|| FeedError::UnknownStop {
                stop_id: stop_time.stop_id.clone(),
                trip_id: trip.id.clone(),
            })?;

        if bbox.contains(&stop.position) {
            inside.push((stop_time.time, stop.position));
        }
    }

    let (first, last) = match inside.iter().map(|&(time, _)| time).minmax() {
        MinMaxResult::MinMax(first, last) => (first, last),
        MinMaxResult::NoElements | MinMaxResult::OneElement(_) => {
            debug!(
                "Dropping Trip {:?}: {} stops inside the box",
                trip.id,
                inside.len()
            );
            return Ok(None);
        }
    };

    let Some(start) = trip.first_stop_time() else {
        return Ok(None);
    };

    let lat_lngs: Vec<LatLng> = inside.into_iter().map(|(_, position)| position).collect();
    let distance_km = geo::path_length_km(&lat_lngs);

    Ok(Some(OutputRecord {
        trip_id: trip.id.clone(),
        start_time: start.time.num_seconds_from_midnight(),
        total_distance_traveled: (distance_km * 1000.0) as u32,
        total_time_taken: (last - first).num_milliseconds(),
        lat_lngs,
    }))
}

/// Builds one record per trip that runs inside `window` and has at least two stops
/// inside `bbox`, in route then trip feed order.
pub fn export(
    timetable: &Timetable,
    window: &TimeWindow,
    bbox: &BoundingBox,
) -> Result<Vec<OutputRecord>, FeedError> {
    let mut records = Vec::new();
    for route in &timetable.routes {
        for trip in route.trips_within(window) {
            if let Some(record) = summarize_trip(trip, &timetable.stops, bbox)? {
                records.push(record);
            }
        }
    }

    info!("Exported {} trips", records.len());
    Ok(records)
}

/// Replaces the contents of `path` with `records` as a JSON array.
pub fn write_records(path: &Path, records: &[OutputRecord]) -> Result<(), FeedError> {
    let json = serde_json::to_string(records)?;
    fs::write(path, json).map_err(|source| FeedError::Write {
        path: path.to_owned(),
        source,
    })?;

    info!("Wrote {} records to {:?}", records.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::NaiveTime;

    use super::*;
    use crate::gtfs::Feed;

    const ROUTES: &str = "agency_id,route_color,route_desc,route_long_name,route_id,route_type,route_short_name
AT,,,\"Britomart, Onehunga\",R1,3,25B
";

    const TRIPS: &str = "block_id,route_id,direction_id,trip_headsign,shape_id,service_id,trip_id
,R1,0,Onehunga,SH1,WEEKDAY,T1
,R1,0,Onehunga,SH1,WEEKDAY,T2
";

    const STOP_TIMES: &str = "trip_id,arrival_time,departure_time,stop_id,stop_sequence
T1,06:30:00,06:30:00,S1,1
T1,07:00:00,07:00:00,S2,2
T1,11:00:00,11:00:00,S3,3
T1,24:10:00,24:10:00,S4,4
T2,11:00:00,11:00:00,S1,1
T2,11:30:00,11:30:00,S2,2
";

    const STOPS: &str = "stop_lat,zone_id,stop_lon,stop_id,stop_name
-36.8500,,174.8667,S1,\"Stop, one\"
-36.8400,,174.8700,S2,Two
-36.8600,,174.8600,S3,Three
-36.8450,,174.8650,S4,Four
";

    fn timetable() -> Timetable {
        let feed = Feed::from_readers(
            ROUTES.as_bytes(),
            TRIPS.as_bytes(),
            STOP_TIMES.as_bytes(),
            STOPS.as_bytes(),
        )
        .unwrap();
        Timetable::try_from(feed).unwrap()
    }

    fn bbox() -> BoundingBox {
        BoundingBox::around(LatLng::new(-36.85, 174.8667), 5.0, 7.0)
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn morning_trip_is_exported_end_to_end() {
        let records = export(&timetable(), &TimeWindow::MORNING, &bbox()).unwrap();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        let s1 = LatLng::new(-36.85, 174.8667);
        let s2 = LatLng::new(-36.84, 174.87);
        let s3 = LatLng::new(-36.86, 174.86);

        assert_eq!(record.trip_id, "T1");
        assert_eq!(record.lat_lngs, vec![s1, s2, s3]);
        assert_eq!(record.start_time, 23_400);
        assert_eq!(
            record.total_distance_traveled,
            ((geo::haversine_km(&s1, &s2) + geo::haversine_km(&s2, &s3)) * 1000.0) as u32
        );
        assert_eq!(record.total_time_taken, 16_200_000);
    }

    #[test]
    fn rollover_stop_never_reaches_output() {
        let timetable = timetable();
        let trip = &timetable.routes[0].trips[0];
        assert_eq!(trip.stop_times.len(), 3);
        assert!(trip.stop_times.iter().all(|st| st.stop_id != "S4"));
    }

    #[test]
    fn trip_outside_window_is_skipped() {
        let records = export(&timetable(), &TimeWindow::MORNING, &bbox()).unwrap();
        assert!(records.iter().all(|record| record.trip_id != "T2"));
    }

    fn trip(stop_times: &[(&str, NaiveTime)]) -> Trip {
        let mut trip = Trip::new("T1".to_owned(), "R1".to_owned());
        trip.stop_times = stop_times
            .iter()
            .map(|&(stop_id, time)| StopTime {
                trip_id: "T1".to_owned(),
                stop_id: stop_id.to_owned(),
                time,
            })
            .collect();
        trip
    }

    fn stops(entries: &[(&str, f64, f64)]) -> HashMap<String, Stop> {
        entries
            .iter()
            .map(|&(id, lat, lng)| {
                (
                    id.to_owned(),
                    Stop {
                        id: id.to_owned(),
                        position: LatLng::new(lat, lng),
                    },
                )
            })
            .collect()
    }

    fn unit_box() -> BoundingBox {
        BoundingBox::new(LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0))
    }

    #[test]
    fn start_time_comes_from_first_stop_even_outside_box() {
        let stops = stops(&[("OUT", 5.0, 5.0), ("A", 0.2, 0.2), ("B", 0.4, 0.4)]);
        let trip = trip(&[("B", at(7, 30)), ("OUT", at(6, 15)), ("A", at(7, 0))]);

        let record = summarize_trip(&trip, &stops, &unit_box()).unwrap().unwrap();
        assert_eq!(record.start_time, 6 * 3600 + 15 * 60);
        assert_eq!(
            record.lat_lngs,
            vec![LatLng::new(0.2, 0.2), LatLng::new(0.4, 0.4)]
        );
        assert_eq!(record.total_time_taken, 30 * 60 * 1000);
    }

    #[test]
    fn fewer_than_two_stops_inside_drops_trip() {
        let stops = stops(&[("OUT", 5.0, 5.0), ("A", 0.2, 0.2), ("EDGE", 1.0, 0.5)]);
        let trip = trip(&[("OUT", at(6, 15)), ("A", at(7, 0)), ("EDGE", at(7, 10))]);
        assert_eq!(summarize_trip(&trip, &stops, &unit_box()).unwrap(), None);
    }

    #[test]
    fn unknown_stop_fails() {
        let stops = stops(&[("A", 0.2, 0.2)]);
        let trip = trip(&[("A", at(7, 0)), ("GONE", at(7, 5))]);
        let err = summarize_trip(&trip, &stops, &unit_box()).unwrap_err();
        assert!(matches!(err, FeedError::UnknownStop { stop_id, .. } if stop_id == "GONE"));
    }

    #[test]
    fn every_record_has_at_least_two_points() {
        let stops = stops(&[("A", 0.2, 0.2), ("B", 0.3, 0.3), ("OUT", 2.0, 2.0)]);
        let timetable = Timetable {
            routes: vec![Route {
                id: "R1".to_owned(),
                short_name: "1".to_owned(),
                trips: vec![
                    trip(&[("A", at(7, 0)), ("B", at(7, 5))]),
                    trip(&[("A", at(7, 0)), ("OUT", at(7, 5))]),
                    trip(&[("OUT", at(8, 0))]),
                ],
            }],
            stops,
        };

        let records = export(&timetable, &TimeWindow::MORNING, &unit_box()).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records.iter().all(|record| record.lat_lngs.len() >= 2));
        assert_abs_diff_eq!(
            records[0].total_distance_traveled as f64,
            geo::haversine_km(&LatLng::new(0.2, 0.2), &LatLng::new(0.3, 0.3)) * 1000.0,
            epsilon = 1.0
        );
    }

    #[test]
    fn json_keeps_map_field_names() {
        let record = OutputRecord {
            trip_id: "T1".to_owned(),
            start_time: 23_400,
            lat_lngs: vec![LatLng::new(-36.85, 174.8667)],
            total_distance_traveled: 1520,
            total_time_taken: 1_800_000,
        };

        let json = serde_json::to_value([record]).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "TripId": "T1",
                "StartTime": 23400,
                "LatLngs": [{ "Lat": -36.85, "Lng": 174.8667 }],
                "TotalDistanceTraveled": 1520,
                "TotalTimeTaken": 1800000
            }])
        );
    }

    #[test]
    fn write_replaces_existing_file() {
        let path = std::env::temp_dir().join(format!("morning-trips-{}.json", std::process::id()));
        fs::write(&path, "stale contents that are longer than the output").unwrap();

        write_records(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");

        fs::remove_file(&path).unwrap();
    }
}
