use std::collections::{hash_map::Entry, HashMap};

use itertools::Itertools;
use log::info;

use crate::{
    data::*,
    error::FeedError,
    gtfs::{self, RouteRow, StopRow, StopTimeRow, TripRow},
};

/// Position of a trip inside the route list: `routes[route].trips[trip]`.
pub type TripIndex = HashMap<String, (usize, usize)>;

/// The joined schedule. Routes and their trips keep feed order.
#[derive(Debug)]
pub struct Timetable {
    pub routes: Vec<Route>,
    pub stops: HashMap<String, Stop>,
}

pub fn load_routes(rows: Vec<RouteRow>) -> Vec<Route> {
    rows.into_iter()
        .map(|row| Route {
            id: row.route_id,
            short_name: row.route_short_name,
            trips: Vec::default(),
        })
        .collect()
}

/// Attaches every trip to the single route carrying its route id.
pub fn attach_trips(routes: &mut [Route], rows: Vec<TripRow>) -> Result<TripIndex, FeedError> {
    let routes_by_id = routes
        .iter()
        .enumerate()
        .map(|(position, route)| (route.id.clone(), position))
        .into_group_map();

    let mut index = TripIndex::with_capacity(rows.len());
    for row in rows {
        let route_position = match routes_by_id.get(&row.route_id).map(Vec::as_slice) {
            Some([position]) => *position,
            Some(positions) => {
                return Err(FeedError::AmbiguousRoute {
                    route_id: row.route_id,
                    trip_id: row.trip_id,
                    count: positions.len(),
                })
            }
            None => {
                return Err(FeedError::UnknownRoute {
                    route_id: row.route_id,
                    trip_id: row.trip_id,
                })
            }
        };

        let trips = &mut routes[route_position].trips;
        match index.entry(row.trip_id.clone()) {
            Entry::Occupied(_) => return Err(FeedError::DuplicateTrip(row.trip_id)),
            Entry::Vacant(entry) => {
                entry.insert((route_position, trips.len()));
            }
        }
        trips.push(Trip::new(row.trip_id, row.route_id));
    }

    Ok(index)
}

pub fn attach_stop_times(
    routes: &mut [Route],
    index: &TripIndex,
    rows: Vec<StopTimeRow>,
) -> Result<(), FeedError> {
    for row in rows {
        let &(route, trip) = index.get(&row.trip_id).ok_or_else(|| FeedError::UnknownTrip {
            trip_id: row.trip_id.clone(),
            stop_id: row.stop_id.clone(),
        })?;

        routes[route].trips[trip].stop_times.push(StopTime {
            trip_id: row.trip_id,
            stop_id: row.stop_id,
            time: row.time,
        });
    }

    Ok(())
}

pub fn load_stops(rows: Vec<StopRow>) -> Result<HashMap<String, Stop>, FeedError> {
    let mut stops = HashMap::with_capacity(rows.len());
    for row in rows {
        match stops.entry(row.stop_id) {
            Entry::Occupied(entry) => return Err(FeedError::DuplicateStop(entry.key().clone())),
            Entry::Vacant(entry) => {
                let id = entry.key().clone();
                entry.insert(Stop {
                    id,
                    position: LatLng::new(row.stop_lat, row.stop_lng),
                });
            }
        }
    }

    Ok(stops)
}

impl TryFrom<gtfs::Feed> for Timetable {
    type Error = FeedError;

    fn try_from(feed: gtfs::Feed) -> Result<Self, Self::Error> {
        let mut routes = load_routes(feed.routes);
        let index = attach_trips(&mut routes, feed.trips)?;
        attach_stop_times(&mut routes, &index, feed.stop_times)?;
        let stops = load_stops(feed.stops)?;

        info!(
            "Timetable holds {} routes, {} trips and {} stops",
            routes.len(),
            index.len(),
            stops.len()
        );

        Ok(Self { routes, stops })
    }
}
