pub mod analyzer;
pub mod logger;

use crate::network::{Record, RequestId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sojourn time estimate: a sample mean with its confidence bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub lower: f64,
    pub mean: f64,
    pub upper: f64,
}

impl Estimate {
    pub fn new(lower: f64, mean: f64, upper: f64) -> Self {
        Self { lower, mean, upper }
    }

    pub fn centered(mean: f64, half_width: f64) -> Self {
        Self::new(mean - half_width, mean, mean + half_width)
    }

    pub fn half_width(&self) -> f64 {
        (self.upper - self.lower) / 2.0
    }

    pub fn is_ordered(&self) -> bool {
        self.lower <= self.mean && self.mean <= self.upper
    }

    pub fn is_finite(&self) -> bool {
        self.lower.is_finite() && self.mean.is_finite() && self.upper.is_finite()
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.lower, self.mean, self.upper]
    }
}

impl From<[f64; 3]> for Estimate {
    fn from([lower, mean, upper]: [f64; 3]) -> Self {
        Self::new(lower, mean, upper)
    }
}

/// Sojourn times of requests that entered at the first station inside the open
/// `(start, end)` window and left the system before the run stopped.
///
/// Arrivals are indexed by request id first, then each exit record is looked up once.
pub fn sojourn_times(records: &[Record], window: (f64, f64)) -> Vec<f64> {
    let (start, end) = window;
    let arrivals: HashMap<RequestId, f64> = records
        .iter()
        .filter(|r| r.station == 1 && r.arrival_date > start && r.arrival_date < end)
        .map(|r| (r.id, r.arrival_date))
        .collect();

    records
        .iter()
        .filter(|r| r.destination.is_exit())
        .filter_map(|r| arrivals.get(&r.id).map(|arrived| r.service_end_date - arrived))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Destination;

    fn record(id: u64, station: usize, arrival: f64, end: f64, destination: Destination) -> Record {
        Record {
            id: RequestId::new(id),
            station,
            arrival_date: arrival,
            waiting_time: 0.0,
            service_start_date: arrival,
            service_time: end - arrival,
            service_end_date: end,
            exit_date: end,
            destination,
            server_id: 1,
            queue_size_at_arrival: 0,
            queue_size_at_departure: 0,
        }
    }

    #[test]
    fn matches_arrival_and_exit_by_id() {
        let records = vec![
            record(1, 1, 11.0, 11.5, Destination::Station(2)),
            record(2, 1, 12.0, 12.5, Destination::Station(2)),
            record(1, 2, 11.5, 13.0, Destination::Exit),
            record(2, 2, 12.5, 12.75, Destination::Exit),
        ];
        let times = sojourn_times(&records, (10.0, 50.0));
        assert_eq!(times, vec![2.0, 0.75]);
    }

    #[test]
    fn window_bounds_are_exclusive() {
        let records = vec![
            record(1, 1, 10.0, 10.5, Destination::Exit),
            record(2, 1, 50.0, 50.5, Destination::Exit),
            record(3, 1, 9.0, 11.0, Destination::Exit),
            record(4, 1, 10.25, 10.5, Destination::Exit),
        ];
        assert_eq!(sojourn_times(&records, (10.0, 50.0)), vec![0.25]);
    }

    #[test]
    fn unfinished_requests_are_ignored() {
        let records = vec![record(1, 1, 20.0, 20.5, Destination::Station(2))];
        assert!(sojourn_times(&records, (10.0, 50.0)).is_empty());
    }

    #[test]
    fn estimate_helpers() {
        let estimate = Estimate::centered(2.0, 0.5);
        assert_eq!(estimate.to_array(), [1.5, 2.0, 2.5]);
        assert_eq!(estimate.half_width(), 0.5);
        assert!(estimate.is_ordered());
        assert!(!Estimate::new(3.0, 2.0, 1.0).is_ordered());
        assert_eq!(Estimate::from([1.0, 2.0, 3.0]), Estimate::new(1.0, 2.0, 3.0));
    }
}
