use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(u64);

impl RequestId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Where a request goes after finishing service at a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Destination {
    /// 1-based station number.
    Station(usize),
    Exit,
}

impl Destination {
    pub fn is_exit(&self) -> bool {
        matches!(self, Destination::Exit)
    }

    /// Station number, or -1 for the exit sentinel.
    pub fn code(&self) -> i64 {
        match self {
            Destination::Station(n) => *n as i64,
            Destination::Exit => -1,
        }
    }
}

/// One completed visit of a request to a station.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RequestId,
    /// 1-based station number.
    pub station: usize,
    pub arrival_date: f64,
    pub waiting_time: f64,
    pub service_start_date: f64,
    pub service_time: f64,
    pub service_end_date: f64,
    pub exit_date: f64,
    pub destination: Destination,
    pub server_id: usize,
    pub queue_size_at_arrival: usize,
    pub queue_size_at_departure: usize,
}

/// Flat CSV row of a [`Record`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordRow {
    pub id_number: u64,
    pub node: usize,
    pub arrival_date: f64,
    pub waiting_time: f64,
    pub service_start_date: f64,
    pub service_time: f64,
    pub service_end_date: f64,
    pub exit_date: f64,
    pub destination: i64,
    pub server_id: usize,
    pub queue_size_at_arrival: usize,
    pub queue_size_at_departure: usize,
}

impl From<&Record> for RecordRow {
    fn from(record: &Record) -> Self {
        Self {
            id_number: record.id.get(),
            node: record.station,
            arrival_date: record.arrival_date,
            waiting_time: record.waiting_time,
            service_start_date: record.service_start_date,
            service_time: record.service_time,
            service_end_date: record.service_end_date,
            exit_date: record.exit_date,
            destination: record.destination.code(),
            server_id: record.server_id,
            queue_size_at_arrival: record.queue_size_at_arrival,
            queue_size_at_departure: record.queue_size_at_departure,
        }
    }
}
