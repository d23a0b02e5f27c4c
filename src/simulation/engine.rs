use crate::network::{Destination, Network, Record, RequestId};
use anyhow::{Result, bail};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use tracing::debug;

/// Produces the visit records of one seeded trial.
pub trait TrialRunner {
    fn run_trial(&self, network: &Network, seed: u64, horizon: f64) -> Result<Vec<Record>>;
}

/// Event-driven simulator of open networks of multi-server FIFO stations.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventEngine;

impl TrialRunner for EventEngine {
    fn run_trial(&self, network: &Network, seed: u64, horizon: f64) -> Result<Vec<Record>> {
        if !(horizon.is_finite() && horizon > 0.0) {
            bail!("simulation horizon must be positive, got {}", horizon);
        }
        let mut run = Run::new(network, seed);
        run.simulate_until(horizon);
        debug!(
            "Trial seed {} finished at t={:.3} with {} records ({} requests)",
            seed,
            run.clock,
            run.records.len(),
            run.next_id - 1
        );
        Ok(run.records)
    }
}

#[derive(Debug, Clone, Copy)]
enum EventKind {
    Arrival { station: usize },
    Completion { station: usize, server: usize },
}

#[derive(Debug)]
struct Event {
    time: f64,
    seq: u64, // tie-break for simultaneous events
    kind: EventKind,
}

// Min-heap on (time, seq)
impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Debug, Clone, Copy)]
struct Visit {
    id: RequestId,
    arrival_date: f64,
    queue_size_at_arrival: usize,
}

#[derive(Debug, Clone, Copy)]
struct InService {
    visit: Visit,
    service_start: f64,
    service_time: f64,
}

#[derive(Debug)]
struct StationState {
    queue: VecDeque<Visit>,
    servers: Vec<Option<InService>>,
}

impl StationState {
    fn occupancy(&self) -> usize {
        self.queue.len() + self.servers.iter().filter(|s| s.is_some()).count()
    }

    fn free_server(&self) -> Option<usize> {
        self.servers.iter().position(|s| s.is_none())
    }
}

struct Run<'a> {
    network: &'a Network,
    rng: StdRng,
    clock: f64,
    events: BinaryHeap<Event>,
    seq: u64,
    stations: Vec<StationState>,
    records: Vec<Record>,
    next_id: u64,
}

impl<'a> Run<'a> {
    fn new(network: &'a Network, seed: u64) -> Self {
        let stations = network
            .stations()
            .iter()
            .map(|spec| StationState {
                queue: VecDeque::new(),
                servers: vec![None; spec.servers],
            })
            .collect();

        let mut run = Self {
            network,
            rng: StdRng::seed_from_u64(seed),
            clock: 0.0,
            events: BinaryHeap::new(),
            seq: 0,
            stations,
            records: Vec::new(),
            next_id: 1,
        };

        for (station, spec) in network.stations().iter().enumerate() {
            let first = spec.arrival.sample(&mut run.rng);
            run.schedule(first, EventKind::Arrival { station });
        }
        run
    }

    fn schedule(&mut self, time: f64, kind: EventKind) {
        // Infinite times never fire
        if !time.is_finite() {
            return;
        }
        self.seq += 1;
        self.events.push(Event {
            time,
            seq: self.seq,
            kind,
        });
    }

    fn simulate_until(&mut self, horizon: f64) {
        while let Some(event) = self.events.peek() {
            if event.time >= horizon {
                break;
            }
            let Some(event) = self.events.pop() else {
                break;
            };
            self.clock = event.time;
            match event.kind {
                EventKind::Arrival { station } => self.external_arrival(station),
                EventKind::Completion { station, server } => self.complete(station, server),
            }
        }
    }

    fn external_arrival(&mut self, station: usize) {
        let id = RequestId::new(self.next_id);
        self.next_id += 1;
        self.enter(station, id);

        let gap = self.network.station(station).arrival.sample(&mut self.rng);
        self.schedule(self.clock + gap, EventKind::Arrival { station });
    }

    fn enter(&mut self, station: usize, id: RequestId) {
        let visit = Visit {
            id,
            arrival_date: self.clock,
            queue_size_at_arrival: self.stations[station].occupancy(),
        };
        match self.stations[station].free_server() {
            Some(server) => self.start_service(station, server, visit),
            None => self.stations[station].queue.push_back(visit),
        }
    }

    fn start_service(&mut self, station: usize, server: usize, visit: Visit) {
        let network = self.network;
        let service_time = network.station(station).service.sample(&mut self.rng);
        self.stations[station].servers[server] = Some(InService {
            visit,
            service_start: self.clock,
            service_time,
        });
        self.schedule(
            self.clock + service_time,
            EventKind::Completion { station, server },
        );
    }

    fn route(&mut self, station: usize) -> Destination {
        let network = self.network;
        let u: f64 = self.rng.r#gen();
        let mut cumulative = 0.0;
        for (next, p) in network.routing_row(station).iter().enumerate() {
            cumulative += p;
            if u < cumulative {
                return Destination::Station(next + 1);
            }
        }
        Destination::Exit
    }

    fn complete(&mut self, station: usize, server: usize) {
        let Some(done) = self.stations[station].servers[server].take() else {
            return;
        };
        let destination = self.route(station);

        if let Some(next) = self.stations[station].queue.pop_front() {
            self.start_service(station, server, next);
        }

        self.records.push(Record {
            id: done.visit.id,
            station: station + 1,
            arrival_date: done.visit.arrival_date,
            waiting_time: done.service_start - done.visit.arrival_date,
            service_start_date: done.service_start,
            service_time: done.service_time,
            service_end_date: self.clock,
            exit_date: self.clock,
            destination,
            server_id: server + 1,
            queue_size_at_arrival: done.visit.queue_size_at_arrival,
            queue_size_at_departure: self.stations[station].occupancy(),
        });

        if let Destination::Station(next) = destination {
            self.enter(next - 1, done.visit.id);
        }
    }
}
