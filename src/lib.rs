pub mod metrics;
pub mod network;
pub mod report;
pub mod simulation;

pub use metrics::Estimate;
pub use network::{Network, NetworkParams, build_network};
pub use report::{Report, ResultTable};
pub use simulation::{Estimator, Experiment, ModelConfig, Scenario};

pub mod prelude {
    pub use crate::metrics::Estimate;
    pub use crate::network::{Destination, Network, NetworkParams, Record, Station, build_network};
    pub use crate::report::{Chart, Report, ResultTable};
    pub use crate::simulation::{
        EventEngine, Estimator, Experiment, ModelConfig, PointEstimate, Scenario, TrialRunner,
    };
}
