/// metserver_rs
/// Weather-station snapshot server: periodic sensor sampling over
/// serial / relay / multicast transports, served to TCP clients.
pub mod config;
pub mod error;
pub mod logging;
pub mod reading;
pub mod sampler;
pub mod scheduler;
pub mod server;
pub mod snapshot;
pub mod transport;

pub mod prelude {
    pub use crate::config::{ConfigLoader, MetServerConfig, SourceMode};
    pub use crate::reading::{MetReading, Reading, WindReading};
    pub use crate::sampler::Sampler;
    pub use crate::scheduler::RefreshScheduler;
    pub use crate::server::MetServer;
    pub use crate::snapshot::SnapshotStore;
}
