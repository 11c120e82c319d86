pub mod config;
pub mod error;
pub mod input;
pub mod interpolate;
pub mod prediction;

pub use config::ClientConfig;
pub use error::ClientError;
pub use input::InputProducer;
pub use interpolate::{CorrectionSmoother, SnapshotBuffer};
pub use prediction::{PredictedMover, ReconcileOutcome};
