#![deny(missing_docs)]
#![doc = "Core traits and data types for the replica-exchange coordinator."]

pub mod errors;
pub mod provenance;
pub mod rng;
mod state;

pub use errors::{ErrorInfo, RexError};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};
pub use state::{ControlParameter, EnergySample, Integrator, Microstate};
