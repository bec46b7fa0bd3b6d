#![deny(missing_docs)]
#![doc = "Core error taxonomy, schema descriptors and seeding rules shared by the colord sweep crates."]

pub mod errors;
pub mod provenance;
pub mod rng;

pub use errors::{ErrorInfo, SweepError};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, unit_seed, RngHandle};
