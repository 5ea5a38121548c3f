#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Transport implementations for the characterization rig.
//!
//! `SerialTransport` (feature `serial`) talks to the real controller board;
//! `SimulatedLink` runs a first-order plant model behind the same seam for
//! tests and hardware-free dry runs.

pub mod error;
pub mod sim;

#[cfg(feature = "serial")]
pub mod serial;

pub use error::LinkError;
pub use sim::{SimMode, SimulatedLink};

#[cfg(feature = "serial")]
pub use serial::SerialTransport;
