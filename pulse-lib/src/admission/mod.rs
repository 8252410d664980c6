//! Per-domain admission control.
//!
//! Every domain gets exactly one [`AdmissionGate`], which bounds the number
//! of probes in flight against that domain. The gates are created once at
//! startup and collected in an [`AdmissionGates`] table, which is read-only
//! afterwards and can be shared between probe tasks without locking.
//!
//! - [`AdmissionGate`]: counting permit pool for one domain
//! - [`GatePermit`]: a held permit, released when dropped
//! - [`AdmissionGates`]: the domain → gate table

mod gate;
mod pool;

pub use gate::{AdmissionGate, DEFAULT_MAX_CONCURRENCY_PER_DOMAIN, GatePermit};
pub use pool::AdmissionGates;
