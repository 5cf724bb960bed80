//! Services layer (ports + adapters).
//!
//! - `ports`: pure contracts/types used across the engine.
//! - `adapters`: OS specific implementations (IO).

pub mod adapters;
pub mod ports;
