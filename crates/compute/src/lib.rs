//! Physics and QA/QC computation for the WSE processing pipeline.
//!
//! This crate handles:
//! - Unit normalization and gauge pressure
//! - Hydrostatic depth and water surface elevation
//! - Logger-shift and temperature-exceedance flagging

pub mod physics;
pub mod qaqc;

pub use physics::{calculate, gauge_to_depth_m};
pub use qaqc::{flag, shift_exceedances, temperature_exceedances, TemperatureExceedanceRow};
