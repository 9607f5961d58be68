//! Board-agnostic control engine for the PCR thermocycler
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (board, sensors, outputs, PID, collaborators)
//! - Program model (pooled steps and cycles, depth-first iteration)
//! - Resistance-to-temperature calibration lookup
//! - Dual-mode (bang-bang/PID) temperature control for plate and lid
//! - Run-time-remaining estimation
//! - Program state machine and the per-tick control loop
//! - Configuration and command types

#![no_std]
#![deny(unsafe_code)]

pub mod calibration;
pub mod command;
pub mod config;
pub mod control;
pub mod eta;
pub mod program;
pub mod state;
pub mod status;
pub mod thermocycler;
pub mod traits;

pub use thermocycler::{Parts, Thermocycler};
