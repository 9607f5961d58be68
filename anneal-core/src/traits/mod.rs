//! Hardware and collaborator abstraction traits
//!
//! These traits define the interface between the control engine and
//! hardware-specific or I/O implementations.

pub mod board;
pub mod display;
pub mod heater;
pub mod link;
pub mod pid;
pub mod storage;

pub use board::{Board, PowerSense};
pub use display::StatusDisplay;
pub use heater::{LidOutput, PlateOutput, SensorError, TemperatureSensor, ThermalDirection};
pub use link::CommandSource;
pub use pid::{PidLoop, PidMode};
pub use storage::ProgramStore;
