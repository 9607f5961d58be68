//! Operator commands applied to the control loop

use heapless::String;

use crate::program::{CycleId, ProgramTree};

/// Maximum program name length
pub const MAX_NAME_LEN: usize = 20;

/// Reasons a start request is refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartError {
    /// No program is loaded
    NoProgram,
    /// Device power is absent
    NoPower,
}

/// Program and run parameters carried by a start command
#[derive(Debug, Clone)]
pub struct StartCommand {
    /// Program to run
    pub program: ProgramTree,
    /// Cycle used for progress reporting; chosen automatically when `None`
    pub display_cycle: Option<CycleId>,
    /// Program name shown on the display
    pub name: String<MAX_NAME_LEN>,
    /// Heated lid target in °C
    pub lid_temp_c: f32,
}

/// Command injected by the serial link or startup recovery
#[derive(Debug, Clone)]
pub enum Command {
    /// Load a program and start it
    Start(StartCommand),
    /// Stop the running program
    Stop,
    /// Set and persist display contrast
    Config { contrast: u8 },
}
