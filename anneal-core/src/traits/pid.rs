//! PID controller interface
//!
//! The control loop treats the PID as a black box with these operations.

use crate::config::{OutputLimits, Tuning};

/// PID operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PidMode {
    /// Output is left untouched by `compute`
    Manual,
    /// Output is computed every call
    Automatic,
}

/// A PID controller operating on degrees and drive units
pub trait PidLoop {
    /// Switch mode
    ///
    /// Switching from `Manual` to `Automatic` initializes the controller
    /// from the current input and output for a bumpless transfer.
    fn set_mode(&mut self, mode: PidMode, input: f32, output: f32);

    /// Current mode
    fn mode(&self) -> PidMode;

    /// Replace the gains
    fn set_tunings(&mut self, tuning: Tuning);

    /// Replace the output range
    fn set_output_limits(&mut self, limits: OutputLimits);

    /// Zero the accumulated integral term
    fn reset_integral(&mut self);

    /// Run one control step
    ///
    /// Returns `output` unchanged while in `Manual` mode.
    fn compute(&mut self, input: f32, setpoint: f32, output: f32) -> f32;
}
