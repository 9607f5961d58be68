//! Single-axis bang-bang/PID controller

use micromath::F32Ext;

use crate::config::{OutputLimits, Tuning};
use crate::traits::{PidLoop, PidMode};

/// Control strategy of one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControlMode {
    /// Full drive toward the target
    #[default]
    BangBang,
    /// Closed-loop PID drive
    Pid,
}

/// Strategy for a target/measurement gap
pub fn select_mode(target: f32, measured: f32, threshold: f32) -> ControlMode {
    if (target - measured).abs() >= threshold {
        ControlMode::BangBang
    } else {
        ControlMode::Pid
    }
}

/// Full drive toward the target: maximum if below it, minimum otherwise
pub fn bang_bang_drive(target: f32, measured: f32, limits: OutputLimits) -> f32 {
    if target > measured {
        limits.max
    } else {
        limits.min
    }
}

/// Dual-mode controller for one thermal axis
pub struct AxisController<P> {
    pid: P,
    mode: ControlMode,
    threshold: f32,
    limits: OutputLimits,
    drive: f32,
}

impl<P: PidLoop> AxisController<P> {
    /// Create a controller, configuring the PID's limits and gains
    pub fn new(mut pid: P, limits: OutputLimits, threshold: f32, tuning: Tuning) -> Self {
        pid.set_output_limits(limits);
        pid.set_tunings(tuning);
        Self {
            pid,
            mode: ControlMode::BangBang,
            threshold,
            limits,
            drive: 0.0,
        }
    }

    /// Pick the strategy for a newly assigned target
    pub fn retarget(&mut self, target: f32, measured: f32) {
        self.mode = select_mode(target, measured, self.threshold);
        let pid_mode = match self.mode {
            ControlMode::BangBang => PidMode::Manual,
            ControlMode::Pid => PidMode::Automatic,
        };
        self.pid.set_mode(pid_mode, measured, self.drive);
    }

    /// Run one control step and return the new drive
    pub fn update(&mut self, target: f32, measured: f32) -> f32 {
        if self.mode == ControlMode::BangBang
            && select_mode(target, measured, self.threshold) == ControlMode::Pid
        {
            self.mode = ControlMode::Pid;
            self.pid.set_mode(PidMode::Automatic, measured, self.drive);
            // Drop windup inherited from full drive
            self.pid.reset_integral();
        }

        self.drive = match self.mode {
            ControlMode::BangBang => bang_bang_drive(target, measured, self.limits),
            ControlMode::Pid => self
                .limits
                .clamp(self.pid.compute(measured, target, self.drive)),
        };
        self.drive
    }

    /// Zero the drive while the axis is inactive
    pub fn idle(&mut self) {
        self.drive = 0.0;
    }

    /// Replace the PID gains
    pub fn set_tuning(&mut self, tuning: Tuning) {
        self.pid.set_tunings(tuning);
    }

    /// Zero the PID integral term
    pub fn reset_integral(&mut self) {
        self.pid.reset_integral();
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn drive(&self) -> f32 {
        self.drive
    }

    pub fn pid(&self) -> &P {
        &self.pid
    }
}
