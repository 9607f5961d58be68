//! Plate controller
//!
//! Wraps an [`AxisController`] with per-ramp gain selection, cooling
//! anti-windup and heat/cool direction derivation.

use super::axis::{AxisController, ControlMode};
use super::tuning::{select_plate_tuning, RampDirection};
use crate::config::{PlateTunings, ThermalConfig};
use crate::traits::{PidLoop, ThermalDirection};

pub struct PlateController<P> {
    axis: AxisController<P>,
    tunings: PlateTunings,
    decreasing: bool,
}

impl<P: PidLoop> PlateController<P> {
    pub fn new(pid: P, config: &ThermalConfig) -> Self {
        let tunings = config.plate_tunings;
        Self {
            axis: AxisController::new(
                pid,
                config.plate_limits,
                config.plate_bang_bang_threshold_c,
                tunings.heating,
            ),
            tunings,
            decreasing: false,
        }
    }

    /// Assign a new target
    ///
    /// Gains are only re-selected when the target starts a ramp.
    pub fn retarget(&mut self, target: f32, measured: f32, ramping: bool) {
        self.axis.retarget(target, measured);
        if ramping {
            let direction = RampDirection::toward(target, measured);
            self.decreasing = direction == RampDirection::Down;
            self.axis
                .set_tuning(select_plate_tuning(&self.tunings, direction, target));
        }
    }

    /// Run one control step and return the signed drive
    pub fn update(&mut self, target: f32, measured: f32) -> f32 {
        let drive = self.axis.update(target, measured);

        if self.decreasing && target > self.tunings.cooling_low_below_c {
            if target < measured {
                self.axis.reset_integral();
            } else {
                self.decreasing = false;
            }
        }
        drive
    }

    /// Zero the drive while the plate is inactive
    pub fn idle(&mut self) {
        self.axis.idle();
    }

    pub fn mode(&self) -> ControlMode {
        self.axis.mode()
    }

    pub fn drive(&self) -> f32 {
        self.axis.drive()
    }

    pub fn direction(&self) -> ThermalDirection {
        ThermalDirection::from_drive(self.axis.drive())
    }

    /// True while cooling toward the current target
    pub fn is_decreasing(&self) -> bool {
        self.decreasing
    }

    pub fn pid(&self) -> &P {
        self.axis.pid()
    }
}
