//! PID controller
//!
//! Fixed-sample-time PID operating in degrees and drive units. The
//! integral and derivative gains are pre-scaled by the sample period so
//! `compute` is called exactly once per control tick. The derivative acts
//! on the measurement, so setpoint changes do not kick the output.

use anneal_core::config::{OutputLimits, Tuning};
use anneal_core::traits::{PidLoop, PidMode};

/// PID controller with integral clamping and bumpless mode transfer
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PidController {
    kp: f32,
    /// Integral gain per sample
    ki: f32,
    /// Derivative gain per sample
    kd: f32,
    sample_s: f32,
    limits: OutputLimits,
    mode: PidMode,
    iterm: f32,
    last_input: f32,
}

impl PidController {
    /// Create a controller sampled every `sample_s` seconds
    ///
    /// Starts in manual mode with zero gains and a 0..255 output range.
    pub fn new(sample_s: f32) -> Self {
        Self {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            sample_s,
            limits: OutputLimits::new(0.0, 255.0),
            mode: PidMode::Manual,
            iterm: 0.0,
            last_input: 0.0,
        }
    }

    /// Accumulated integral term
    pub fn integral(&self) -> f32 {
        self.iterm
    }

    pub fn limits(&self) -> OutputLimits {
        self.limits
    }

    fn initialize(&mut self, input: f32, output: f32) {
        self.iterm = self.limits.clamp(output);
        self.last_input = input;
    }
}

impl PidLoop for PidController {
    fn set_mode(&mut self, mode: PidMode, input: f32, output: f32) {
        if mode == PidMode::Automatic && self.mode == PidMode::Manual {
            self.initialize(input, output);
        }
        self.mode = mode;
    }

    fn mode(&self) -> PidMode {
        self.mode
    }

    fn set_tunings(&mut self, tuning: Tuning) {
        if tuning.kp < 0.0 || tuning.ki < 0.0 || tuning.kd < 0.0 {
            return;
        }
        self.kp = tuning.kp;
        self.ki = tuning.ki * self.sample_s;
        self.kd = tuning.kd / self.sample_s;
    }

    fn set_output_limits(&mut self, limits: OutputLimits) {
        if limits.min >= limits.max {
            return;
        }
        self.limits = limits;
        self.iterm = limits.clamp(self.iterm);
    }

    fn reset_integral(&mut self) {
        self.iterm = 0.0;
    }

    fn compute(&mut self, input: f32, setpoint: f32, output: f32) -> f32 {
        if self.mode == PidMode::Manual {
            return output;
        }

        let error = setpoint - input;
        self.iterm = self.limits.clamp(self.iterm + self.ki * error);
        let d_input = input - self.last_input;
        self.last_input = input;

        self.limits
            .clamp(self.kp * error + self.iterm - self.kd * d_input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn plate_pid(tuning: Tuning) -> PidController {
        let mut pid = PidController::new(0.5);
        pid.set_output_limits(OutputLimits::new(-1023.0, 1023.0));
        pid.set_tunings(tuning);
        pid
    }

    #[test]
    fn test_manual_passes_output_through() {
        let mut pid = plate_pid(Tuning::new(100.0, 0.0, 0.0));
        assert_eq!(pid.mode(), PidMode::Manual);
        assert_eq!(pid.compute(25.0, 95.0, 42.0), 42.0);
    }

    #[test]
    fn test_proportional_only() {
        let mut pid = plate_pid(Tuning::new(100.0, 0.0, 0.0));
        pid.set_mode(PidMode::Automatic, 94.0, 0.0);
        pid.reset_integral();
        assert_eq!(pid.compute(94.0, 95.0, 0.0), 100.0);
        assert_eq!(pid.compute(95.5, 95.0, 100.0), -50.0);
    }

    #[test]
    fn test_integral_scaled_by_sample_time() {
        // ki = 10/s at 0.5 s per sample accumulates 5 per degree per tick
        let mut pid = plate_pid(Tuning::new(0.0, 10.0, 0.0));
        pid.set_mode(PidMode::Automatic, 94.0, 0.0);
        assert_eq!(pid.compute(94.0, 95.0, 0.0), 5.0);
        assert_eq!(pid.compute(94.0, 95.0, 5.0), 10.0);
        assert_eq!(pid.integral(), 10.0);

        pid.reset_integral();
        assert_eq!(pid.integral(), 0.0);
    }

    #[test]
    fn test_derivative_on_measurement() {
        // kd = 1 s at 0.5 s per sample: 2 per degree of input change
        let mut pid = plate_pid(Tuning::new(0.0, 0.0, 1.0));
        pid.set_mode(PidMode::Automatic, 90.0, 0.0);
        assert_eq!(pid.compute(90.0, 95.0, 0.0), 0.0);
        // Rising input pushes the output down
        assert_eq!(pid.compute(91.0, 95.0, 0.0), -2.0);
        // Setpoint jump alone causes no kick
        assert_eq!(pid.compute(91.0, 60.0, 0.0), 0.0);
    }

    #[test]
    fn test_bumpless_transfer() {
        let mut pid = plate_pid(Tuning::new(100.0, 1.0, 0.0));
        pid.set_mode(PidMode::Automatic, 95.0, 500.0);
        assert_eq!(pid.integral(), 500.0);
        // At setpoint the output holds where manual left it
        assert_eq!(pid.compute(95.0, 95.0, 500.0), 500.0);

        // Re-entering automatic while already automatic does not re-seed
        pid.set_mode(PidMode::Automatic, 95.0, -700.0);
        assert_eq!(pid.integral(), 500.0);
    }

    #[test]
    fn test_output_and_integral_clamped() {
        let mut pid = PidController::new(0.5);
        pid.set_output_limits(OutputLimits::new(0.0, 255.0));
        pid.set_tunings(Tuning::new(100.0, 100.0, 0.0));
        pid.set_mode(PidMode::Automatic, 25.0, 0.0);
        assert_eq!(pid.compute(25.0, 100.0, 0.0), 255.0);
        assert_eq!(pid.integral(), 255.0);
        assert_eq!(pid.compute(110.0, 100.0, 255.0), 0.0);
    }

    #[test]
    fn test_invalid_settings_ignored() {
        let mut pid = plate_pid(Tuning::new(100.0, 0.0, 0.0));
        pid.set_tunings(Tuning::new(-1.0, 0.0, 0.0));
        pid.set_output_limits(OutputLimits::new(10.0, 10.0));
        assert_eq!(pid.limits(), OutputLimits::new(-1023.0, 1023.0));

        pid.set_mode(PidMode::Automatic, 94.0, 0.0);
        assert_eq!(pid.compute(94.0, 95.0, 0.0), 100.0);
    }

    #[test]
    fn test_narrowing_limits_clamps_integral() {
        let mut pid = plate_pid(Tuning::new(0.0, 0.0, 0.0));
        pid.set_mode(PidMode::Automatic, 0.0, 800.0);
        pid.set_output_limits(OutputLimits::new(0.0, 255.0));
        assert_eq!(pid.integral(), 255.0);
    }

    proptest! {
        #[test]
        fn prop_output_within_limits(
            kp in 0.0f32..5000.0,
            ki in 0.0f32..1000.0,
            kd in 0.0f32..1000.0,
            inputs in proptest::collection::vec(-40.0f32..130.0, 1..50),
            setpoint in 0.0f32..110.0,
        ) {
            let mut pid = plate_pid(Tuning::new(kp, ki, kd));
            pid.set_mode(PidMode::Automatic, inputs[0], 0.0);
            let mut output = 0.0;
            for input in inputs {
                output = pid.compute(input, setpoint, output);
                prop_assert!((-1023.0..=1023.0).contains(&output));
            }
        }
    }
}
