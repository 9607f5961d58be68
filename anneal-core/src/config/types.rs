//! Configuration type definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Output limits are inverted or empty
    InvalidLimits,
    /// A tolerance or threshold is negative
    InvalidTolerance,
    /// Tick period or display reset interval is zero
    InvalidInterval,
}

/// PID gains
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tuning {
    /// Proportional gain
    pub kp: f32,
    /// Integral gain (per second)
    pub ki: f32,
    /// Derivative gain (seconds)
    pub kd: f32,
}

impl Tuning {
    pub const fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self { kp, ki, kd }
    }
}

/// Actuator output range
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OutputLimits {
    pub min: f32,
    pub max: f32,
}

impl OutputLimits {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Clamp a drive value into range
    pub fn clamp(&self, value: f32) -> f32 {
        value.max(self.min).min(self.max)
    }
}

/// Plate PID gain sets, selected by ramp direction and target band
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlateTunings {
    /// Heating
    pub heating: Tuning,
    /// Heating toward a target below `heating_low_below_c`
    pub heating_low: Tuning,
    pub heating_low_below_c: f32,
    /// Cooling
    pub cooling: Tuning,
    /// Cooling toward a target above `cooling_high_above_c`
    pub cooling_high: Tuning,
    pub cooling_high_above_c: f32,
    /// Cooling toward a target below `cooling_low_below_c`
    ///
    /// Below this target the cooling anti-windup is also disabled.
    pub cooling_low: Tuning,
    pub cooling_low_below_c: f32,
}

impl Default for PlateTunings {
    fn default() -> Self {
        Self {
            heating: Tuning::new(1000.0, 250.0, 250.0),
            heating_low: Tuning::new(600.0, 200.0, 400.0),
            heating_low_below_c: 40.0,
            cooling: Tuning::new(500.0, 400.0, 200.0),
            cooling_high: Tuning::new(800.0, 700.0, 300.0),
            cooling_high_above_c: 70.0,
            cooling_low: Tuning::new(2000.0, 100.0, 200.0),
            cooling_low_below_c: 35.0,
        }
    }
}

/// Thermal control configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThermalConfig {
    /// Plate is on target when within this many °C
    pub cycle_start_tolerance_c: f32,
    /// Lid is ready when within this many °C of its target
    pub lid_start_tolerance_c: f32,
    /// Plate gap at or above which bang-bang drive is used
    pub plate_bang_bang_threshold_c: f32,
    /// Lid gap at or above which bang-bang drive is used
    pub lid_bang_bang_threshold_c: f32,
    /// Plate drive range (negative cools)
    pub plate_limits: OutputLimits,
    /// Lid drive range
    pub lid_limits: OutputLimits,
    /// Plate gains
    pub plate_tunings: PlateTunings,
    /// Lid gains
    pub lid_tuning: Tuning,
    /// Time spent in startup before accepting commands
    pub startup_delay_ms: u32,
    /// Interval between display driver resets
    pub display_reset_interval_ms: u32,
    /// Control tick period
    pub tick_period_ms: u32,
}

impl Default for ThermalConfig {
    fn default() -> Self {
        Self {
            cycle_start_tolerance_c: 0.2,
            lid_start_tolerance_c: 1.0,
            plate_bang_bang_threshold_c: 2.0,
            lid_bang_bang_threshold_c: 2.0,
            plate_limits: OutputLimits::new(-1023.0, 1023.0),
            lid_limits: OutputLimits::new(0.0, 255.0),
            plate_tunings: PlateTunings::default(),
            lid_tuning: Tuning::new(100.0, 50.0, 50.0),
            startup_delay_ms: 5000,
            display_reset_interval_ms: 30_000,
            tick_period_ms: 500,
        }
    }
}

impl ThermalConfig {
    /// Check ranges before handing the config to the control loop
    pub fn validate(&self) -> Result<(), ConfigError> {
        for limits in [self.plate_limits, self.lid_limits] {
            if !(limits.min < limits.max) {
                return Err(ConfigError::InvalidLimits);
            }
        }
        if self.lid_limits.min < 0.0 {
            return Err(ConfigError::InvalidLimits);
        }

        let tolerances = [
            self.cycle_start_tolerance_c,
            self.lid_start_tolerance_c,
            self.plate_bang_bang_threshold_c,
            self.lid_bang_bang_threshold_c,
        ];
        if tolerances.iter().any(|t| !(*t >= 0.0)) {
            return Err(ConfigError::InvalidTolerance);
        }

        if self.tick_period_ms == 0 || self.display_reset_interval_ms == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        Ok(())
    }

    /// Tick period in seconds
    pub fn tick_period_s(&self) -> f32 {
        self.tick_period_ms as f32 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(ThermalConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_inverted_limits() {
        let mut config = ThermalConfig::default();
        config.plate_limits = OutputLimits::new(10.0, -10.0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidLimits));

        let mut config = ThermalConfig::default();
        config.lid_limits = OutputLimits::new(-5.0, 255.0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidLimits));
    }

    #[test]
    fn test_rejects_negative_tolerance() {
        let mut config = ThermalConfig::default();
        config.cycle_start_tolerance_c = -0.1;
        assert_eq!(config.validate(), Err(ConfigError::InvalidTolerance));
    }

    #[test]
    fn test_rejects_zero_tick() {
        let mut config = ThermalConfig::default();
        config.tick_period_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidInterval));
    }

    #[test]
    fn test_clamp() {
        let limits = OutputLimits::new(0.0, 255.0);
        assert_eq!(limits.clamp(300.0), 255.0);
        assert_eq!(limits.clamp(-3.0), 0.0);
        assert_eq!(limits.clamp(12.5), 12.5);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_postcard_roundtrip() {
        let config = ThermalConfig::default();
        let mut buf = [0u8; 256];
        let bytes = postcard::to_slice(&config, &mut buf).unwrap();
        let decoded: ThermalConfig = postcard::from_bytes(bytes).unwrap();
        assert_eq!(decoded, config);
    }
}
