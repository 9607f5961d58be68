//! Plate gain selection
//!
//! Gains are chosen once per target change from the ramp direction and
//! the band the target falls in. Low targets and high cooling targets
//! get their own gains to limit overshoot at the temperature extremes.

use crate::config::{PlateTunings, Tuning};

/// Direction of a plate ramp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RampDirection {
    Up,
    Down,
}

impl RampDirection {
    /// Ramp direction toward `target`; an equal target counts as heating
    pub fn toward(target: f32, measured: f32) -> Self {
        if target >= measured {
            RampDirection::Up
        } else {
            RampDirection::Down
        }
    }
}

/// Gains for a ramp in `direction` toward `target`
pub fn select_plate_tuning(tunings: &PlateTunings, direction: RampDirection, target: f32) -> Tuning {
    match direction {
        RampDirection::Up if target < tunings.heating_low_below_c => tunings.heating_low,
        RampDirection::Up => tunings.heating,
        RampDirection::Down if target > tunings.cooling_high_above_c => tunings.cooling_high,
        RampDirection::Down if target < tunings.cooling_low_below_c => tunings.cooling_low,
        RampDirection::Down => tunings.cooling,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heating_bands() {
        let t = PlateTunings::default();
        assert_eq!(select_plate_tuning(&t, RampDirection::Up, 95.0), t.heating);
        assert_eq!(select_plate_tuning(&t, RampDirection::Up, 40.0), t.heating);
        assert_eq!(select_plate_tuning(&t, RampDirection::Up, 37.0), t.heating_low);
    }

    #[test]
    fn test_cooling_bands() {
        let t = PlateTunings::default();
        assert_eq!(select_plate_tuning(&t, RampDirection::Down, 72.0), t.cooling_high);
        assert_eq!(select_plate_tuning(&t, RampDirection::Down, 70.0), t.cooling);
        assert_eq!(select_plate_tuning(&t, RampDirection::Down, 55.0), t.cooling);
        assert_eq!(select_plate_tuning(&t, RampDirection::Down, 35.0), t.cooling);
        assert_eq!(select_plate_tuning(&t, RampDirection::Down, 4.0), t.cooling_low);
    }

    #[test]
    fn test_reference_gains() {
        let t = PlateTunings::default();
        assert_eq!(
            select_plate_tuning(&t, RampDirection::Down, 4.0),
            Tuning::new(2000.0, 100.0, 200.0)
        );
        assert_eq!(
            select_plate_tuning(&t, RampDirection::Up, 95.0),
            Tuning::new(1000.0, 250.0, 250.0)
        );
    }

    #[test]
    fn test_direction_toward() {
        assert_eq!(RampDirection::toward(95.0, 25.0), RampDirection::Up);
        assert_eq!(RampDirection::toward(25.0, 25.0), RampDirection::Up);
        assert_eq!(RampDirection::toward(55.0, 95.0), RampDirection::Down);
    }
}
