//! Peltier H-bridge output
//!
//! Two direction pins select heating or cooling; one PWM channel sets the
//! magnitude. With both pins low the bridge is open and the element is
//! de-energized.

use anneal_core::traits::{PlateOutput, ThermalDirection};
use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

/// Plate Peltier driven through an H-bridge
pub struct PeltierBridge<H, C, P> {
    heat_pin: H,
    cool_pin: C,
    pwm: P,
    /// Drive magnitude mapped to full duty
    max_pwm: u16,
    direction: ThermalDirection,
}

impl<H: OutputPin, C: OutputPin, P: SetDutyCycle> PeltierBridge<H, C, P> {
    /// Create the bridge de-energized
    pub fn new(heat_pin: H, cool_pin: C, pwm: P, max_pwm: u16) -> Self {
        let mut bridge = Self {
            heat_pin,
            cool_pin,
            pwm,
            max_pwm: max_pwm.max(1),
            direction: ThermalDirection::Off,
        };
        bridge.drive(ThermalDirection::Off, 0);
        bridge
    }

    pub fn direction(&self) -> ThermalDirection {
        self.direction
    }
}

impl<H: OutputPin, C: OutputPin, P: SetDutyCycle> PlateOutput for PeltierBridge<H, C, P> {
    fn drive(&mut self, direction: ThermalDirection, pwm: u16) {
        // Pin and PWM errors are not recoverable mid-tick; the next tick retries
        let (heat, cool, pwm) = match direction {
            ThermalDirection::Heat => (true, false, pwm),
            ThermalDirection::Cool => (false, true, pwm),
            ThermalDirection::Off => (false, false, 0),
        };

        // Never both high: release before engaging
        if !heat {
            let _ = self.heat_pin.set_low();
        }
        if !cool {
            let _ = self.cool_pin.set_low();
        }
        if heat {
            let _ = self.heat_pin.set_high();
        }
        if cool {
            let _ = self.cool_pin.set_high();
        }

        let _ = self
            .pwm
            .set_duty_cycle_fraction(pwm.min(self.max_pwm), self.max_pwm);
        self.direction = direction;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use core::convert::Infallible;

    #[derive(Debug, Default)]
    pub(crate) struct MockPin {
        pub high: bool,
    }

    impl embedded_hal::digital::ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            Ok(())
        }
    }

    /// PWM channel with a 0..=1000 duty range
    #[derive(Debug)]
    pub(crate) struct MockPwm {
        pub duty: u16,
    }

    impl Default for MockPwm {
        fn default() -> Self {
            // Non-zero so construction is observable
            Self { duty: 999 }
        }
    }

    impl embedded_hal::pwm::ErrorType for MockPwm {
        type Error = Infallible;
    }

    impl SetDutyCycle for MockPwm {
        fn max_duty_cycle(&self) -> u16 {
            1000
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
            self.duty = duty;
            Ok(())
        }
    }

    fn bridge() -> PeltierBridge<MockPin, MockPin, MockPwm> {
        PeltierBridge::new(
            MockPin { high: true },
            MockPin { high: true },
            MockPwm::default(),
            1023,
        )
    }

    #[test]
    fn test_starts_off() {
        let bridge = bridge();
        assert!(!bridge.heat_pin.high);
        assert!(!bridge.cool_pin.high);
        assert_eq!(bridge.pwm.duty, 0);
        assert_eq!(bridge.direction(), ThermalDirection::Off);
    }

    #[test]
    fn test_heat_and_cool_select_pins() {
        let mut bridge = bridge();
        bridge.drive(ThermalDirection::Heat, 1023);
        assert!(bridge.heat_pin.high);
        assert!(!bridge.cool_pin.high);
        assert_eq!(bridge.pwm.duty, 1000);

        bridge.drive(ThermalDirection::Cool, 1023);
        assert!(!bridge.heat_pin.high);
        assert!(bridge.cool_pin.high);
        assert_eq!(bridge.pwm.duty, 1000);
    }

    #[test]
    fn test_magnitude_scaled_and_clamped() {
        let mut bridge = bridge();
        bridge.drive(ThermalDirection::Heat, 0);
        assert_eq!(bridge.pwm.duty, 0);
        bridge.drive(ThermalDirection::Heat, 2000);
        assert_eq!(bridge.pwm.duty, 1000);
        // 100/1023 of 1000, truncated
        bridge.drive(ThermalDirection::Cool, 100);
        assert_eq!(bridge.pwm.duty, 97);
    }

    #[test]
    fn test_off_ignores_magnitude() {
        let mut bridge = bridge();
        bridge.drive(ThermalDirection::Heat, 800);
        bridge.drive(ThermalDirection::Off, 800);
        assert!(!bridge.heat_pin.high);
        assert!(!bridge.cool_pin.high);
        assert_eq!(bridge.pwm.duty, 0);
    }
}
