//! PWM lid heater output

use anneal_core::traits::LidOutput;
use embedded_hal::pwm::SetDutyCycle;

/// Lid heater on a single PWM channel; drive 255 is full duty
pub struct PwmLidHeater<P> {
    pwm: P,
    drive: u8,
}

impl<P: SetDutyCycle> PwmLidHeater<P> {
    pub fn new(pwm: P) -> Self {
        let mut heater = Self { pwm, drive: 0 };
        heater.drive(0);
        heater
    }

    /// Last applied drive
    pub fn current_drive(&self) -> u8 {
        self.drive
    }
}

impl<P: SetDutyCycle> LidOutput for PwmLidHeater<P> {
    fn drive(&mut self, pwm: u8) {
        // Retried on the next tick
        let _ = self.pwm.set_duty_cycle_fraction(pwm as u16, u8::MAX as u16);
        self.drive = pwm;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heater::peltier::tests::MockPwm;

    #[test]
    fn test_starts_off() {
        let heater = PwmLidHeater::new(MockPwm::default());
        assert_eq!(heater.pwm.duty, 0);
        assert_eq!(heater.current_drive(), 0);
    }

    #[test]
    fn test_duty_scaled_from_255() {
        let mut heater = PwmLidHeater::new(MockPwm::default());
        heater.drive(255);
        assert_eq!(heater.pwm.duty, 1000);
        heater.drive(51);
        assert_eq!(heater.pwm.duty, 200);
        assert_eq!(heater.current_drive(), 51);
    }
}
