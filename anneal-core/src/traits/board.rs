//! Board-level I/O used by the control loop

use super::heater::{SensorError, ThermalDirection};

/// External power sense
pub trait PowerSense {
    /// True if the actuator supply is present
    fn power_present(&mut self) -> bool;
}

/// Everything the control loop touches on the board
///
/// One implementation per board wiring; the control loop only sees
/// degrees and drive values.
pub trait Board {
    /// True if the actuator supply is present
    fn power_present(&mut self) -> bool;

    /// Read the plate temperature in °C
    fn read_plate(&mut self) -> Result<f32, SensorError>;

    /// Read the lid temperature in °C
    fn read_lid(&mut self) -> Result<f32, SensorError>;

    /// Drive the plate Peltier
    fn drive_plate(&mut self, direction: ThermalDirection, pwm: u16);

    /// Drive the lid heater
    fn drive_lid(&mut self, pwm: u8);
}
