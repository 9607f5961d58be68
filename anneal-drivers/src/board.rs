//! Board composition
//!
//! Joins the individual sensors and outputs into the single [`Board`]
//! the control loop drives.

use anneal_core::traits::{
    Board, LidOutput, PlateOutput, PowerSense, SensorError, TemperatureSensor, ThermalDirection,
};
use embedded_hal::digital::InputPin;

/// Power sense on a digital input, high when the supply is present
pub struct PowerPin<P> {
    pin: P,
}

impl<P: InputPin> PowerPin<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: InputPin> PowerSense for PowerPin<P> {
    fn power_present(&mut self) -> bool {
        // An unreadable pin is treated as no power
        self.pin.is_high().unwrap_or(false)
    }
}

/// Thermocycler board built from its parts
pub struct PcrBoard<PW, PS, LS, PO, LO> {
    pub power: PW,
    pub plate_sensor: PS,
    pub lid_sensor: LS,
    pub plate_output: PO,
    pub lid_output: LO,
}

impl<PW, PS, LS, PO, LO> Board for PcrBoard<PW, PS, LS, PO, LO>
where
    PW: PowerSense,
    PS: TemperatureSensor,
    LS: TemperatureSensor,
    PO: PlateOutput,
    LO: LidOutput,
{
    fn power_present(&mut self) -> bool {
        self.power.power_present()
    }

    fn read_plate(&mut self) -> Result<f32, SensorError> {
        self.plate_sensor.read_celsius()
    }

    fn read_lid(&mut self) -> Result<f32, SensorError> {
        self.lid_sensor.read_celsius()
    }

    fn drive_plate(&mut self, direction: ThermalDirection, pwm: u16) {
        self.plate_output.drive(direction, pwm);
    }

    fn drive_lid(&mut self, pwm: u8) {
        self.lid_output.drive(pwm);
    }
}
