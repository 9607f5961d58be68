//! Temperature sensor and thermal actuator traits

/// Errors that can occur with temperature sensing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Sensor disconnected (open circuit)
    OpenCircuit,
    /// Sensor shorted to ground
    ShortCircuit,
    /// Conversion did not complete within the poll timeout
    Timeout,
    /// Bus transaction or ADC read failed
    Bus,
}

/// Trait for temperature sensors
///
/// Implementations convert a raw reading (ADC code, bus transaction)
/// to degrees through a calibration table.
pub trait TemperatureSensor {
    /// Read the current temperature in degrees Celsius
    ///
    /// Takes `&mut self` because ADC reads typically require mutable access.
    fn read_celsius(&mut self) -> Result<f32, SensorError>;
}

/// Direction of plate heat flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ThermalDirection {
    #[default]
    Off,
    Heat,
    Cool,
}

impl ThermalDirection {
    /// Derive direction from a signed drive value
    pub fn from_drive(drive: f32) -> Self {
        if drive > 0.0 {
            ThermalDirection::Heat
        } else if drive < 0.0 {
            ThermalDirection::Cool
        } else {
            ThermalDirection::Off
        }
    }
}

/// Bidirectional plate actuator (Peltier H-bridge)
pub trait PlateOutput {
    /// Drive the plate with a PWM magnitude in the given direction
    ///
    /// `Off` must de-energize the element regardless of `pwm`.
    fn drive(&mut self, direction: ThermalDirection, pwm: u16);
}

/// Unidirectional lid heater
pub trait LidOutput {
    /// Drive the lid heater with a PWM duty (0 = off)
    fn drive(&mut self, pwm: u8);
}
