//! Divider thermistor on an ADC channel
//!
//! Circuit: VCC -- pullup -- ADC_PIN -- thermistor -- GND. The resistance
//! is recovered from the divider ratio and converted through a
//! calibration table.

use anneal_core::calibration::{CalibrationTable, LID_TABLE};
use anneal_core::traits::{SensorError, TemperatureSensor};

/// ADC reading trait for platform abstraction
pub trait AdcReader {
    /// Read the raw conversion code
    #[allow(clippy::result_unit_err)]
    fn read(&mut self) -> Result<u16, ()>;
}

/// Thermistor read through a resistor divider
pub struct DividerThermistor<ADC> {
    adc: ADC,
    /// Pull-up resistor in the table's resistance unit
    pullup: u32,
    /// Number of ADC codes (4096 for 12-bit)
    adc_max: u16,
    table: CalibrationTable,
}

impl<ADC> DividerThermistor<ADC> {
    /// Create a sensor
    ///
    /// # Arguments
    /// - `adc`: ADC channel for reading the thermistor
    /// - `pullup`: pull-up resistor, in the units of `table`
    /// - `adc_max`: number of ADC codes
    /// - `table`: calibration table for the thermistor
    pub fn new(adc: ADC, pullup: u32, adc_max: u16, table: CalibrationTable) -> Self {
        Self {
            adc,
            pullup,
            adc_max,
            table,
        }
    }

    /// Heated-lid thermistor: 2.2 kΩ pull-up, lid table
    pub fn lid(adc: ADC, adc_max: u16) -> Self {
        Self::new(adc, 2200, adc_max, LID_TABLE)
    }

    /// Convert an ADC code to resistance
    ///
    /// R = pullup * code / (adc_max - code)
    pub fn code_to_resistance(&self, code: u16) -> Result<u32, SensorError> {
        if code == 0 {
            return Err(SensorError::ShortCircuit);
        }
        if code >= self.adc_max.saturating_sub(1) {
            return Err(SensorError::OpenCircuit);
        }

        let numerator = self.pullup as u64 * code as u64;
        let denominator = (self.adc_max - code) as u64;
        Ok((numerator / denominator) as u32)
    }
}

impl<ADC: AdcReader> TemperatureSensor for DividerThermistor<ADC> {
    fn read_celsius(&mut self) -> Result<f32, SensorError> {
        let code = self.adc.read().map_err(|_| SensorError::Bus)?;
        let resistance = self.code_to_resistance(code)?;
        Ok(self.table.temperature(resistance))
    }
}

/// Dummy ADC for testing (returns a fixed value)
#[cfg(test)]
pub struct DummyAdc(pub Result<u16, ()>);

#[cfg(test)]
impl AdcReader for DummyAdc {
    fn read(&mut self) -> Result<u16, ()> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_to_resistance() {
        let sensor = DividerThermistor::lid(DummyAdc(Ok(0)), 4096);
        // Mid-scale reads the pull-up value
        assert_eq!(sensor.code_to_resistance(2048).unwrap(), 2200);
        assert_eq!(sensor.code_to_resistance(1024).unwrap(), 733);
    }

    #[test]
    fn test_rails_are_faults() {
        let sensor = DividerThermistor::lid(DummyAdc(Ok(0)), 4096);
        assert_eq!(
            sensor.code_to_resistance(0),
            Err(SensorError::ShortCircuit)
        );
        assert_eq!(
            sensor.code_to_resistance(4095),
            Err(SensorError::OpenCircuit)
        );
    }

    #[test]
    fn test_room_temperature() {
        // 10 kΩ at 25 °C: code = 4096 * 10000 / 12200
        let mut sensor = DividerThermistor::lid(DummyAdc(Ok(3357)), 4096);
        let temp = sensor.read_celsius().unwrap();
        assert!((temp - 25.0).abs() < 0.2);
    }

    #[test]
    fn test_adc_failure() {
        let mut sensor = DividerThermistor::lid(DummyAdc(Err(())), 4096);
        assert_eq!(sensor.read_celsius(), Err(SensorError::Bus));
    }
}
