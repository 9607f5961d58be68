//! 22-bit SPI ADC plate sensor
//!
//! The converter pulls its data line low when a conversion is ready.
//! A ready conversion is read as four bytes; the code sits in the low
//! five bits of the first byte through the top bit of the last. The
//! plate thermistor sits under a 2.2 kΩ pull-up from the 5 V reference.

use anneal_core::calibration::{CalibrationTable, PLATE_TABLE};
use anneal_core::traits::{SensorError, TemperatureSensor};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;
use embedded_hal::spi::SpiDevice;

/// Full-scale conversion code
pub const FULL_SCALE: u32 = 0x1F_FFFF;

/// Reference voltage in millivolts
const VREF_MV: u64 = 5000;

/// Pull-up resistor in 0.1 Ω
const PULLUP_DECI_OHMS: u64 = 22_000;

/// Ready-line poll interval
const POLL_INTERVAL_US: u32 = 100;

/// Maximum wait for a conversion
const READY_TIMEOUT_US: u32 = 500_000;

/// Assemble the conversion code from a raw frame
pub fn assemble_code(frame: [u8; 4]) -> u32 {
    ((frame[0] as u32 & 0x1F) << 17)
        | ((frame[1] as u32) << 9)
        | ((frame[2] as u32) << 1)
        | ((frame[3] as u32) >> 7)
}

/// Convert a conversion code to thermistor resistance in 0.1 Ω
pub fn code_to_resistance(code: u32) -> Result<u32, SensorError> {
    if code == 0 {
        return Err(SensorError::ShortCircuit);
    }
    let mv = code as u64 * VREF_MV / FULL_SCALE as u64;
    if mv >= VREF_MV {
        return Err(SensorError::OpenCircuit);
    }
    Ok((mv * PULLUP_DECI_OHMS / (VREF_MV - mv)) as u32)
}

/// Plate thermistor behind a 22-bit SPI converter
pub struct SpiAdcThermistor<SPI, RDY, D> {
    spi: SPI,
    ready: RDY,
    delay: D,
    table: CalibrationTable,
}

impl<SPI, RDY, D> SpiAdcThermistor<SPI, RDY, D>
where
    SPI: SpiDevice,
    RDY: InputPin,
    D: DelayNs,
{
    /// Plate sensor with the plate calibration table
    pub fn new(spi: SPI, ready: RDY, delay: D) -> Self {
        Self {
            spi,
            ready,
            delay,
            table: PLATE_TABLE,
        }
    }

    /// Wait for conversion-ready, then read one raw frame
    pub fn read_frame(&mut self) -> Result<[u8; 4], SensorError> {
        let mut waited_us = 0;
        while self.ready.is_high().map_err(|_| SensorError::Bus)? {
            if waited_us >= READY_TIMEOUT_US {
                return Err(SensorError::Timeout);
            }
            self.delay.delay_us(POLL_INTERVAL_US);
            waited_us += POLL_INTERVAL_US;
        }

        let mut frame = [0u8; 4];
        self.spi.read(&mut frame).map_err(|_| SensorError::Bus)?;
        Ok(frame)
    }
}

impl<SPI, RDY, D> TemperatureSensor for SpiAdcThermistor<SPI, RDY, D>
where
    SPI: SpiDevice,
    RDY: InputPin,
    D: DelayNs,
{
    fn read_celsius(&mut self) -> Result<f32, SensorError> {
        let code = assemble_code(self.read_frame()?);
        let resistance = code_to_resistance(code)?;
        Ok(self.table.temperature(resistance))
    }
}
