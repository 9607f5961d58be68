//! Temperature sensor implementations

pub mod spi_adc;
pub mod thermistor;

pub use spi_adc::SpiAdcThermistor;
pub use thermistor::{AdcReader, DividerThermistor};
