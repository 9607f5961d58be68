//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in anneal-core for the thermocycler hardware:
//!
//! - PID controller (floating point, derivative on measurement)
//! - Plate Peltier H-bridge and lid heater PWM outputs
//! - Temperature sensors (ADC divider thermistor, 22-bit SPI ADC)
//! - Board composition and power sense

#![no_std]
#![deny(unsafe_code)]

pub mod board;
pub mod heater;
pub mod sensor;

pub use board::{PcrBoard, PowerPin};
