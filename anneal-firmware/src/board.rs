//! Board wiring
//!
//! Pin assignments:
//! - UART0 host link: GPIO0 TX, GPIO1 RX
//! - Plate ADC on SPI0: GPIO2 SCK, GPIO3 MOSI, GPIO4 MISO, GPIO5 CS,
//!   GPIO6 conversion-ready (tied to MISO)
//! - Peltier bridge: GPIO16 PWM, GPIO18 heat, GPIO19 cool
//! - Lid heater: GPIO20 PWM
//! - Power sense: GPIO22
//! - Lid thermistor: GPIO26 (ADC0), 2.2 kΩ pull-up

use defmt::*;
use embassy_rp::adc::{self, Adc, Blocking as AdcBlocking};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::{
    ADC, PIN_16, PIN_18, PIN_19, PIN_2, PIN_20, PIN_22, PIN_26, PIN_3, PIN_4, PIN_5, PIN_6,
    PWM_SLICE0, PWM_SLICE2, SPI0,
};
use embassy_rp::pwm::{self, Pwm, PwmOutput};
use embassy_rp::spi::{self, Spi};
use embassy_rp::Peri;
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;

use anneal_drivers::heater::{PeltierBridge, PwmLidHeater};
use anneal_drivers::sensor::{AdcReader, DividerThermistor, SpiAdcThermistor};
use anneal_drivers::{PcrBoard, PowerPin};

/// RP2040 ADC code count
const ADC_CODES: u16 = 4096;

/// PWM counter top for both heaters
const PWM_TOP: u16 = 1023;

/// Maximum plate drive magnitude
const PLATE_MAX_PWM: u16 = 1023;

/// Plate ADC SPI clock
const SPI_FREQUENCY_HZ: u32 = 1_000_000;

pub type PlateSpi = ExclusiveDevice<Spi<'static, SPI0, spi::Blocking>, Output<'static>, Delay>;
pub type PlateSensor = SpiAdcThermistor<PlateSpi, Input<'static>, Delay>;
pub type LidSensor = DividerThermistor<LidAdc>;
pub type PlateBridge = PeltierBridge<Output<'static>, Output<'static>, PwmOutput<'static>>;
pub type LidHeater = PwmLidHeater<PwmOutput<'static>>;
pub type FirmwareBoard = PcrBoard<PowerPin<Input<'static>>, PlateSensor, LidSensor, PlateBridge, LidHeater>;

/// Lid thermistor channel on the blocking ADC
pub struct LidAdc {
    adc: Adc<'static, AdcBlocking>,
    channel: adc::Channel<'static>,
}

impl AdcReader for LidAdc {
    fn read(&mut self) -> Result<u16, ()> {
        self.adc.blocking_read(&mut self.channel).map_err(|_| ())
    }
}

/// Peripherals used by the board
pub struct BoardPins {
    pub adc: Peri<'static, ADC>,
    pub lid_therm: Peri<'static, PIN_26>,
    pub spi: Peri<'static, SPI0>,
    pub sck: Peri<'static, PIN_2>,
    pub mosi: Peri<'static, PIN_3>,
    pub miso: Peri<'static, PIN_4>,
    pub cs: Peri<'static, PIN_5>,
    pub ready: Peri<'static, PIN_6>,
    pub plate_slice: Peri<'static, PWM_SLICE0>,
    pub plate_pwm: Peri<'static, PIN_16>,
    pub heat: Peri<'static, PIN_18>,
    pub cool: Peri<'static, PIN_19>,
    pub lid_slice: Peri<'static, PWM_SLICE2>,
    pub lid_pwm: Peri<'static, PIN_20>,
    pub power: Peri<'static, PIN_22>,
}

fn pwm_config() -> pwm::Config {
    let mut config = pwm::Config::default();
    config.top = PWM_TOP;
    config.compare_a = 0;
    config
}

/// Bring up the board with both heaters off
pub fn init(pins: BoardPins) -> FirmwareBoard {
    let adc = Adc::new_blocking(pins.adc, adc::Config::default());
    let channel = adc::Channel::new_pin(pins.lid_therm, Pull::None);
    let lid_sensor = DividerThermistor::lid(LidAdc { adc, channel }, ADC_CODES);

    let mut spi_config = spi::Config::default();
    spi_config.frequency = SPI_FREQUENCY_HZ;
    let bus = Spi::new_blocking(pins.spi, pins.sck, pins.mosi, pins.miso, spi_config);
    let cs = Output::new(pins.cs, Level::High);
    let device = unwrap!(ExclusiveDevice::new(bus, cs, Delay));
    let plate_sensor = SpiAdcThermistor::new(device, Input::new(pins.ready, Pull::None), Delay);

    let plate_pwm = Pwm::new_output_a(pins.plate_slice, pins.plate_pwm, pwm_config());
    let (plate_pwm, _) = plate_pwm.split();
    let plate_output = PeltierBridge::new(
        Output::new(pins.heat, Level::Low),
        Output::new(pins.cool, Level::Low),
        unwrap!(plate_pwm),
        PLATE_MAX_PWM,
    );

    let lid_pwm = Pwm::new_output_a(pins.lid_slice, pins.lid_pwm, pwm_config());
    let (lid_pwm, _) = lid_pwm.split();
    let lid_output = PwmLidHeater::new(unwrap!(lid_pwm));

    info!("Board initialized");

    PcrBoard {
        power: PowerPin::new(Input::new(pins.power, Pull::Down)),
        plate_sensor,
        lid_sensor,
        plate_output,
        lid_output,
    }
}
