//! Anneal - PCR Thermocycler Firmware
//!
//! Main firmware binary for RP2040-based thermocyclers. A single control
//! task ticks the plate and lid controllers; the host link and flash
//! writes run in their own tasks.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUart, Config as UartConfig};
use embassy_rp::watchdog::Watchdog;
use embassy_time::Duration;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use anneal_core::config::ThermalConfig;
use anneal_core::{Parts, Thermocycler};
use anneal_drivers::heater::PidController;

use crate::display::LogDisplay;
use crate::flash::FlashStorage;
use crate::link::SerialLink;
use crate::store::CachedStore;

mod board;
mod channels;
mod display;
mod flash;
mod link;
mod store;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Watchdog period; several control ticks
const WATCHDOG_TIMEOUT_MS: u64 = 2_000;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Anneal firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let mut watchdog = Watchdog::new(p.WATCHDOG);
    // After a watchdog reset the stored program is not replayed
    let restarted = watchdog.reset_reason().is_some();
    if restarted {
        warn!("Restarted by watchdog");
    }

    let config = ThermalConfig::default();
    if let Err(e) = config.validate() {
        defmt::panic!("Invalid thermal configuration: {:?}", e);
    }

    let mut storage = FlashStorage::new(p.FLASH, p.DMA_CH0);
    let boot = storage.load().await;

    let board = board::init(board::BoardPins {
        adc: p.ADC,
        lid_therm: p.PIN_26,
        spi: p.SPI0,
        sck: p.PIN_2,
        mosi: p.PIN_3,
        miso: p.PIN_4,
        cs: p.PIN_5,
        ready: p.PIN_6,
        plate_slice: p.PWM_SLICE0,
        plate_pwm: p.PIN_16,
        heat: p.PIN_18,
        cool: p.PIN_19,
        lid_slice: p.PWM_SLICE2,
        lid_pwm: p.PIN_20,
        power: p.PIN_22,
    });

    // Host link, 115200 baud default
    let tx_buf = TX_BUF.init([0u8; 64]);
    let rx_buf = RX_BUF.init([0u8; 256]);
    let uart = BufferedUart::new(
        p.UART0,
        p.PIN_0,
        p.PIN_1,
        Irqs,
        tx_buf,
        rx_buf,
        UartConfig::default(),
    );
    let (_tx, rx) = uart.split();
    info!("UART initialized for host link");

    let sample_s = config.tick_period_s();
    let controller = Thermocycler::new(
        Parts {
            board,
            display: LogDisplay::new(),
            link: SerialLink::new(),
            store: CachedStore::new(boot),
            plate_pid: PidController::new(sample_s),
            lid_pid: PidController::new(sample_s),
        },
        config,
        restarted,
    );

    watchdog.start(Duration::from_millis(WATCHDOG_TIMEOUT_MS));

    spawner.spawn(tasks::serial_rx_task(rx)).unwrap();
    spawner.spawn(tasks::persist_task(storage)).unwrap();
    spawner
        .spawn(tasks::control_task(controller, watchdog))
        .unwrap();

    info!("All tasks spawned, firmware running");
}
