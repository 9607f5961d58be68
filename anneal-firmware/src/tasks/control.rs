//! Control loop task
//!
//! Ticks the thermocycler at the configured period and feeds the
//! watchdog once per completed tick.

use defmt::*;
use embassy_rp::watchdog::Watchdog;
use embassy_time::{Duration, Instant, Ticker};

use anneal_core::Thermocycler;
use anneal_drivers::heater::PidController;

use crate::board::FirmwareBoard;
use crate::display::LogDisplay;
use crate::link::SerialLink;
use crate::store::CachedStore;

pub type Controller = Thermocycler<FirmwareBoard, LogDisplay, SerialLink, CachedStore, PidController>;

#[embassy_executor::task]
pub async fn control_task(mut controller: Controller, mut watchdog: Watchdog) {
    info!("Control task started");

    let period_ms = controller.config().tick_period_ms as u64;
    let mut ticker = Ticker::every(Duration::from_millis(period_ms));
    let mut last_refusal = None;

    loop {
        ticker.next().await;

        // Wraps after ~49 days; the control loop uses wrapping differences
        let now_ms = Instant::now().as_millis() as u32;

        let before = controller.state();
        controller.tick(now_ms);
        let after = controller.state();
        if after != before {
            info!("State {:?} -> {:?}", before, after);
        }
        let refusal = controller.last_start_error();
        if refusal != last_refusal {
            if let Some(e) = refusal {
                warn!("Start refused: {:?}", e);
            }
            last_refusal = refusal;
        }

        watchdog.feed();
    }
}
