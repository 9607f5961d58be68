//! Status reporting over defmt
//!
//! Headless boards report through the debug probe. State changes are
//! logged at info level, every other update at trace level.

use defmt::*;

use anneal_core::state::ProgramState;
use anneal_core::status::Status;
use anneal_core::traits::StatusDisplay;

pub struct LogDisplay {
    contrast: u8,
    last_state: Option<ProgramState>,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self {
            contrast: 0,
            last_state: None,
        }
    }
}

impl StatusDisplay for LogDisplay {
    fn update(&mut self, status: &Status) {
        if self.last_state != Some(status.state) {
            info!("{} ({})", status.label(), status.program_name.as_str());
            self.last_state = Some(status.state);
        }

        trace!(
            "plate {}/{} lid {}/{} {}",
            status.plate_temp_c,
            status.plate_target_c,
            status.lid_temp_c,
            status.lid_target_c,
            status.label()
        );
        if let Some(cycle) = status.cycle_text() {
            trace!("cycle {}", cycle.as_str());
        }
        if let Some(eta) = status.eta_text() {
            trace!("{}", eta.as_str());
        }
        if status.plate_stale || status.lid_stale {
            warn!(
                "Sensor read failed (plate: {}, lid: {})",
                status.plate_stale, status.lid_stale
            );
        }
    }

    fn clear(&mut self) {
        self.last_state = None;
    }

    fn set_contrast(&mut self, level: u8) {
        if level != self.contrast {
            debug!("Contrast {}", level);
            self.contrast = level;
        }
    }

    fn reset(&mut self) {
        trace!("Display reset");
    }
}
