//! Status display trait

use crate::status::Status;

/// Renders the control loop status
pub trait StatusDisplay {
    /// Render the latest snapshot
    fn update(&mut self, status: &Status);

    /// Force a full redraw on the next update
    fn clear(&mut self);

    /// Set display contrast
    fn set_contrast(&mut self, level: u8);

    /// Re-initialize the display driver circuitry
    fn reset(&mut self);
}
