//! Flash persist task
//!
//! Serializes flash writes so the control loop never waits on an erase.

use defmt::*;

use crate::channels::{PersistRequest, PERSIST_CHANNEL};
use crate::flash::FlashStorage;

#[embassy_executor::task]
pub async fn persist_task(mut storage: FlashStorage<'static>) {
    info!("Persist task started");

    loop {
        let result = match PERSIST_CHANNEL.receive().await {
            PersistRequest::Program(frame) => storage.write_program(&frame).await,
            PersistRequest::Contrast(level) => storage.write_contrast(level).await,
        };

        if let Err(e) = result {
            warn!("Flash write failed: {:?}", e);
        }
    }
}
