//! Host UART receive task
//!
//! Accumulates zero-terminated COBS frames, decodes them into command
//! records and hands them to the control loop. Start frames whose
//! program builds are also queued for flash so the program survives a
//! power cycle.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use anneal_core::program::CommandRecord;

use crate::channels::{Frame, PersistRequest, COMMAND_CHANNEL, PERSIST_CHANNEL};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

#[embassy_executor::task]
pub async fn serial_rx_task(mut rx: BufferedUartRx) {
    info!("Serial RX task started");

    let mut frame = Frame::new();
    let mut buf = [0u8; RX_BUF_SIZE];
    // Set while skipping the rest of an oversized frame
    let mut discarding = false;

    loop {
        let n = match rx.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                warn!("UART read error: {:?}", e);
                continue;
            }
        };

        for &byte in &buf[..n] {
            if discarding {
                discarding = byte != 0;
                continue;
            }
            if frame.push(byte).is_err() {
                warn!("Frame exceeds {} bytes, dropped", frame.capacity());
                frame.clear();
                discarding = byte != 0;
                continue;
            }
            if byte == 0 {
                handle_frame(&frame).await;
                frame.clear();
            }
        }
    }
}

async fn handle_frame(frame: &Frame) {
    // Lone terminator between frames
    if frame.len() <= 1 {
        return;
    }

    let mut decoded = frame.clone();
    let record = match CommandRecord::decode_frame(&mut decoded) {
        Ok(record) => record,
        Err(e) => {
            warn!("Bad frame ({} bytes): {:?}", frame.len(), e);
            return;
        }
    };

    // Only programs that build are worth keeping across a power cycle
    if let Err(e) = record.validate() {
        warn!("Rejected command: {:?}", e);
        return;
    }

    if matches!(record, CommandRecord::Start(_))
        && PERSIST_CHANNEL
            .try_send(PersistRequest::Program(frame.clone()))
            .is_err()
    {
        warn!("Persist queue full, program not saved");
    }

    COMMAND_CHANNEL.send(record).await;
}
