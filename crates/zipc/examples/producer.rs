// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sends a fixed message on a loop. Run alongside `consumer` against the
//! same channel name.

use std::time::Duration;

const CHANNEL: &str = "/zipc-demo";
const QUEUE_SIZE: u32 = 64;
const MESSAGE_SIZE: u32 = 1024;
const MESSAGE: &[u8] = b"hello";

fn main() -> Result<(), zipc::Error> {
    env_logger::init();

    let sender = zipc::create_sender(CHANNEL, QUEUE_SIZE, MESSAGE_SIZE)?;
    println!("producer: sending on {}", sender.name());

    loop {
        let sent = sender.send(MESSAGE)?;
        if !sent {
            log::warn!("queue full, message dropped");
        }
        std::thread::sleep(Duration::from_millis(210));
    }
}
