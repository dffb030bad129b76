// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Polls for messages on a loop. Run alongside `producer` against the same
//! channel name.

use std::time::Duration;

const CHANNEL: &str = "/zipc-demo";
const QUEUE_SIZE: u32 = 64;
const MESSAGE_SIZE: u32 = 1024;

fn main() -> Result<(), zipc::Error> {
    env_logger::init();

    let receiver = zipc::create_receiver(CHANNEL, QUEUE_SIZE, MESSAGE_SIZE)?;
    println!("consumer: listening on {}", receiver.name());

    loop {
        match receiver.receive()? {
            Some(msg) => println!("received {} bytes: {:?}", msg.len(), msg.as_bytes()),
            None => std::thread::sleep(Duration::from_millis(200)),
        }
    }
}
