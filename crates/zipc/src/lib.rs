// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A zero-copy, single-producer/single-consumer message channel over named
//! POSIX shared memory, with futex-based blocking receive on Linux.
//!
//! ```text
//!               create_sender("/ch", n, m)      create_receiver("/ch", n, m)
//!                       |                                 |
//!                       v                                 v
//!                 +-----------+                     +-----------+
//!                 |  Sender   |                     | Receiver  |
//!                 +-----------+                     +-----------+
//!                       |                                 |
//!                       `------------> /dev/shm/ch <------'
//!                              [ RegionHeader | slots[] ]
//! ```
//!
//! # Quick start
//!
//! ```no_run
//! let sender = zipc::create_sender("/example", 64, 1024)?;
//! let receiver = zipc::create_receiver("/example", 64, 1024)?;
//!
//! sender.send(b"hello")?;
//! if let Some(msg) = receiver.receive()? {
//!     assert_eq!(msg.as_bytes(), b"hello");
//! }
//!
//! zipc::unlink("/example")?;
//! # Ok::<(), zipc::Error>(())
//! ```
//!
//! Either side may be created first: whichever call wins the race creates
//! and zero-initializes the shared region, and the other attaches to it.
//! Both sides must agree on `queue_size` and `message_size` — a mismatch
//! surfaces as [`Error::ParamMismatch`].

mod context;
mod error;
mod futex;
mod layout;
mod name;
mod params;
mod receiver;
mod ring;
mod segment;
mod sender;
mod wait;

pub use error::{Error, Result};
pub use name::{shm_path, ChannelName, MAX_NAME_LEN};
pub use params::ZipcParams;
pub use receiver::{create_receiver, unlink, Receiver};
pub use ring::Received;
pub use sender::{create_sender, Sender};
