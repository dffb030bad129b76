// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Channel naming: validation and the name -> filesystem path mapping.
//!
//! A channel name is a short, `/`-prefixed string that deterministically
//! maps to a path in the OS shared-memory namespace (`/dev/shm` on Linux).
//! Validation rules follow `spec.md` §3/§6, generalizing
//! `ShmSegment::validate_name` from the teacher's
//! `transport::shm::segment` module to this crate's 39-character limit.

use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// Maximum channel name length, not counting the terminator.
pub const MAX_NAME_LEN: usize = 39;

/// Directory POSIX shared memory objects live under on Linux.
const SHM_DIR: &str = "/dev/shm";

/// A validated channel name.
///
/// Construction is the only place validation happens; every later use
/// (segment creation, open, unlink, `shm_path`) trusts the invariant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelName(String);

impl ChannelName {
    /// Validate and wrap a channel name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NameTooLong`] if `name` exceeds [`MAX_NAME_LEN`]
    /// bytes, or [`Error::NameInvalid`] if it does not start with `/` or
    /// contains an embedded `/`.
    pub fn new(name: &str) -> Result<Self> {
        if name.len() > MAX_NAME_LEN {
            return Err(Error::NameTooLong { len: name.len() });
        }
        if !name.starts_with('/') {
            return Err(Error::NameInvalid(format!(
                "channel name must start with '/': {name}"
            )));
        }
        if name.len() > 1 && name[1..].contains('/') {
            return Err(Error::NameInvalid(format!(
                "channel name must not contain '/' after the leading slash: {name}"
            )));
        }
        if name.len() == 1 {
            return Err(Error::NameInvalid("channel name must not be bare '/'".into()));
        }
        Ok(Self(name.to_string()))
    }

    /// The raw name string, including the leading `/`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The absolute filesystem path backing this channel's shared region.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        Path::new(SHM_DIR).join(self.0.trim_start_matches('/'))
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Return the absolute filesystem path for a channel name, validating it
/// first.
///
/// # Errors
///
/// Returns [`Error::NameTooLong`] / [`Error::NameInvalid`] for malformed
/// names.
pub fn shm_path(name: &str) -> Result<PathBuf> {
    Ok(ChannelName::new(name)?.path())
}
