// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the extraction engine.
//!
//! Content problems never surface here: unrecognized lines and unresolved
//! references degrade to sentinels in the output table. Only whole-input
//! failures are errors.

use thiserror::Error;

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while preparing input
#[derive(Error, Debug)]
pub enum Error {
    /// Input bytes are not valid UTF-8 under the strict decoding contract
    #[error("Invalid UTF-8 input: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}
