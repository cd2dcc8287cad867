//! Purpose: Define the stable public Rust API boundary for hadata.
//! Exports: Classified values, decode traits, error types, date helpers, and key paths.
//! Role: Public, additive-only surface; callers should not reach into `core` directly.
//! Invariants: Every decode operation exposed here is pure and synchronous.
//! Invariants: Error kinds and exit codes re-exported here are stable.

mod path;

pub use crate::core::date::{TIMESTAMP_FORMAT, format_timestamp, parse_timestamp};
pub use crate::core::decode::{Decodable, FromData, GetChecked, describe};
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{DecodeError, Error, ErrorKind};
pub use crate::core::value::{Data, Shape};
pub use path::{KeyPath, Segment};
