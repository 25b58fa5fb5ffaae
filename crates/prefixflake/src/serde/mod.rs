//! Field adapters for `#[serde(with = "...")]`.
//!
//! [`PrefixflakeId`](crate::PrefixflakeId) itself serializes transparently
//! as its raw `u64`. The adapters here validate on the way in:
//!
//! - [`as_native`]: the integer form, rejecting a set sign bit.
//! - [`as_text`]: the 13-character text form.

mod id;

pub use id::*;
