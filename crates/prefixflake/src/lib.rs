#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod base32;
mod category;
mod entity;
mod error;
mod generator;
mod id;
#[cfg(feature = "serde")]
pub mod serde;
mod time;

pub use crate::base32::*;
pub use crate::category::*;
pub use crate::entity::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::time::*;
