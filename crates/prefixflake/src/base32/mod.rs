mod error;
mod interface;
mod rfc4648;

pub use error::*;
pub use interface::*;
pub use rfc4648::{ALPHABET, TEXT_LEN};
