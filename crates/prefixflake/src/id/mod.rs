mod layout;
mod prefixflake;

pub use layout::*;
pub use prefixflake::*;
