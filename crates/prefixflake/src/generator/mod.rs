mod lock;
mod mutex;
mod sink;
mod status;
#[cfg(test)]
mod tests;

pub use lock::*;
pub use mutex::*;
pub use sink::*;
pub use status::*;
