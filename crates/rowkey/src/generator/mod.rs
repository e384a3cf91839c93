mod atomic;
mod backoff;
mod interface;
mod lock;
mod source;
mod status;
#[cfg(test)]
mod tests;

pub use atomic::*;
pub use backoff::*;
pub use interface::*;
pub use lock::*;
pub use source::*;
pub use status::*;
