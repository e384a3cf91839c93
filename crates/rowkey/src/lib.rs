pub mod config;
pub mod context;
pub mod domain;
mod error;
mod generator;
mod id;
pub mod lifecycle;
pub mod repository;
mod sync;
mod time;

pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::time::*;
