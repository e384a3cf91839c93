//! Records of the a1stream domain and their value objects.
//!
//! Entities carry a [`Lifecycle`](crate::lifecycle::Lifecycle) and implement
//! [`Persistable`](crate::lifecycle::Persistable); value objects are plain
//! data built with a builder that allocates the id up front.

/// Generates `Option<String>` setters on a builder holding its record in `vo`.
macro_rules! optional_setters {
    (profile: $($field:ident),+ $(,)?) => {
        $(
            #[must_use]
            pub fn $field(mut self, value: impl Into<String>) -> Self {
                self.vo.profile.$field = Some(value.into());
                self
            }
        )+
    };
    ($($field:ident),+ $(,)?) => {
        $(
            #[must_use]
            pub fn $field(mut self, value: impl Into<String>) -> Self {
                self.vo.$field = Some(value.into());
                self
            }
        )+
    };
}

mod color;
mod consumer;

pub use color::*;
pub use consumer::*;

use crate::context::PartitionKey;

/// A record that belongs to exactly one dealer partition.
pub trait PartitionScoped {
    /// The partition this record is stored under.
    fn partition_key(&self) -> &PartitionKey;
}
