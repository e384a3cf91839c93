//! Ambient dealer partition for the current unit of work.
//!
//! Partition-scoped records need a [`PartitionKey`]. Inside a session the key
//! is fixed, so builders can pick it up from the innermost active scope
//! instead of threading it through every call:
//!
//! - [`with_partition_key`] scopes a key to a closure on the current thread.
//! - `scope_partition_key` (feature `async-tokio`) scopes a key to a future,
//!   following it across `.await` points and worker threads.
//!
//! When both are active the task scope wins. Outside any scope
//! [`current_partition_key`] fails with [`Error::NoContext`]; nothing falls
//! back to a global default.

use core::{cell::RefCell, fmt, str::FromStr};

use crate::error::{Error, Result};

/// Widest partition key storage accepts.
pub const MAX_PARTITION_KEY_LEN: usize = 20;

/// Identifies the dealer (tenant) a record belongs to.
///
/// An opaque, immutable string of 1 to [`MAX_PARTITION_KEY_LEN`] bytes.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartitionKey(String);

impl PartitionKey {
    /// Validates and wraps `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPartitionKey`] if `key` is empty or longer than
    /// [`MAX_PARTITION_KEY_LEN`] bytes.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(Error::InvalidPartitionKey {
                reason: "partition key is empty".to_owned(),
            });
        }
        if key.len() > MAX_PARTITION_KEY_LEN {
            return Err(Error::InvalidPartitionKey {
                reason: format!(
                    "partition key is {} bytes, at most {MAX_PARTITION_KEY_LEN} allowed",
                    key.len()
                ),
            });
        }
        Ok(Self(key))
    }

    /// The key as stored in the partition column.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PartitionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PartitionKey {
    type Error = Error;

    fn try_from(key: String) -> Result<Self> {
        Self::new(key)
    }
}

impl TryFrom<&str> for PartitionKey {
    type Error = Error;

    fn try_from(key: &str) -> Result<Self> {
        Self::new(key)
    }
}

impl FromStr for PartitionKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl From<PartitionKey> for String {
    fn from(key: PartitionKey) -> Self {
        key.0
    }
}

thread_local! {
    static THREAD_KEY: RefCell<Option<PartitionKey>> = const { RefCell::new(None) };
}

#[cfg(feature = "async-tokio")]
tokio::task_local! {
    static TASK_KEY: PartitionKey;
}

/// The partition key of the innermost active scope.
///
/// # Errors
///
/// Returns [`Error::NoContext`] outside every scope.
pub fn current_partition_key() -> Result<PartitionKey> {
    #[cfg(feature = "async-tokio")]
    if let Ok(key) = TASK_KEY.try_with(PartitionKey::clone) {
        return Ok(key);
    }
    THREAD_KEY
        .with_borrow(Option::clone)
        .ok_or(Error::NoContext)
}

/// Runs `f` with `key` as the current thread's partition key.
///
/// Scopes nest; the enclosing key is restored when `f` returns or unwinds.
///
/// # Example
///
/// ```
/// use rowkey::context::{PartitionKey, current_partition_key, with_partition_key};
///
/// let key = PartitionKey::new("D001").unwrap();
/// let seen = with_partition_key(key.clone(), current_partition_key).unwrap();
/// assert_eq!(seen, key);
/// assert!(current_partition_key().is_err());
/// ```
pub fn with_partition_key<R>(key: PartitionKey, f: impl FnOnce() -> R) -> R {
    let _restore = Restore(THREAD_KEY.replace(Some(key)));
    f()
}

struct Restore(Option<PartitionKey>);

impl Drop for Restore {
    fn drop(&mut self) {
        THREAD_KEY.set(self.0.take());
    }
}

/// Runs `future` with `key` as its partition key, across every `.await`.
///
/// # Example
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use rowkey::context::{PartitionKey, current_partition_key, scope_partition_key};
///
/// let key = PartitionKey::new("D002").unwrap();
/// let seen = scope_partition_key(key.clone(), async { current_partition_key() }).await;
/// assert_eq!(seen.unwrap(), key);
/// # }
/// ```
#[cfg_attr(docsrs, doc(cfg(feature = "async-tokio")))]
#[cfg(feature = "async-tokio")]
pub async fn scope_partition_key<F>(key: PartitionKey, future: F) -> F::Output
where
    F: Future,
{
    TASK_KEY.scope(key, future).await
}
