//! Lock aliases shared by the generators and the in-memory repository.
//!
//! With `parking-lot` the locks cannot poison and every helper here is
//! infallible in practice. Without it the std locks are used and poisoning
//! surfaces as [`Error::LockPoisoned`].
//!
//! [`Error::LockPoisoned`]: crate::Error

#[cfg(not(feature = "parking-lot"))]
pub(crate) use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[cfg(feature = "parking-lot")]
pub(crate) use parking_lot::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::Result;

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    #[cfg(feature = "parking-lot")]
    {
        Ok(mutex.lock())
    }
    #[cfg(not(feature = "parking-lot"))]
    {
        Ok(mutex.lock()?)
    }
}

pub(crate) fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    #[cfg(feature = "parking-lot")]
    {
        Ok(lock.read())
    }
    #[cfg(not(feature = "parking-lot"))]
    {
        Ok(lock.read()?)
    }
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    #[cfg(feature = "parking-lot")]
    {
        Ok(lock.write())
    }
    #[cfg(not(feature = "parking-lot"))]
    {
        Ok(lock.write()?)
    }
}
