use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::clock::Clock;
use crate::rtc::Rtc;

/// Device-wide [`Rtc`] guarded by a critical section.
///
/// Every read-modify-write of the alarm slot happens inside one
/// [`SharedRtc::lock`] call, so an interrupt cannot observe it half done.
/// Calls must not nest.
pub struct SharedRtc<C> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Rtc<C>>>,
}

impl<C: Clock> SharedRtc<C> {
    pub const fn new(rtc: Rtc<C>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(rtc)),
        }
    }

    pub fn lock<R>(&self, f: impl FnOnce(&mut Rtc<C>) -> R) -> R {
        self.inner.lock(|rtc| f(&mut rtc.borrow_mut()))
    }
}
