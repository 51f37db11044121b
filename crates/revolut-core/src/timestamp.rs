//! Unix timestamps and the clock used for token expiry.
//!
//! Token lifetimes are reported by the API in whole seconds, so expiry instants
//! are tracked as [`UnixTimestamp`] seconds rather than `Instant`s. Anything that
//! needs "now" reads it through a [`Clock`], which lets tests move time forward
//! with a [`ManualClock`] instead of sleeping.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use std::ops::Add;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

/// Seconds since the Unix epoch (1970-01-01T00:00:00Z).
///
/// ```
/// use revolut_core::timestamp::UnixTimestamp;
///
/// let obtained_at = UnixTimestamp::from_secs(1_700_000_000);
/// let expires_at = obtained_at + 2400;
/// assert_eq!(expires_at.as_secs(), 1_700_002_400);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnixTimestamp(u64);

impl UnixTimestamp {
    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Returns the current system time.
    ///
    /// A clock set before the Unix epoch reads as the epoch itself.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self(secs)
    }

    /// Time left until `self`, or zero when `self` is not after `now`.
    pub fn saturating_duration_since(&self, now: UnixTimestamp) -> Duration {
        Duration::from_secs(self.0.saturating_sub(now.0))
    }
}

impl Add<u64> for UnixTimestamp {
    type Output = Self;

    fn add(self, rhs: u64) -> Self::Output {
        UnixTimestamp(self.0.saturating_add(rhs))
    }
}

impl Add<Duration> for UnixTimestamp {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        self + rhs.as_secs()
    }
}

impl Display for UnixTimestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of the current time.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> UnixTimestamp;
}

/// Reads the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> UnixTimestamp {
        UnixTimestamp::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give another
/// to the code under test.
///
/// ```
/// use revolut_core::timestamp::{Clock, ManualClock};
///
/// let clock = ManualClock::at(100);
/// let handle = clock.clone();
/// clock.advance(50);
/// assert_eq!(handle.now().as_secs(), 150);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub fn at(secs: u64) -> Self {
        Self(Arc::new(AtomicU64::new(secs)))
    }

    pub fn set(&self, secs: u64) {
        self.0.store(secs, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) {
        self.0.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> UnixTimestamp {
        UnixTimestamp(self.0.load(Ordering::SeqCst))
    }
}
