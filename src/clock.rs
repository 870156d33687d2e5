//! Injectable time source used for token expiry checks and retry backoff.

// self
use crate::_prelude::*;

/// Time source consulted by the authenticator and the request pipeline.
///
/// Swapping the clock lets tests observe backoff sleeps and advance token lifetimes without
/// waiting on the wall clock.
pub trait Clock
where
	Self: 'static + Send + Sync,
{
	/// Current UTC instant.
	fn now(&self) -> OffsetDateTime;

	/// Blocks the calling thread for `duration`.
	fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation backed by [`OffsetDateTime::now_utc`] and [`std::thread::sleep`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}

	fn sleep(&self, duration: Duration) {
		if duration.is_positive() {
			std::thread::sleep(duration.unsigned_abs());
		}
	}
}

/// Virtual clock that never blocks: `sleep` advances the current instant and records the
/// requested duration.
#[derive(Debug)]
pub struct ManualClock {
	now: Mutex<OffsetDateTime>,
	sleeps: Mutex<Vec<Duration>>,
}
impl ManualClock {
	/// Creates a clock frozen at `start`.
	pub fn new(start: OffsetDateTime) -> Self {
		Self { now: Mutex::new(start), sleeps: Mutex::default() }
	}

	/// Moves the clock forward without recording a sleep.
	pub fn advance(&self, delta: Duration) {
		*self.now.lock() += delta;
	}

	/// Durations passed to [`Clock::sleep`], in call order.
	pub fn sleeps(&self) -> Vec<Duration> {
		self.sleeps.lock().clone()
	}

	/// Sum of every recorded sleep.
	pub fn total_slept(&self) -> Duration {
		self.sleeps.lock().iter().fold(Duration::ZERO, |acc, value| acc + *value)
	}
}
impl Default for ManualClock {
	fn default() -> Self {
		Self::new(OffsetDateTime::now_utc())
	}
}
impl Clock for ManualClock {
	fn now(&self) -> OffsetDateTime {
		*self.now.lock()
	}

	fn sleep(&self, duration: Duration) {
		self.sleeps.lock().push(duration);

		*self.now.lock() += duration;
	}
}
