use std::future::Future;
use std::time::Duration;

use tokio::time::Timeout;

pub trait FutureTimeout: Future + Sized {
	/// Fails with [`tokio::time::error::Elapsed`] if the future takes longer
	/// than `duration`.
	fn timeout(self, duration: Duration) -> Timeout<Self> {
		tokio::time::timeout(duration, self)
	}
}

impl<F: Future> FutureTimeout for F {}
