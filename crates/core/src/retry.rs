// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::Result;

/// How long a failing action keeps being retried.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryPolicy {
	/// Retry up to the given number of attempts, then rethrow the last error.
	Attempts(u32),
	/// Retry for as long as the action keeps failing.
	Forever,
}

/// Runs an action under a retry policy, logging every failed attempt.
///
/// Each attempt restarts the wrapped orchestrator pass from its persisted
/// cursor, so retrying a partially completed pass is safe: completed work
/// is checkpointed and the rest is reloaded.
pub struct Retry {
	policy: RetryPolicy,
	pause: Duration,
}

pub const DEFAULT_ATTEMPTS: u32 = 10;
pub const DEFAULT_PAUSE: Duration = Duration::from_secs(1);

impl Retry {
	pub fn new(policy: RetryPolicy, pause: Duration) -> Self {
		Self { policy, pause }
	}

	pub fn attempts(attempts: u32) -> Self {
		Self::new(RetryPolicy::Attempts(attempts), DEFAULT_PAUSE)
	}

	pub fn forever() -> Self {
		Self::new(RetryPolicy::Forever, DEFAULT_PAUSE)
	}

	pub fn run<T>(&self, name: &str, mut action: impl FnMut() -> Result<T>) -> Result<T> {
		for attempt in 1u32.. {
			match action() {
				Ok(value) => return Ok(value),
				Err(error) => {
					let exhausted = match self.policy {
						RetryPolicy::Attempts(attempts) => attempt >= attempts,
						RetryPolicy::Forever => false,
					};

					if exhausted {
						warn!(action = name, attempt, %error, "action failed, giving up");
						return Err(error);
					}

					let out_of = match self.policy {
						RetryPolicy::Attempts(attempts) => attempts.to_string(),
						RetryPolicy::Forever => "infinity".to_string(),
					};
					warn!(
						action = name,
						attempt,
						out_of = %out_of,
						pause_millis = self.pause.as_millis() as u64,
						%error,
						"action failed, retrying after pause"
					);
					thread::sleep(self.pause);
				}
			}
		}

		unreachable!("the attempt counter never completes")
	}
}

impl Default for Retry {
	fn default() -> Self {
		Self::attempts(DEFAULT_ATTEMPTS)
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use super::*;
	use crate::Error;

	#[test]
	fn test_succeeds_first_try() {
		let retry = Retry::attempts(3);
		let result = retry.run("noop", || Ok(42));
		assert_eq!(result.unwrap(), 42);
	}

	#[test]
	fn test_retries_until_success() {
		let calls = Cell::new(0u32);
		let retry = Retry::new(RetryPolicy::Attempts(5), Duration::from_millis(1));
		let result = retry.run("flaky", || {
			calls.set(calls.get() + 1);
			if calls.get() < 3 { Err(Error::Source("down".to_string())) } else { Ok("up") }
		});
		assert_eq!(result.unwrap(), "up");
		assert_eq!(calls.get(), 3);
	}

	#[test]
	fn test_attempts_policy_gives_up() {
		let calls = Cell::new(0u32);
		let retry = Retry::new(RetryPolicy::Attempts(4), Duration::from_millis(1));
		let result: Result<()> = retry.run("down", || {
			calls.set(calls.get() + 1);
			Err(Error::Source("down".to_string()))
		});
		assert!(result.is_err());
		assert_eq!(calls.get(), 4);
	}
}
