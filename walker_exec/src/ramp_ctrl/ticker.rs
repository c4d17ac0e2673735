//! Step timing and cooperative cancellation
//!
//! All motion timing goes through a [`Ticker`]: after each write the controller asks the ticker
//! to suspend it until the next step is due. Cancellation is only observed at these suspension
//! points so a joint is never left with half a command.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Suspends the caller until the next motion tick is due.
pub trait Ticker {
    fn wait(&mut self, duration: Duration);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Ticker which blocks the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadTicker;

/// Shared flag used to ask a running motion to stop at its next tick.
#[derive(Debug, Default, Clone)]
pub struct CancelToken(Arc<AtomicBool>);

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Ticker for ThreadTicker {
    fn wait(&mut self, duration: Duration) {
        std::thread::sleep(duration)
    }
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the running motion.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst)
    }

    /// Clear a previous cancellation request.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// TEST TICKERS
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) use self::test_tickers::*;

#[cfg(test)]
mod test_tickers {
    use super::*;
    use std::sync::Mutex;

    /// Ticker which returns immediately and records every wait.
    #[derive(Debug, Default, Clone)]
    pub(crate) struct RecordingTicker {
        waits: Arc<Mutex<Vec<Duration>>>,
        cancel_after: Option<(usize, CancelToken)>,
    }

    impl RecordingTicker {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        /// Ticker which raises the token when the `n`th wait happens.
        pub(crate) fn cancelling_after(n: usize, token: CancelToken) -> Self {
            Self {
                cancel_after: Some((n, token)),
                ..Self::default()
            }
        }

        pub(crate) fn waits(&self) -> Vec<Duration> {
            self.waits.lock().unwrap().clone()
        }

        pub(crate) fn total(&self) -> Duration {
            self.waits().iter().sum()
        }
    }

    impl Ticker for RecordingTicker {
        fn wait(&mut self, duration: Duration) {
            let mut waits = self.waits.lock().unwrap();
            waits.push(duration);

            if let Some((n, token)) = &self.cancel_after {
                if waits.len() == *n {
                    token.cancel();
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!token.is_cancelled());

        other.cancel();
        assert!(token.is_cancelled());

        token.reset();
        assert!(!other.is_cancelled());
    }

    #[test]
    fn test_cancelling_ticker() {
        let token = CancelToken::new();
        let mut ticker = RecordingTicker::cancelling_after(2, token.clone());

        ticker.wait(Duration::from_millis(1));
        assert!(!token.is_cancelled());
        ticker.wait(Duration::from_millis(1));
        assert!(token.is_cancelled());
        assert_eq!(ticker.total(), Duration::from_millis(2));
    }
}
