/*!
 * Adaptive pacing of outbound catalog calls
 *
 * One [`RateController`] instance is shared by everything that talks to
 * the catalog. It owns the inter-call delay and the mutual exclusion that
 * keeps at most one logical remote interaction in flight at a time. The
 * delay doubles when the catalog looks rate-limited and shrinks by one
 * fifth on every success, never dropping below its configured floor.
 */

use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

/// Multiplier applied to the delay on each observed success
const REWARD_FACTOR: f64 = 0.8;

/// Shared inter-call delay with mutual exclusion over remote interactions
#[derive(Debug)]
pub struct RateController {
    floor: Duration,
    delay: Mutex<Duration>,
}

impl RateController {
    /// Create a controller whose delay starts at, and never shrinks
    /// below, `floor`.
    pub fn new(floor: Duration) -> Self {
        Self {
            floor,
            delay: Mutex::new(floor),
        }
    }

    /// Begin a remote interaction. The returned session holds the lock for
    /// the whole sleep-then-call-then-adjust sequence; drop it to let the
    /// next caller through.
    pub fn session(&self) -> PacingSession<'_> {
        PacingSession {
            floor: self.floor,
            delay: self.delay.lock().unwrap_or_else(|e| e.into_inner()),
        }
    }

    /// Snapshot of the current delay (for logging and tests)
    pub fn current(&self) -> Duration {
        *self.delay.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Exclusive access to the shared delay for one remote interaction
#[derive(Debug)]
pub struct PacingSession<'a> {
    floor: Duration,
    delay: MutexGuard<'a, Duration>,
}

impl PacingSession<'_> {
    /// The delay currently in force
    pub fn current(&self) -> Duration {
        *self.delay
    }

    /// Block for the current delay. Always called before the remote call,
    /// never after, so pacing front-loads before load hits the catalog.
    pub fn wait(&self) {
        if !self.delay.is_zero() {
            thread::sleep(*self.delay);
        }
    }

    /// The catalog answered normally: shrink the delay toward the floor
    pub fn reward(&mut self) {
        *self.delay = self.delay.mul_f64(REWARD_FACTOR).max(self.floor);
    }

    /// The catalog looks rate-limited: double the delay
    pub fn penalize(&mut self) {
        *self.delay = *self.delay * 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_floor() {
        let controller = RateController::new(Duration::from_millis(100));
        assert_eq!(controller.current(), Duration::from_millis(100));
    }

    #[test]
    fn test_penalize_doubles() {
        let controller = RateController::new(Duration::from_millis(100));
        {
            let mut session = controller.session();
            session.penalize();
            session.penalize();
        }
        assert_eq!(controller.current(), Duration::from_millis(400));
    }

    #[test]
    fn test_penalize_penalize_reward_reward() {
        // D * 2 * 2 * 0.8 * 0.8
        let d = Duration::from_millis(100);
        let controller = RateController::new(d);
        {
            let mut session = controller.session();
            session.penalize();
            session.penalize();
            session.reward();
            session.reward();
        }
        assert_eq!(controller.current(), Duration::from_millis(256));
    }

    #[test]
    fn test_reward_floors_at_default() {
        let d = Duration::from_millis(100);
        let controller = RateController::new(d);
        {
            let mut session = controller.session();
            session.reward();
            session.reward();
            session.reward();
        }
        assert_eq!(controller.current(), d);
    }

    #[test]
    fn test_delay_persists_across_sessions() {
        let controller = RateController::new(Duration::from_millis(50));
        {
            let mut session = controller.session();
            session.penalize();
        }
        let session = controller.session();
        assert_eq!(session.current(), Duration::from_millis(100));
    }

    #[test]
    fn test_zero_floor_never_sleeps() {
        let controller = RateController::new(Duration::ZERO);
        let session = controller.session();
        session.wait(); // must return immediately
        assert_eq!(session.current(), Duration::ZERO);
    }
}
