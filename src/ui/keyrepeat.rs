//! # Key Repeat Emulation
//!
//! Synthesizes extra Up/Down moves while a navigation key is held: one
//! immediate move on press (applied by the caller), then after an initial
//! delay one move per fixed interval. The machine is driven by the frame
//! loop's clock, so it has to stay correct under uneven polling: if frames
//! are skipped it catches up to the exact number of owed moves, and it never
//! fires twice for an interval already consumed.

use std::time::{Duration, Instant};

pub const INITIAL_DELAY: Duration = Duration::from_millis(200);
pub const REPEAT_INTERVAL: Duration = Duration::from_millis(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
}

#[derive(Debug)]
struct Repeating {
    key: NavKey,
    pressed_at: Instant,
    /// Interval boundaries already consumed since the delay ended.
    fired: u32,
}

/// State machine: `Idle` or `Repeating(key)`. At most one key repeats at a
/// time; pressing a navigation key while another repeats replaces it.
#[derive(Debug, Default)]
pub struct KeyRepeat {
    state: Option<Repeating>,
}

impl KeyRepeat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    /// Record a press. The caller fires the immediate move itself.
    pub fn press(&mut self, key: NavKey, now: Instant) {
        self.state = Some(Repeating {
            key,
            pressed_at: now,
            fired: 0,
        });
    }

    /// Record a release. Releasing a key other than the one currently
    /// repeating is a no-op.
    pub fn release(&mut self, key: NavKey) {
        if self.state.as_ref().is_some_and(|r| r.key == key) {
            self.state = None;
        }
    }

    /// Repeats owed since the last poll, as `(key, count)`.
    ///
    /// The total fired after holding for `T > INITIAL_DELAY` is always
    /// `floor((T - INITIAL_DELAY) / REPEAT_INTERVAL)`, independent of how
    /// often this is called.
    pub fn poll(&mut self, now: Instant) -> Option<(NavKey, u32)> {
        let repeating = self.state.as_mut()?;
        let elapsed = now.duration_since(repeating.pressed_at);
        if elapsed < INITIAL_DELAY {
            return Some((repeating.key, 0));
        }
        let total_due = ((elapsed - INITIAL_DELAY).as_millis() / REPEAT_INTERVAL.as_millis()) as u32;
        let owed = total_due - repeating.fired;
        repeating.fired = total_due;
        Some((repeating.key, owed))
    }

    /// When the frame loop should wake next: the end of the initial delay
    /// while it has not elapsed, afterwards the next unfired interval
    /// boundary. `None` while idle.
    pub fn next_deadline(&self, now: Instant) -> Option<Instant> {
        let repeating = self.state.as_ref()?;
        let elapsed = now.duration_since(repeating.pressed_at);
        if elapsed < INITIAL_DELAY {
            return Some(repeating.pressed_at + INITIAL_DELAY);
        }
        Some(repeating.pressed_at + INITIAL_DELAY + REPEAT_INTERVAL * (repeating.fired + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn idle_produces_nothing() {
        let mut repeat = KeyRepeat::new();
        assert!(repeat.poll(Instant::now()).is_none());
        assert!(repeat.next_deadline(Instant::now()).is_none());
    }

    #[test]
    fn nothing_fires_before_initial_delay() {
        let start = Instant::now();
        let mut repeat = KeyRepeat::new();
        repeat.press(NavKey::Down, start);

        assert_eq!(repeat.poll(start + ms(50)), Some((NavKey::Down, 0)));
        assert_eq!(repeat.poll(start + ms(199)), Some((NavKey::Down, 0)));
    }

    #[test]
    fn hold_250ms_fires_exactly_one_repeat() {
        // 50ms past the delay crosses one 30ms boundary: one repeat, which
        // together with the press move makes two total.
        let start = Instant::now();
        let mut repeat = KeyRepeat::new();
        repeat.press(NavKey::Up, start);

        assert_eq!(repeat.poll(start + ms(250)), Some((NavKey::Up, 1)));
    }

    #[test]
    fn catch_up_without_double_firing() {
        let start = Instant::now();
        let mut repeat = KeyRepeat::new();
        repeat.press(NavKey::Down, start);

        // A long stall: 200ms delay + 10 full intervals elapsed.
        assert_eq!(repeat.poll(start + ms(500)), Some((NavKey::Down, 10)));
        // Immediately polling again owes nothing.
        assert_eq!(repeat.poll(start + ms(500)), Some((NavKey::Down, 0)));
        // One more interval later, exactly one more.
        assert_eq!(repeat.poll(start + ms(530)), Some((NavKey::Down, 1)));
    }

    #[test]
    fn total_count_is_polling_granularity_independent() {
        let start = Instant::now();
        let hold = ms(450); // floor(250 / 30) = 8 repeats owed in total

        for step in [1u64, 7, 16, 100] {
            let mut repeat = KeyRepeat::new();
            repeat.press(NavKey::Down, start);

            let mut total = 0;
            let mut t = ms(0);
            while t < hold {
                t = (t + ms(step)).min(hold);
                if let Some((_, owed)) = repeat.poll(start + t) {
                    total += owed;
                }
            }
            assert_eq!(total, 8, "polling every {step}ms");
        }
    }

    #[test]
    fn release_of_other_key_is_ignored() {
        let start = Instant::now();
        let mut repeat = KeyRepeat::new();
        repeat.press(NavKey::Down, start);

        repeat.release(NavKey::Up);
        assert!(repeat.is_active());

        repeat.release(NavKey::Down);
        assert!(!repeat.is_active());
        assert!(repeat.poll(start + ms(1000)).is_none());
    }

    #[test]
    fn newer_press_replaces_active_repeat() {
        let start = Instant::now();
        let mut repeat = KeyRepeat::new();
        repeat.press(NavKey::Down, start);
        repeat.press(NavKey::Up, start + ms(100));

        // The clock restarts with the new key.
        assert_eq!(repeat.poll(start + ms(250)), Some((NavKey::Up, 0)));
        assert_eq!(repeat.poll(start + ms(330)), Some((NavKey::Up, 1)));
    }

    #[test]
    fn deadline_is_remaining_delay_then_next_boundary() {
        let start = Instant::now();
        let mut repeat = KeyRepeat::new();
        repeat.press(NavKey::Down, start);

        assert_eq!(
            repeat.next_deadline(start + ms(50)),
            Some(start + INITIAL_DELAY)
        );

        // After consuming the first boundary the next one is 260ms in.
        let _ = repeat.poll(start + ms(235));
        assert_eq!(
            repeat.next_deadline(start + ms(235)),
            Some(start + ms(260))
        );
    }
}
