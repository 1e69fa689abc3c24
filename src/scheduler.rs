// Periodic spawn and income ticks.
//
// One browser interval feeds measured elapsed time into a cadence per action; each
// cadence fires once for every whole period elapsed, so a throttled background tab
// catches up on income. Spawn catch-up stops at one grid's worth of ticks.
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use crate::config::GameConfig;
use crate::constants::SLOT_COUNT;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    Spawn,
    Income,
}

#[derive(Clone, Debug)]
struct Cadence {
    period_ms: u64,
    elapsed_ms: u64,
}

impl Cadence {
    fn new(period_ms: u32) -> Self {
        Self {
            period_ms: u64::from(period_ms.max(1)),
            elapsed_ms: 0,
        }
    }

    fn advance(&mut self, dt_ms: u64) -> u64 {
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
        let fired = self.elapsed_ms / self.period_ms;
        self.elapsed_ms %= self.period_ms;
        fired
    }
}

#[derive(Clone, Debug)]
pub struct Scheduler {
    spawn: Cadence,
    income: Cadence,
    max_spawn_burst: u64,
}

impl Scheduler {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            spawn: Cadence::new(config.spawn_interval_ms),
            income: Cadence::new(config.income_interval_ms),
            max_spawn_burst: SLOT_COUNT as u64,
        }
    }

    /// Advance both timers by `dt_ms` and return the ticks that came due, spawns first.
    /// Spawns beyond what could fill an empty grid are discarded.
    pub fn advance(&mut self, dt_ms: u64) -> Vec<Tick> {
        let spawns = self.spawn.advance(dt_ms).min(self.max_spawn_burst);
        let incomes = self.income.advance(dt_ms);
        let mut due = Vec::with_capacity((spawns + incomes) as usize);
        due.extend((0..spawns).map(|_| Tick::Spawn));
        due.extend((0..incomes).map(|_| Tick::Income));
        due
    }
}

/// A running `setInterval`; cleared on drop.
pub struct Interval {
    id: i32,
    _callback: Closure<dyn FnMut()>,
}

impl Interval {
    pub fn start(period_ms: u32, f: impl FnMut() + 'static) -> Option<Self> {
        let window = web_sys::window()?;
        let callback = Closure::wrap(Box::new(f) as Box<dyn FnMut()>);
        let id = window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                period_ms as i32,
            )
            .ok()?;
        Some(Self {
            id,
            _callback: callback,
        })
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            window.clear_interval_with_handle(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(ticks: &[Tick], kind: Tick) -> usize {
        ticks.iter().filter(|t| **t == kind).count()
    }

    #[test]
    fn test_nothing_fires_before_period() {
        let mut s = Scheduler::new(&GameConfig::default());
        assert!(s.advance(2_999).is_empty());
        assert_eq!(s.advance(1), vec![Tick::Spawn]);
    }

    #[test]
    fn test_steady_quarter_second_feed() {
        let mut s = Scheduler::new(&GameConfig::default());
        let mut all = Vec::new();
        for _ in 0..(30_000 / 250) {
            all.extend(s.advance(250));
        }
        assert_eq!(count(&all, Tick::Spawn), 10);
        assert_eq!(count(&all, Tick::Income), 3);
    }

    #[test]
    fn test_long_gap_catches_up() {
        let mut s = Scheduler::new(&GameConfig::default());
        let due = s.advance(61_000);
        assert_eq!(count(&due, Tick::Spawn), SLOT_COUNT);
        assert_eq!(count(&due, Tick::Income), 6);
        // remainder carries over: 1s of spawn, 1s of income
        assert_eq!(s.advance(2_000), vec![Tick::Spawn]);
        assert_eq!(count(&s.advance(7_000), Tick::Income), 1);
    }

    #[test]
    fn test_day_long_sleep_caps_spawns_not_income() {
        let mut s = Scheduler::new(&GameConfig::default());
        let due = s.advance(86_400_000);
        assert_eq!(count(&due, Tick::Spawn), SLOT_COUNT);
        assert_eq!(count(&due, Tick::Income), 8_640);
        assert!(s.advance(250).is_empty());
    }

    #[test]
    fn test_timers_are_independent() {
        let cfg = GameConfig {
            spawn_interval_ms: 100,
            income_interval_ms: 1_000,
            ..Default::default()
        };
        let mut s = Scheduler::new(&cfg);
        let due = s.advance(1_000);
        assert_eq!(count(&due, Tick::Spawn), 10);
        assert_eq!(count(&due, Tick::Income), 1);
    }

    #[test]
    fn test_zero_period_is_clamped() {
        let cfg = GameConfig {
            spawn_interval_ms: 0,
            ..Default::default()
        };
        let mut s = Scheduler::new(&cfg);
        assert_eq!(count(&s.advance(3), Tick::Spawn), 3);
    }
}
