#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Restart schedules for the CDCL search.
//!
//! A restart clears the trail back to decision level 0 while keeping every
//! learned clause and all activity scores. The solver asks its restarter once
//! per conflict; the restarter answers from a conflict countdown.
//!
//! - `Never`: no restarts (the plain CDCL loop).
//! - `Fixed<N>`: every `N` conflicts.
//! - `Geometric<N>`: intervals `100, 100·N, 100·N², …`.
//! - `Luby<N>`: intervals `N·luby(1), N·luby(2), …` (1, 1, 2, 1, 1, 2, 4, …).

use std::fmt::Debug;

const GEOMETRIC_BASE: usize = 100;

pub trait Restarter: Debug + Clone + Send {
    fn new() -> Self;

    /// Conflicts left before the next restart.
    fn restarts_in(&self) -> usize;

    fn set_restarts_in(&mut self, conflicts: usize);

    /// Length of the interval that starts after the restart just performed.
    fn next_interval(&mut self) -> usize;

    fn num_restarts(&self) -> usize;

    fn record_restart(&mut self);

    /// Counts one conflict and reports whether the solver should restart now.
    fn should_restart(&mut self) -> bool {
        let left = self.restarts_in().saturating_sub(1);
        if left == 0 {
            self.record_restart();
            let next = self.next_interval();
            self.set_restarts_in(next);
            true
        } else {
            self.set_restarts_in(left);
            false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Never;

impl Restarter for Never {
    fn new() -> Self {
        Self
    }

    fn restarts_in(&self) -> usize {
        usize::MAX
    }

    fn set_restarts_in(&mut self, _: usize) {}

    fn next_interval(&mut self) -> usize {
        usize::MAX
    }

    fn num_restarts(&self) -> usize {
        0
    }

    fn record_restart(&mut self) {}

    fn should_restart(&mut self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixed<const N: usize> {
    restarts: usize,
    restarts_in: usize,
}

impl<const N: usize> Restarter for Fixed<N> {
    fn new() -> Self {
        Self {
            restarts: 0,
            restarts_in: N.max(1),
        }
    }

    fn restarts_in(&self) -> usize {
        self.restarts_in
    }

    fn set_restarts_in(&mut self, conflicts: usize) {
        self.restarts_in = conflicts;
    }

    fn next_interval(&mut self) -> usize {
        N.max(1)
    }

    fn num_restarts(&self) -> usize {
        self.restarts
    }

    fn record_restart(&mut self) {
        self.restarts += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geometric<const N: usize> {
    restarts: usize,
    restarts_in: usize,
    interval: usize,
}

impl<const N: usize> Restarter for Geometric<N> {
    fn new() -> Self {
        Self {
            restarts: 0,
            restarts_in: GEOMETRIC_BASE,
            interval: GEOMETRIC_BASE,
        }
    }

    fn restarts_in(&self) -> usize {
        self.restarts_in
    }

    fn set_restarts_in(&mut self, conflicts: usize) {
        self.restarts_in = conflicts;
    }

    fn next_interval(&mut self) -> usize {
        self.interval = self.interval.saturating_mul(N.max(1));
        self.interval
    }

    fn num_restarts(&self) -> usize {
        self.restarts
    }

    fn record_restart(&mut self) {
        self.restarts += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Luby<const N: usize> {
    restarts: usize,
    restarts_in: usize,
    /// 1-based position in the Luby sequence of the current interval.
    index: usize,
}

/// The `i`-th (1-based) element of the Luby sequence.
#[must_use]
pub fn luby(mut i: usize) -> usize {
    loop {
        let mut k = 1;
        while (1usize << k) - 1 < i {
            k += 1;
        }
        if i == (1 << k) - 1 {
            return 1 << (k - 1);
        }
        i -= (1 << (k - 1)) - 1;
    }
}

impl<const N: usize> Restarter for Luby<N> {
    fn new() -> Self {
        Self {
            restarts: 0,
            restarts_in: N.max(1),
            index: 1,
        }
    }

    fn restarts_in(&self) -> usize {
        self.restarts_in
    }

    fn set_restarts_in(&mut self, conflicts: usize) {
        self.restarts_in = conflicts;
    }

    fn next_interval(&mut self) -> usize {
        self.index += 1;
        luby(self.index).saturating_mul(N.max(1))
    }

    fn num_restarts(&self) -> usize {
        self.restarts
    }

    fn record_restart(&mut self) {
        self.restarts += 1;
    }
}
