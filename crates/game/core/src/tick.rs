//! Simulation time.
//!
//! Combat runs on a virtual millisecond clock. Every cooldown, buff duration
//! and attack interval is expressed in ticks so that the whole battle is an
//! integer-time event sequence with no floating-point drift.

/// A point (or span) on the combat timeline, in simulated milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Saturating addition of a span.
    #[must_use]
    pub const fn plus(self, span: Tick) -> Tick {
        Tick(self.0.saturating_add(span.0))
    }

    /// Span between two points; zero if `earlier` is actually later.
    #[must_use]
    pub const fn since(self, earlier: Tick) -> Tick {
        Tick(self.0.saturating_sub(earlier.0))
    }

    /// Duration expressed in whole-and-fractional seconds.
    ///
    /// Used by fitness scoring, which weighs battle length in seconds so the
    /// weight is comparable to damage totals.
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

impl core::fmt::Display for Tick {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}
