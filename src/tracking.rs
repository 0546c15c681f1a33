//! Version-stamped values for cheap staleness checks.

/// A value that knows whether it changed since another copy of itself.
pub trait Trackable {
    type Value;

    fn value(&self) -> &Self::Value;

    /// `true` when both copies were taken at the same version.
    fn same_version(&self, other: &Self) -> bool;
}

/// A counter that only moves forward.
///
/// Clocks compare by counter, so a snapshot can later be checked against the
/// current clock with `>`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonotonicClock(u64);

impl MonotonicClock {
    pub fn new() -> Self {
        Self(0)
    }

    /// Advance the clock by one tick.
    ///
    /// # Panics
    ///
    /// Panics if the counter overflows.
    pub fn increment(&mut self) {
        self.0 = match self.0.checked_add(1) {
            Some(next) => next,
            None => panic!("monotonic clock overflowed"),
        };
    }

    pub fn ticks(&self) -> u64 {
        self.0
    }
}

/// A value paired with a clock that ticks on every mutation.
///
/// Two instances are equal when their clocks are equal; the values themselves
/// are never compared.
///
/// ```rust
/// use oxide_reconcile::MonotonicallyTracked;
///
/// let mut tracked = MonotonicallyTracked::new(vec![1, 2]);
/// let snapshot = tracked.clock();
///
/// tracked.update(|items| items.push(3));
///
/// assert!(tracked.has_changed_since(snapshot));
/// assert_eq!(tracked.value(), &vec![1, 2, 3]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MonotonicallyTracked<T> {
    clock: MonotonicClock,
    value: T,
}

impl<T> MonotonicallyTracked<T> {
    pub fn new(value: T) -> Self {
        Self::with_clock(value, MonotonicClock::new())
    }

    pub fn with_clock(value: T, clock: MonotonicClock) -> Self {
        Self { clock, value }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn clock(&self) -> MonotonicClock {
        self.clock
    }

    /// Replace the value and tick the clock.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.clock.increment();
    }

    /// Mutate the value in place and tick the clock.
    ///
    /// The clock ticks even if `f` leaves the value untouched.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = f(&mut self.value);
        self.clock.increment();
        result
    }

    pub fn has_changed_since(&self, clock: MonotonicClock) -> bool {
        self.clock > clock
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> Trackable for MonotonicallyTracked<T> {
    type Value = T;

    fn value(&self) -> &T {
        &self.value
    }

    fn same_version(&self, other: &Self) -> bool {
        self.clock == other.clock
    }
}

impl<T> PartialEq for MonotonicallyTracked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.same_version(other)
    }
}

impl<T> Eq for MonotonicallyTracked<T> {}
