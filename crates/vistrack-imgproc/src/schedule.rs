//! Cooperative yielding for long pixel scans.
//!
//! The full-frame loops in this crate run on the same execution context as other
//! cooperative tasks (a streaming responder, a watchdog feeder). They call back
//! into a [`CooperativeYield`] every few rows so those tasks keep running. The
//! hook only affects scheduling, never the result of the scan.

/// A hook invoked periodically by long-running pixel scans.
pub trait CooperativeYield {
    /// Give other cooperative tasks a chance to run.
    fn yield_now(&mut self);
}

/// Never yields. Suitable when the pipeline owns its thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoYield;

impl CooperativeYield for NoYield {
    fn yield_now(&mut self) {}
}

/// Yields the current OS thread back to the scheduler.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadYield;

impl CooperativeYield for ThreadYield {
    fn yield_now(&mut self) {
        std::thread::yield_now();
    }
}

impl<F: FnMut()> CooperativeYield for F {
    fn yield_now(&mut self) {
        self()
    }
}

/// Yield after `row` if it falls on the `every_rows` period. A zero period disables yielding.
#[inline]
pub fn yield_on_row<Y: CooperativeYield + ?Sized>(row: usize, every_rows: usize, yielder: &mut Y) {
    if every_rows != 0 && row % every_rows == 0 {
        yielder.yield_now();
    }
}
