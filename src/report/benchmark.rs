//! Utilities to measure how long executing algorithms takes.

use std::time::{Duration, Instant};

/// Measure how long the lambda takes, print the time to stderr, report it
/// under `running_time_ms` and return the lambda's result.
pub fn report_time<Out, F: FnOnce() -> Out>(name: &str, f: F) -> Out {
    eprintln!("starting {}", name);
    let (res, duration) = measure(f);
    let ms = duration.as_secs_f64() * 1000.0;
    eprintln!("{} done - took: {}ms", name, ms);
    crate::report!("running_time_ms", ms);
    res
}

/// Measure how long the lambda takes and return its result with the duration.
pub fn measure<Out, F: FnOnce() -> Out>(f: F) -> (Out, Duration) {
    let start = Instant::now();
    let res = f();
    (res, start.elapsed())
}

/// A stopwatch to repeatedly measure the time passed since it was started.
#[derive(Debug)]
pub struct Timer {
    start: Instant,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    pub fn new() -> Timer {
        Timer { start: Instant::now() }
    }

    pub fn restart(&mut self) {
        self.start = Instant::now();
    }

    pub fn get_passed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn get_passed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }
}
