//! Build timing utilities.

use std::time::{Duration, Instant};

/// A simple timer for measuring build phase durations.
pub struct Timer {
    name: String,
    start: Instant,
}

impl Timer {
    /// Start a new timer with the given phase name.
    pub fn start(name: &str) -> Self {
        Self {
            name: name.to_string(),
            start: Instant::now(),
        }
    }

    /// Finish the timer, print the elapsed time and return it.
    pub fn finish(self) -> Duration {
        let elapsed = self.start.elapsed();
        println!("  [{}] {}", format_duration(elapsed), self.name);
        elapsed
    }
}

/// `12.3s` below a minute, `1.5m` above.
pub fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs >= 60.0 {
        format!("{:.1}m", secs / 60.0)
    } else {
        format!("{:.1}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_seconds_and_minutes() {
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.5s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1.5m");
    }
}
