/// Practice stopwatch, advanced by one second per [`Stopwatch::tick`].
///
/// With a limit it works as a countdown: [`Stopwatch::display`] shows the time left and the
/// watch stops by itself once the limit is reached.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stopwatch {
    elapsed_seconds: u64,
    limit_seconds: Option<u64>,
    running: bool,
}

impl Stopwatch {
    pub fn new() -> Self {
        Stopwatch::default()
    }

    pub fn countdown(limit_seconds: u64) -> Self {
        Stopwatch {
            limit_seconds: Some(limit_seconds),
            ..Stopwatch::default()
        }
    }

    pub fn start(&mut self) {
        if !self.is_finished() {
            self.running = true;
        }
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.pause();
        self.elapsed_seconds = 0;
    }

    /// Returns false when the watch is paused or finished and nothing changed.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }

        self.elapsed_seconds += 1;
        if self.is_finished() {
            self.running = false;
        }
        true
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn remaining(&self) -> Option<u64> {
        self.limit_seconds
            .map(|limit| limit.saturating_sub(self.elapsed_seconds))
    }

    pub fn is_finished(&self) -> bool {
        self.remaining() == Some(0)
    }

    pub fn display(&self) -> String {
        format_hms(self.remaining().unwrap_or(self.elapsed_seconds))
    }
}

pub fn format_hms(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

#[cfg(test)]
mod tests {
    use super::{format_hms, Stopwatch};

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(59), "00:00:59");
        assert_eq!(format_hms(3_723), "01:02:03");
    }

    #[test]
    fn test_stopwatch_counts_only_when_running() {
        let mut watch = Stopwatch::new();

        assert!(!watch.tick());
        watch.start();
        assert!(watch.tick());
        assert!(watch.tick());
        watch.pause();
        assert!(!watch.tick());

        assert_eq!(watch.elapsed(), 2);
        assert_eq!(watch.display(), "00:00:02");

        watch.reset();
        assert_eq!(watch.elapsed(), 0);
        assert!(!watch.is_running());
    }

    #[test]
    fn test_countdown_stops_at_zero() {
        let mut watch = Stopwatch::countdown(2);
        watch.start();

        assert_eq!(watch.display(), "00:00:02");
        watch.tick();
        watch.tick();

        assert!(watch.is_finished());
        assert!(!watch.is_running());
        assert!(!watch.tick());
        assert_eq!(watch.display(), "00:00:00");

        watch.start();
        assert!(!watch.is_running());
    }
}
