//! Timestamp sources for chat messages
//!
//! The presentation host owns the clock; the core only asks it for the
//! display timestamp attached to each message.

use chrono::Local;

/// Display format used for message timestamps
pub const TIMESTAMP_FORMAT: &str = "%H:%M:%S";

/// Format used to stamp exported transcript file names
pub const EXPORT_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Supplies timestamps for new messages
pub trait Clock: Send + Sync {
    /// Timestamp for a message created now
    fn timestamp(&self) -> String;

    /// Date and time for naming an exported transcript, `YYYYMMDD_HHMMSS`
    fn export_stamp(&self) -> String {
        Local::now().format(EXPORT_STAMP_FORMAT).to_string()
    }
}

/// Wall clock in the local time zone, formatted as `HH:MM:SS`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn timestamp(&self) -> String {
        Local::now().format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Clock that always reports the same timestamp
///
/// # Examples
///
/// ```
/// use offchat::clock::{Clock, FixedClock};
///
/// let clock = FixedClock::new("09:30:00");
/// assert_eq!(clock.timestamp(), "09:30:00");
/// ```
#[derive(Debug, Clone)]
pub struct FixedClock(String);

impl FixedClock {
    /// Create a clock frozen at `timestamp`
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self(timestamp.into())
    }
}

impl Clock for FixedClock {
    fn timestamp(&self) -> String {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_format() {
        let stamp = SystemClock.timestamp();
        assert_eq!(stamp.len(), 8);
        assert_eq!(stamp.matches(':').count(), 2);
    }

    #[test]
    fn test_export_stamp_format() {
        let stamp = FixedClock::new("00:00:00").export_stamp();
        assert_eq!(stamp.len(), 15);
        assert_eq!(stamp.find('_'), Some(8));
        assert!(stamp.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }
}
