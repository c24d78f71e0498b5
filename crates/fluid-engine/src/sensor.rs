//! Sensor plumbing for the sensor-driven gravity policy.
//!
//! The serial transport delivers text payloads whenever a reading arrives,
//! possibly on another thread. [`SensorLink::deliver`] parses the payload and
//! pushes the number into a channel; the tick loop drains the matching
//! [`SensorFeed`] before stepping physics, so gravity is only ever written on
//! the tick thread.

use std::sync::mpsc::{self, Receiver, Sender};

/// Sending half: cheap to clone and safe to move into a transport callback.
#[derive(Debug, Clone)]
pub struct SensorLink {
    tx: Sender<f32>,
}

/// Receiving half, owned by the gravity controller.
#[derive(Debug)]
pub struct SensorFeed {
    rx: Receiver<f32>,
}

/// Create a connected link/feed pair.
pub fn sensor_channel() -> (SensorLink, SensorFeed) {
    let (tx, rx) = mpsc::channel();
    (SensorLink { tx }, SensorFeed { rx })
}

impl SensorLink {
    /// Parse a raw payload and forward it. Returns `false` when the payload is
    /// not a finite decimal number or the feed has been dropped.
    pub fn deliver(&self, payload: &str) -> bool {
        match parse_reading(payload) {
            Some(value) => self.send(value),
            None => {
                log::warn!("Ignoring sensor payload {:?}: not a number", payload);
                false
            }
        }
    }

    /// Forward an already-parsed reading.
    pub fn send(&self, value: f32) -> bool {
        self.tx.send(value).is_ok()
    }
}

impl SensorFeed {
    /// Take every reading that arrived since the last drain, oldest first.
    pub fn drain(&self) -> Vec<f32> {
        self.rx.try_iter().collect()
    }
}

/// The "request a reading" half of the serial transport.
pub trait SensorTransport {
    /// Ask the device to send a fresh reading. Replies arrive via [`SensorLink`].
    fn request_reading(&mut self);
}

/// Parse a sensor payload as a decimal number, ignoring surrounding whitespace.
pub fn parse_reading(payload: &str) -> Option<f32> {
    payload
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn parses_decimal_payloads() {
        assert_eq!(parse_reading("90"), Some(90.0));
        assert_eq!(parse_reading(" 12.5\r\n"), Some(12.5));
        assert_eq!(parse_reading("-3"), Some(-3.0));
        assert_eq!(parse_reading(""), None);
        assert_eq!(parse_reading("tilt"), None);
        assert_eq!(parse_reading("inf"), None);
    }

    #[test]
    fn drain_returns_readings_in_order() {
        let (link, feed) = sensor_channel();
        assert!(link.deliver("1"));
        assert!(!link.deliver("garbage"));
        assert!(link.deliver("2.5"));

        assert_eq!(feed.drain(), vec![1.0, 2.5]);
        assert!(feed.drain().is_empty());
    }

    #[test]
    fn readings_cross_threads() {
        let (link, feed) = sensor_channel();
        let handle = thread::spawn(move || {
            for i in 0..10 {
                link.deliver(&i.to_string());
            }
        });
        handle.join().unwrap();

        let readings = feed.drain();
        assert_eq!(readings.len(), 10);
        assert_eq!(readings.last(), Some(&9.0));
    }

    #[test]
    fn deliver_after_feed_dropped_reports_failure() {
        let (link, feed) = sensor_channel();
        drop(feed);
        assert!(!link.deliver("42"));
    }
}
