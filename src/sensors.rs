//! Sensor adapters.
//!
//! Each adapter is an async loop that pushes [`SensorEvent`]s into a bounded
//! channel and drops samples when the consumer falls behind. Values come from
//! a synthetic drive ([`DriveProfile`]) or from a recorded JSON-lines file.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;
use tokio::time::{interval, sleep, Duration};

use crate::history::STANDARD_GRAVITY;
use crate::samples::{
    AuthorizationStatus, HeadingSample, LocationSample, MotionSample, SensorEvent, TimedEvent,
};

const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Outcome of pushing one event into an adapter channel
enum Delivery {
    Sent,
    Dropped,
    Closed,
}

fn deliver(tx: &Sender<SensorEvent>, event: SensorEvent) -> Delivery {
    match tx.try_send(event) {
        Ok(_) => Delivery::Sent,
        Err(TrySendError::Full(_)) => Delivery::Dropped,
        Err(TrySendError::Closed(_)) => Delivery::Closed,
    }
}

/// Repeating synthetic drive: wait, accelerate, cruise, brake, stop.
#[derive(Debug, Clone, Copy)]
pub struct DriveProfile {
    pub idle_secs: f64,
    pub accelerate_secs: f64,
    pub cruise_secs: f64,
    pub brake_secs: f64,
    /// Cruise speed, m/s
    pub cruise_speed: f64,
    pub start_latitude: f64,
    pub start_longitude: f64,
    /// Heading change while moving, degrees per second
    pub turn_rate: f64,
}

impl Default for DriveProfile {
    fn default() -> Self {
        DriveProfile {
            idle_secs: 5.0,
            accelerate_secs: 10.0,
            cruise_secs: 20.0,
            brake_secs: 8.0,
            cruise_speed: 20.0,
            start_latitude: 37.7749,
            start_longitude: -122.4194,
            turn_rate: 3.0,
        }
    }
}

impl DriveProfile {
    pub fn period(&self) -> f64 {
        self.idle_secs + self.accelerate_secs + self.cruise_secs + self.brake_secs
    }

    /// Speed in m/s at `t` seconds into the drive
    pub fn speed_at(&self, t: f64) -> f64 {
        let t = t.rem_euclid(self.period());
        let accel_end = self.idle_secs + self.accelerate_secs;
        let cruise_end = accel_end + self.cruise_secs;
        if t < self.idle_secs {
            0.0
        } else if t < accel_end {
            self.cruise_speed * (t - self.idle_secs) / self.accelerate_secs
        } else if t < cruise_end {
            self.cruise_speed
        } else {
            let remaining = 1.0 - (t - cruise_end) / self.brake_secs;
            (self.cruise_speed * remaining).max(0.0)
        }
    }

    /// Longitudinal acceleration in m/s² at `t`
    pub fn acceleration_at(&self, t: f64) -> f64 {
        let t = t.rem_euclid(self.period());
        let accel_end = self.idle_secs + self.accelerate_secs;
        let cruise_end = accel_end + self.cruise_secs;
        if t < self.idle_secs {
            0.0
        } else if t < accel_end {
            self.cruise_speed / self.accelerate_secs
        } else if t < cruise_end {
            0.0
        } else {
            -self.cruise_speed / self.brake_secs
        }
    }

    /// User acceleration in g with a small vibration component
    pub fn motion_at(&self, t: f64) -> MotionSample {
        let longitudinal = self.acceleration_at(t) / STANDARD_GRAVITY;
        let moving = self.speed_at(t) > 0.0;
        let vibration = if moving { 0.02 * (t * 31.0).sin() } else { 0.0 };
        MotionSample::new(longitudinal, vibration, vibration * 0.5)
    }
}

/// Location and heading adapter.
///
/// Emits one fix and one heading per `fix_interval`. The first fix has no
/// lock yet and reports speed and accuracies as unavailable.
pub async fn location_loop(tx: Sender<SensorEvent>, profile: DriveProfile, fix_interval: Duration) {
    let mut ticker = interval(fix_interval);
    let dt = fix_interval.as_secs_f64();
    let mut fix_count = 0u64;
    let mut elapsed = 0.0;
    let mut latitude = profile.start_latitude;
    let mut longitude = profile.start_longitude;
    let mut heading: f64 = 0.0;

    loop {
        ticker.tick().await;

        let speed = profile.speed_at(elapsed);
        let sample = if fix_count == 0 {
            LocationSample::new(-1.0, latitude, longitude, 0.0, -1.0, -1.0)
        } else {
            LocationSample::new(speed, latitude, longitude, 12.0, 4.0, 0.5)
        };

        for event in [
            SensorEvent::Location(sample),
            SensorEvent::Heading(HeadingSample::new(heading, 10.0)),
        ] {
            match deliver(&tx, event) {
                Delivery::Sent => {}
                Delivery::Dropped => log::trace!("[location] channel full, fix dropped"),
                Delivery::Closed => {
                    log::debug!("[location] channel closed after {} fixes", fix_count);
                    return;
                }
            }
        }

        fix_count += 1;
        if fix_count % 10 == 0 {
            log::debug!("[location] {} fixes", fix_count);
        }

        // advance along the current heading
        let distance = speed * dt;
        let rad = heading.to_radians();
        latitude += distance * rad.cos() / METERS_PER_DEGREE_LAT;
        longitude +=
            distance * rad.sin() / (METERS_PER_DEGREE_LAT * latitude.to_radians().cos().max(1e-6));
        if speed > 0.0 {
            heading = (heading + profile.turn_rate * dt).rem_euclid(360.0);
        }
        elapsed += dt;
    }
}

/// Device-motion adapter polling at `tick_interval`.
///
/// Every `gap_every`-th tick carries no data (0 disables gaps).
pub async fn motion_loop(
    tx: Sender<SensorEvent>,
    profile: DriveProfile,
    tick_interval: Duration,
    gap_every: u64,
) {
    let mut ticker = interval(tick_interval);
    let dt = tick_interval.as_secs_f64();
    let mut tick_count = 0u64;

    loop {
        ticker.tick().await;
        tick_count += 1;

        let sample = if gap_every > 0 && tick_count % gap_every == 0 {
            None
        } else {
            Some(profile.motion_at(tick_count as f64 * dt))
        };

        match deliver(&tx, SensorEvent::Motion(sample)) {
            Delivery::Sent => {
                if tick_count % 1000 == 0 {
                    log::debug!("[motion] {} ticks", tick_count);
                }
            }
            Delivery::Dropped => {}
            Delivery::Closed => {
                log::debug!("[motion] channel closed after {} ticks", tick_count);
                break;
            }
        }
    }
}

/// Read a recording of one JSON-encoded [`TimedEvent`] per line.
///
/// Blank lines are ignored.
pub fn load_replay(path: &Path) -> Result<Vec<TimedEvent>> {
    let file = File::open(path).with_context(|| format!("opening replay {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut events = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event: TimedEvent = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: malformed event", path.display(), number + 1))?;
        events.push(event);
    }
    Ok(events)
}

/// Play recorded events back with their original spacing, scaled by `speedup`
pub async fn replay_loop(tx: Sender<SensorEvent>, events: Vec<TimedEvent>, speedup: f64) {
    let speedup = if speedup > 0.0 { speedup } else { 1.0 };
    let mut previous: Option<f64> = None;
    let total = events.len();

    for (index, timed) in events.into_iter().enumerate() {
        if let Some(prev) = previous {
            let gap = ((timed.timestamp - prev) / speedup).max(0.0);
            if gap > 0.0 {
                sleep(Duration::from_secs_f64(gap)).await;
            }
        }
        previous = Some(timed.timestamp);

        // replayed events are never dropped
        if tx.send(timed.event).await.is_err() {
            log::debug!("[replay] channel closed after {}/{} events", index, total);
            return;
        }
    }
    log::info!("[replay] finished {} events", total);
}

/// Authorization the synthetic location adapter reports on start-up
pub fn simulated_authorization(deny: bool) -> AuthorizationStatus {
    if deny {
        AuthorizationStatus::Denied
    } else {
        AuthorizationStatus::AuthorizedWhenInUse
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;
    use tokio::sync::mpsc;

    #[test]
    fn test_drive_profile_phases() {
        let profile = DriveProfile::default();
        assert_eq!(profile.speed_at(0.0), 0.0);
        assert_relative_eq!(profile.speed_at(10.0), 10.0, epsilon = 1e-9);
        assert_eq!(profile.speed_at(20.0), 20.0);
        assert_relative_eq!(profile.speed_at(39.0), 10.0, epsilon = 1e-9);
        assert_eq!(profile.speed_at(profile.period()), 0.0);

        assert_relative_eq!(profile.acceleration_at(10.0), 2.0, epsilon = 1e-9);
        assert_relative_eq!(profile.acceleration_at(39.0), -2.5, epsilon = 1e-9);
    }

    #[test]
    fn test_motion_still_when_idle() {
        let profile = DriveProfile::default();
        assert_eq!(profile.motion_at(1.0).magnitude(), 0.0);
        assert!(profile.motion_at(10.0).magnitude() > 0.15);
    }

    #[tokio::test]
    async fn test_motion_loop_emits_gaps() {
        let (tx, mut rx) = mpsc::channel(64);
        let handle = tokio::spawn(motion_loop(
            tx,
            DriveProfile::default(),
            Duration::from_millis(1),
            3,
        ));

        let mut events = Vec::new();
        for _ in 0..6 {
            events.push(rx.recv().await.unwrap());
        }
        drop(rx);
        handle.await.unwrap();

        let gaps = events
            .iter()
            .filter(|e| matches!(e, SensorEvent::Motion(None)))
            .count();
        assert_eq!(gaps, 2);
    }

    #[tokio::test]
    async fn test_location_loop_first_fix_unavailable() {
        let (tx, mut rx) = mpsc::channel(16);
        let handle = tokio::spawn(location_loop(
            tx,
            DriveProfile::default(),
            Duration::from_millis(1),
        ));

        let first = rx.recv().await.unwrap();
        let heading = rx.recv().await.unwrap();
        drop(rx);
        handle.await.unwrap();

        match first {
            SensorEvent::Location(sample) => {
                assert_eq!(sample.speed, -1.0);
                assert_eq!(sample.horizontal_accuracy, -1.0);
            }
            other => panic!("expected location fix, got {:?}", other),
        }
        assert!(matches!(heading, SensorEvent::Heading(_)));
    }

    #[test]
    fn test_load_replay() {
        let path = std::env::temp_dir().join(format!("speedometer_replay_{}.jsonl", std::process::id()));
        {
            let mut file = File::create(&path).unwrap();
            writeln!(
                file,
                r#"{{"timestamp":0.0,"event":{{"kind":"authorization","sample":"AuthorizedAlways"}}}}"#
            )
            .unwrap();
            writeln!(file).unwrap();
            writeln!(
                file,
                r#"{{"timestamp":0.01,"event":{{"kind":"motion","sample":{{"x":0.1,"y":0.0,"z":0.0}}}}}}"#
            )
            .unwrap();
        }

        let events = load_replay(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0].event,
            SensorEvent::Authorization(AuthorizationStatus::AuthorizedAlways)
        );
        assert!(matches!(events[1].event, SensorEvent::Motion(Some(_))));
    }

    #[tokio::test]
    async fn test_replay_loop_delivers_in_order() {
        let events = vec![
            TimedEvent {
                timestamp: 0.0,
                event: SensorEvent::Location(LocationSample::with_speed(1.0)),
            },
            TimedEvent {
                timestamp: 0.002,
                event: SensorEvent::Motion(None),
            },
        ];
        let (tx, mut rx) = mpsc::channel(1);
        let handle = tokio::spawn(replay_loop(tx, events, 1.0));

        assert!(matches!(rx.recv().await, Some(SensorEvent::Location(_))));
        assert_eq!(rx.recv().await, Some(SensorEvent::Motion(None)));
        handle.await.unwrap();
        assert_eq!(rx.recv().await, None);
    }
}
