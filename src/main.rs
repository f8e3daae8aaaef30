use anyhow::Result;
use chrono::Local;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::time::{interval, sleep, Duration};

use speedometer_rs::display::{self, AccelerationSource, ChartMode, DisplaySettings};
use speedometer_rs::sensors::{self, DriveProfile};
use speedometer_rs::units::gauge_scale_options;
use speedometer_rs::{SensorEvent, TelemetrySnapshot, Tracker};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ChartArg {
    /// Speed history
    Speed,
    /// Speed change between location fixes
    Location,
    /// Device-motion acceleration
    Motion,
}

#[derive(Parser, Debug)]
#[command(name = "speedometer")]
#[command(about = "Live speed, heading and acceleration readout from location and motion sensors", long_about = None)]
struct Args {
    /// Duration in seconds (0 = until the adapters stop)
    #[arg(value_name = "SECONDS", default_value = "0")]
    duration: u64,

    /// Display unit (0 = km/h, 1 = m/s, 2 = mph)
    #[arg(long, default_value = "0")]
    unit: usize,

    /// Speedometer scale (0-3)
    #[arg(long, default_value = "0")]
    scale: usize,

    /// Chart window in motion ticks (300-3000, step 100)
    #[arg(long, default_value = "300")]
    window: u32,

    /// Series summarised in the readout
    #[arg(long, value_enum, default_value = "speed")]
    chart: ChartArg,

    /// Motion tick interval in milliseconds
    #[arg(long, default_value = "10")]
    tick_ms: u64,

    /// Location fix interval in milliseconds
    #[arg(long, default_value = "1000")]
    fix_ms: u64,

    /// Drop the motion sample on every Nth tick (0 = never)
    #[arg(long, default_value = "250")]
    gap_every: u64,

    /// Readout interval in milliseconds
    #[arg(long, default_value = "1000")]
    readout_ms: u64,

    /// Simulate a denied location permission
    #[arg(long)]
    deny_location: bool,

    /// Replay recorded events (JSON lines) instead of the synthetic drive
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Replay speed multiplier
    #[arg(long, default_value = "1.0")]
    speedup: f64,
}

fn ts_now() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

fn settings_from_args(args: &Args) -> Result<DisplaySettings> {
    let mut settings = DisplaySettings::new(args.unit, args.scale, args.window)?;
    let (mode, source) = match args.chart {
        ChartArg::Speed => (ChartMode::Speed, AccelerationSource::Location),
        ChartArg::Location => (ChartMode::Acceleration, AccelerationSource::Location),
        ChartArg::Motion => (ChartMode::Acceleration, AccelerationSource::Motion),
    };
    settings.chart_mode = mode;
    settings.acceleration_source = source;
    Ok(settings)
}

fn print_readout(snapshot: &TelemetrySnapshot) {
    let unit = snapshot.settings.unit;
    let gauge = display::gauge(snapshot);
    let (lat, lon) = display::coordinate_readout(snapshot);

    println!(
        "[{}] {} {}  [{:>3.0}% of {}]  {}",
        ts_now(),
        display::speed_readout(snapshot),
        unit.label(),
        gauge.fraction() * 100.0,
        gauge.max,
        display::acceleration_readout(snapshot),
    );
    println!(
        "    {}   {}  {}",
        display::heading_readout(snapshot),
        lat,
        lon
    );
    println!(
        "    {} | {} | {}",
        display::heading_accuracy_readout(snapshot),
        display::horizontal_accuracy_readout(snapshot),
        display::speed_accuracy_readout(snapshot),
    );

    let series = display::chart_series(snapshot);
    if let Some(last) = series.last() {
        let min = series.iter().copied().fold(f64::INFINITY, f64::min);
        let max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        println!(
            "    chart {:?}/{:?} over {}: {} pts, min {:.2}, max {:.2}, last {:.2}",
            snapshot.settings.chart_mode,
            snapshot.settings.acceleration_source,
            display::window_label(snapshot.settings.window_length),
            series.len(),
            min,
            max,
            last
        );
    }

    if let Some(status) = display::status_line(snapshot) {
        println!("    {}", status);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let settings = settings_from_args(&args)?;
    log::info!(
        "Speedometer starting: unit {}, scale {}, window {}",
        settings.unit.label(),
        settings.speedometer_scale,
        display::window_label(settings.window_length)
    );
    log::info!(
        "Gauge scales ({}): {:?}",
        settings.unit.label(),
        gauge_scale_options(settings.unit)
    );

    let tracker = Tracker::new(settings);
    let (tx, mut rx) = mpsc::channel::<SensorEvent>(1024);
    let mut handles = Vec::new();

    match &args.replay {
        Some(path) => {
            let events = sensors::load_replay(path)?;
            log::info!("Replaying {} events from {}", events.len(), path.display());
            handles.push(tokio::spawn(sensors::replay_loop(tx.clone(), events, args.speedup)));
        }
        None => {
            let profile = DriveProfile::default();
            let status = sensors::simulated_authorization(args.deny_location);
            if tracker.apply_authorization(status)? {
                handles.push(tokio::spawn(sensors::location_loop(
                    tx.clone(),
                    profile,
                    Duration::from_millis(args.fix_ms.max(1)),
                )));
            }
            handles.push(tokio::spawn(sensors::motion_loop(
                tx.clone(),
                profile,
                Duration::from_millis(args.tick_ms.max(1)),
                args.gap_every,
            )));
        }
    }

    // adapters hold the only senders from here on
    drop(tx);

    let mut readout = interval(Duration::from_millis(args.readout_ms.max(1)));
    let deadline = sleep(Duration::from_secs(args.duration));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => {
                    tracker.handle_event(&event)?;
                }
                None => {
                    log::info!("All sensor adapters stopped");
                    break;
                }
            },
            _ = readout.tick() => print_readout(&tracker.snapshot()?),
            _ = &mut deadline, if args.duration > 0 => {
                log::info!("Duration reached, stopping");
                break;
            }
        }
    }

    for handle in &handles {
        handle.abort();
    }

    let snapshot = tracker.snapshot()?;
    print_readout(&snapshot);
    let counters = snapshot.counters;
    log::info!(
        "Processed {} location fixes, {} headings, {} motion ticks ({} without data)",
        counters.location_updates,
        counters.heading_updates,
        counters.motion_ticks,
        counters.skipped_motion_ticks
    );

    Ok(())
}
