//! skytrace CLI - offline track replay.
//!
//! Parses a recorded track file (plain or gzip CSV), re-runs altitude
//! fusion, trims the flight segment, and prints a summary. Optionally
//! writes the trimmed points back out as CSV.

use std::path::PathBuf;
use std::process;

use clap::Parser;

use skytrace::track::{auto_trim, read_track, TrackPoint, DEFAULT_TRIM_MARGIN};

#[derive(Parser)]
#[command(name = "skytrace")]
#[command(about = "Replay and trim a recorded flight track", long_about = None)]
struct Args {
    /// Track file to replay (.csv or .csv.gz)
    #[arg(long)]
    input: PathBuf,

    /// Keep the full track instead of trimming to the flight segment
    #[arg(long)]
    no_trim: bool,

    /// Samples of margin kept around the flight segment
    #[arg(long, default_value_t = DEFAULT_TRIM_MARGIN)]
    margin: usize,

    /// Write the resulting points as CSV to this path
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    // Keep the guard alive so the file writer flushes on exit
    let _logging = skytrace::logging::init_logging(
        skytrace::logging::default_log_dir(),
        skytrace::logging::default_log_file(),
    );
    tracing::info!(path = %args.input.display(), "Replaying track");

    let points = match read_track(&args.input) {
        Ok(points) => points,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };
    if points.is_empty() {
        eprintln!("No usable rows in {}", args.input.display());
        process::exit(1);
    }

    let result: &[TrackPoint] = if args.no_trim {
        &points
    } else {
        auto_trim(&points, args.margin)
    };

    print_summary(&points, result);

    if let Some(output) = args.output {
        if let Err(e) = write_csv(&output, result) {
            eprintln!("Error writing {}: {e}", output.display());
            process::exit(1);
        }
        println!("Wrote {} points to {}", result.len(), output.display());
    }
}

/// Elapsed seconds between the first and last point.
///
/// Out-of-order rows can leave the last timestamp behind the first, so the
/// difference saturates to zero rather than wrapping.
fn duration_seconds(points: &[TrackPoint]) -> f64 {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) => {
            last.measurement
                .time_millis
                .saturating_sub(first.measurement.time_millis) as f64
                / 1000.0
        }
        _ => 0.0,
    }
}

fn print_summary(full: &[TrackPoint], trimmed: &[TrackPoint]) {
    let duration_s = duration_seconds(trimmed);
    let mut min_alt = f64::INFINITY;
    let mut max_alt = f64::NEG_INFINITY;
    let mut max_descent = 0.0f64;
    for point in trimmed {
        min_alt = min_alt.min(point.measurement.altitude_msl);
        max_alt = max_alt.max(point.measurement.altitude_msl);
        if point.measurement.climb_rate < max_descent {
            max_descent = point.measurement.climb_rate;
        }
    }

    println!("Parsed {} points, kept {}", full.len(), trimmed.len());
    println!("Duration:    {duration_s:.1} s");
    println!("Altitude:    {min_alt:.0} - {max_alt:.0} m MSL");
    println!("Max descent: {max_descent:.1} m/s");
}

fn write_csv(path: &PathBuf, points: &[TrackPoint]) -> std::io::Result<()> {
    use std::io::Write;
    let mut file = std::fs::File::create(path)?;
    writeln!(file, "millis,lat,lon,hMSL,climb,velN,velE")?;
    for point in points {
        let m = &point.measurement;
        writeln!(
            file,
            "{},{},{},{},{},{},{}",
            m.time_millis,
            m.latitude,
            m.longitude,
            m.altitude_msl,
            m.climb_rate,
            m.velocity_north,
            m.velocity_east
        )?;
    }
    Ok(())
}
