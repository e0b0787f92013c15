// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use chrono::{DateTime, Utc};
use class_alloc_model::loader;
use class_alloc_solver::prelude::{EngineConfig, SchedulingEngine};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage: class-alloc <classes.csv> <students.csv> [options]

Options:
  --rain-classes <file>   Explicit rain-day class catalog
  --existing <file>       Existing normal schedule to carry over
  --existing-rain <file>  Existing rain schedule to carry over
  --out-dir <dir>         Output directory (default: current directory)
  --fill                  Randomly fill remaining holes
  --seed <n>              RNG seed for the hole filler (default: 0)
  --attempts <n>          Restart attempts (default: 100)
";

#[derive(Debug)]
struct Args {
    classes: PathBuf,
    students: PathBuf,
    rain_classes: Option<PathBuf>,
    existing: Option<PathBuf>,
    existing_rain: Option<PathBuf>,
    out_dir: PathBuf,
    fill: bool,
    seed: u64,
    attempts: usize,
}

fn parse_args() -> Result<Args, String> {
    let mut positional: Vec<PathBuf> = Vec::new();
    let mut rain_classes = None;
    let mut existing = None;
    let mut existing_rain = None;
    let mut out_dir = PathBuf::from(".");
    let mut fill = false;
    let mut seed = 0u64;
    let mut attempts = class_alloc_solver::prelude::DEFAULT_ATTEMPTS;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .ok_or_else(|| format!("{name} requires a value"))
        };
        match arg.as_str() {
            "--rain-classes" => rain_classes = Some(PathBuf::from(value("--rain-classes")?)),
            "--existing" => existing = Some(PathBuf::from(value("--existing")?)),
            "--existing-rain" => existing_rain = Some(PathBuf::from(value("--existing-rain")?)),
            "--out-dir" => out_dir = PathBuf::from(value("--out-dir")?),
            "--fill" => fill = true,
            "--seed" => {
                seed = value("--seed")?
                    .parse()
                    .map_err(|_| "--seed expects an integer".to_string())?;
            }
            "--attempts" => {
                attempts = value("--attempts")?
                    .parse()
                    .map_err(|_| "--attempts expects an integer".to_string())?;
            }
            "--help" | "-h" => return Err(USAGE.to_string()),
            other if other.starts_with("--") => {
                return Err(format!("Unknown option: {other}\n\n{USAGE}"));
            }
            other => positional.push(PathBuf::from(other)),
        }
    }

    if positional.len() != 2 {
        return Err(USAGE.to_string());
    }
    let mut positional = positional.into_iter();
    Ok(Args {
        classes: positional.next().unwrap_or_default(),
        students: positional.next().unwrap_or_default(),
        rain_classes,
        existing,
        existing_rain,
        out_dir,
        fill,
        seed,
        attempts,
    })
}

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

#[derive(Serialize)]
struct RunRecord {
    start_ts: DateTime<Utc>,
    end_ts: DateTime<Utc>,
    runtime_ms: u128,
    students: usize,
    classes: usize,
    missing: usize,
}

fn write_output(path: &Path, contents: &str) {
    match std::fs::write(path, contents) {
        Ok(()) => tracing::info!("Wrote {}", path.display()),
        Err(e) => tracing::error!("Failed to write results to {}: {}", path.display(), e),
    }
}

fn run(args: Args) -> Result<usize, Box<dyn std::error::Error>> {
    let catalog = loader::load_catalog_from_path(&args.classes)?;
    let (mut roster, mut warnings) = loader::load_roster_from_path(&args.students)?;

    let rain_catalog = match &args.rain_classes {
        Some(path) => Some(loader::load_catalog_from_path(path)?),
        None => None,
    };
    let existing = match &args.existing {
        Some(path) => {
            let (schedule, w) = loader::load_existing_schedule_from_path(path, &mut roster)?;
            warnings.extend(w);
            Some(schedule)
        }
        None => None,
    };
    let existing_rain = match &args.existing_rain {
        Some(path) => {
            let (schedule, w) = loader::load_existing_schedule_from_path(path, &mut roster)?;
            warnings.extend(w);
            Some(schedule)
        }
        None => None,
    };

    tracing::info!(
        "Scheduling {} students across {} classes ({} periods)",
        roster.len(),
        catalog.len(),
        catalog.num_periods()
    );

    let num_students = roster.len();
    let num_classes = catalog.len();

    let mut engine = SchedulingEngine::new(catalog, roster).with_config(EngineConfig {
        attempts: args.attempts,
        fill_holes: args.fill,
        seed: args.seed,
    });
    if let Some(c) = rain_catalog {
        engine = engine.with_rain_catalog(c);
    }
    if let Some(e) = existing {
        engine = engine.with_existing_schedule(e);
    }
    if let Some(e) = existing_rain {
        engine = engine.with_existing_rain_schedule(e);
    }

    let start_ts = Utc::now();
    let t0 = Instant::now();
    let outcome = engine.solve_with_warnings(warnings);
    let runtime = t0.elapsed();
    let end_ts = Utc::now();

    std::fs::create_dir_all(&args.out_dir)?;
    write_output(&args.out_dir.join("assignments.csv"), &outcome.assignments_csv());
    write_output(&args.out_dir.join("class-sizes.csv"), &outcome.class_sizes_csv());
    write_output(
        &args.out_dir.join("rain-assignments.csv"),
        &outcome.rain_assignments_csv(),
    );
    write_output(
        &args.out_dir.join("rain-class-sizes.csv"),
        &outcome.rain_class_sizes_csv(),
    );

    let record = RunRecord {
        start_ts,
        end_ts,
        runtime_ms: runtime.as_millis(),
        students: num_students,
        classes: num_classes,
        missing: outcome.missing(),
    };
    let record_path = args.out_dir.join("run-record.json");
    match serde_json::to_string_pretty(&record) {
        Ok(json) => write_output(&record_path, &json),
        Err(e) => tracing::error!("Failed to serialize run record: {}", e),
    }

    eprint!("{}", outcome.log());
    tracing::info!(
        "Done in {:?}; {} students without a full schedule",
        runtime,
        outcome.missing()
    );
    Ok(outcome.missing())
}

fn main() -> ExitCode {
    enable_tracing();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    match run(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
