/*
 * This file is part of Sensorprobe.
 *
 * Copyright (C) 2025 Sensorprobe contributors
 *
 * Sensorprobe is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Sensorprobe is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Sensorprobe. If not, see <https://www.gnu.org/licenses/>.
 */

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use serde_json::json;
use tracing::debug;

use sensorprobe::config::{load_config, try_load_config, ProbeConfig};
use sensorprobe::logger;
use sensorprobe::{CpuSensors, QueryPort, SensorReadings};

const USAGE: &str = "usage: sensorprobe [--json] [--watch] [--count N] [--logging] [--config PATH]";

#[derive(Debug, Default, PartialEq)]
struct Options {
    json: bool,
    watch: bool,
    count: Option<u64>,
    logging: bool,
    config: Option<PathBuf>,
    help: bool,
}

fn parse_args(args: &[String]) -> anyhow::Result<Options> {
    let mut opts = Options::default();
    let mut it = args.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--json" => opts.json = true,
            "--watch" => opts.watch = true,
            "--logging" => opts.logging = true,
            "-h" | "--help" => opts.help = true,
            "--count" => {
                let n: u64 = it
                    .next()
                    .ok_or_else(|| anyhow!("--count needs a value"))?
                    .parse()
                    .context("--count must be a positive integer")?;
                if n == 0 {
                    bail!("--count must be a positive integer");
                }
                opts.count = Some(n);
                opts.watch = true;
            }
            "--config" => {
                let p = it.next().ok_or_else(|| anyhow!("--config needs a path"))?;
                opts.config = Some(PathBuf::from(p));
            }
            other => bail!("unknown argument '{}'\n{}", other, USAGE),
        }
    }
    Ok(opts)
}

fn format_readings(r: &SensorReadings) -> String {
    format!(
        "CPU Temperature: {:.1} °C\nFan Speeds: {:?}\nCPU Voltage: {:.2} V",
        r.cpu_temperature, r.fan_speeds, r.cpu_voltage
    )
}

fn run<Q: QueryPort>(mut sensors: CpuSensors<Q>, opts: &Options, cfg: &ProbeConfig) -> anyhow::Result<()> {
    let mut remaining = opts.count;
    loop {
        let readings = sensors.probe_all();
        logger::log_event("readings", serde_json::to_value(&readings)?);
        if opts.json {
            println!("{}", serde_json::to_string(&readings)?);
        } else {
            println!("{}", format_readings(&readings));
        }

        if !opts.watch {
            return Ok(());
        }
        if let Some(n) = remaining.as_mut() {
            *n -= 1;
            if *n == 0 {
                return Ok(());
            }
        }
        thread::sleep(Duration::from_millis(cfg.poll_interval_ms));
    }
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let opts = parse_args(&args[1..])?;
    if opts.help {
        println!("{}", USAGE);
        return Ok(());
    }

    let log_level = std::env::var("SENSORPROBE_LOG").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(&log_level)
        .with_writer(std::io::stderr)
        .init();

    let cfg = match &opts.config {
        Some(path) => try_load_config(path),
        None => load_config(),
    }
    .map_err(|e| anyhow!("config: {}", e))?;
    debug!("config: {:?}", cfg);

    if opts.logging {
        let path = logger::init_logging(cfg.log_path.as_deref())
            .context("failed to open event log")?;
        debug!("event log: {}", path.display());
        logger::log_event("startup", json!({ "args": args, "config": cfg }));
    }

    #[cfg(windows)]
    let port = sensorprobe::query::WmiQueryPort::new()?;
    #[cfg(not(windows))]
    let port = {
        tracing::warn!("no WMI on this platform; all readings will be unknown");
        sensorprobe::query::Unsupported
    };

    run(CpuSensors::with_config(port, &cfg), &opts, &cfg)
}
