//! `kiln`: load a config and a firing profile, then fire, show or self-check.

mod cli;
mod error_fmt;
mod fire;

use std::path::{Path, PathBuf};

use clap::Parser;
use eyre::{Result, WrapErr};
use kiln_config::{Config, ProfileFallback};
use kiln_core::{FileProfileSource, KilnError, Profile, ProfileSource, RunOutcome};
use serde_json::json;

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{EXIT_ABORTED, exit_code_for_error, format_error_json, humanize};
use crate::fire::FireReport;

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    if let Err(e) = color_eyre::install() {
        eprintln!("warning: could not install error report handler: {e}");
    }

    match real_main(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            if JSON_MODE.get().copied().unwrap_or(false) {
                eprintln!("{}", format_error_json(&e));
            } else {
                eprintln!("error: {e}\n{}", humanize(&e));
            }
            tracing::debug!(error = ?e, "full error report");
            std::process::exit(exit_code_for_error(&e));
        }
    }
}

fn real_main(cli: Cli) -> Result<i32> {
    let cfg = load_config(cli.config.as_deref())?;
    init_tracing(&cli, &cfg.logging);
    let config_dir = cli
        .config
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf);

    match cli.cmd {
        Commands::Fire { wait_button } => {
            let profile = resolve_profile(&cfg, cli.profile.as_deref(), config_dir.as_deref())?;
            let report = fire::run_fire(&cfg, profile, wait_button, cli.json)?;
            print_outcome(&report, cli.json);
            Ok(if report.outcome.is_aborted() {
                EXIT_ABORTED
            } else {
                0
            })
        }
        Commands::Show => {
            let profile = resolve_profile(&cfg, cli.profile.as_deref(), config_dir.as_deref())?;
            print_profile(&profile, cfg.control.ambient_c, cli.json);
            Ok(0)
        }
        Commands::SelfCheck => {
            let report = fire::self_check(&cfg)?;
            if cli.json {
                println!(
                    "{}",
                    json!({ "status": "ok", "backend": report.backend, "temp_c": report.temp_c })
                );
            } else {
                println!(
                    "OK: {} sensor reads {:.2} °C",
                    report.backend, report.temp_c
                );
            }
            Ok(0)
        }
    }
}

/// Read, parse and validate the config. Any failure is a config error.
fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| {
        eyre::Report::new(KilnError::Config(format!(
            "read config {}: {e}",
            path.display()
        )))
    })?;
    let cfg: Config = toml::from_str(&text).map_err(|e| {
        eyre::Report::new(KilnError::Config(format!(
            "parse config {}: {e}",
            path.display()
        )))
    })?;
    cfg.validate()
        .map_err(|e| eyre::Report::new(KilnError::Config(format!("{e:#}"))))
        .wrap_err_with(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// `--profile`, then `[profile] path`, then inline `[profile] phases`.
///
/// Relative paths in the config resolve against the config's directory.
fn resolve_profile(
    cfg: &Config,
    cli_path: Option<&Path>,
    config_dir: Option<&Path>,
) -> Result<Profile> {
    let fallback = cfg.profile.on_error;
    let from_config = cfg.profile.path.as_deref().map(|p| match config_dir {
        Some(dir) if p.is_relative() => dir.join(p),
        _ => p.to_path_buf(),
    });
    let path: Option<PathBuf> = cli_path.map(Path::to_path_buf).or(from_config);

    if let Some(path) = path {
        return FileProfileSource::new(path).with_fallback(fallback).load();
    }
    if let Some(phases) = cfg.profile.phases.as_deref() {
        return Profile::try_from(phases).map_err(|e| eyre::Report::new(KilnError::Profile(e)));
    }
    match fallback {
        ProfileFallback::Empty => {
            tracing::warn!("no profile configured, using empty profile");
            Ok(Profile::empty())
        }
        ProfileFallback::Strict => Err(eyre::Report::new(KilnError::Config(
            "no profile: pass --profile or set [profile] path or phases".into(),
        ))),
    }
}

fn print_outcome(report: &FireReport, json: bool) {
    let dropped = report.dropped_samples;
    match (report.outcome, json) {
        (RunOutcome::Completed { phases, samples }, false) => {
            println!("firing complete: {phases} phases, {samples} samples");
        }
        (RunOutcome::Aborted { phase, samples }, false) => {
            println!("firing aborted in phase {phase} after {samples} samples");
        }
        (RunOutcome::Completed { phases, samples }, true) => {
            println!(
                "{}",
                json!({
                    "status": "completed",
                    "phases": phases,
                    "samples": samples,
                    "dropped_samples": dropped,
                })
            );
        }
        (RunOutcome::Aborted { phase, samples }, true) => {
            println!(
                "{}",
                json!({
                    "status": "aborted",
                    "phase": phase,
                    "samples": samples,
                    "dropped_samples": dropped,
                })
            );
        }
    }
}

fn print_profile(profile: &Profile, ambient_c: f64, json: bool) {
    let rows = profile.phases().iter().enumerate().map(|(i, p)| {
        (
            i,
            profile.start_temperature(i, ambient_c).unwrap_or(ambient_c),
            p.target_c(),
            p.duration_s(),
            profile.gain(i, ambient_c).unwrap_or_default(),
        )
    });
    if json {
        let phases: Vec<_> = rows
            .map(|(i, start, target, dur, gain)| {
                json!({ "phase": i, "start_c": start, "target_c": target, "duration_s": dur, "gain": gain })
            })
            .collect();
        println!(
            "{}",
            json!({ "phases": phases, "total_s": profile.total_duration_s() })
        );
        return;
    }
    if profile.is_empty() {
        println!("empty profile (a firing completes immediately)");
        return;
    }
    println!("phase  start_c  target_c  duration_s  gain_c_per_s");
    for (i, start, target, dur, gain) in rows {
        println!("{i:>5}  {start:>7.1}  {target:>8.1}  {dur:>10}  {gain:>12.4}");
    }
    println!("total: {} s", profile.total_duration_s());
}

fn init_tracing(cli: &Cli, logging: &kiln_config::Logging) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let level = cli
        .log_level
        .clone()
        .or_else(|| logging.level.clone())
        .unwrap_or_else(|| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    // Console goes to stderr; stdout carries results and telemetry.
    let console_json = cli
        .json
        .then(|| fmt::layer().json().with_writer(std::io::stderr));
    let console_text = (!cli.json).then(|| fmt::layer().with_writer(std::io::stderr));

    let file_layer = logging.file.as_deref().map(|file| {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .map_or_else(|| "kiln.log".into(), |n| n.to_os_string());
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        fmt::layer().json().with_ansi(false).with_writer(writer)
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_json)
        .with(console_text)
        .with(file_layer)
        .try_init();
}
