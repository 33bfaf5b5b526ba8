//! Hardware assembly and the `fire` / `self-check` commands.

use std::io::Write;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::Receiver;
use eyre::{Result, WrapErr};
use kiln_config::Config;
use kiln_core::{
    ChannelSink, KilnError, Profile, ProgressSample, RampCfg, RampRunner, RunOptions, RunOutcome,
    TracingSink,
};
use kiln_traits::{Heater, TemperatureSensor};
use serde_json::json;

use crate::error_fmt::EXIT_ABORTED;

/// Progress samples buffered for the JSON writer before the sink starts dropping.
const TELEMETRY_CAPACITY: usize = 256;

/// Sensor, heater and optional button for one process.
pub struct Ports {
    pub sensor: Box<dyn TemperatureSensor>,
    pub heater: Box<dyn Heater>,
    pub button: Option<Rc<dyn Fn() -> bool>>,
    pub backend: &'static str,
}

/// How a firing ended, plus telemetry lost on the way.
#[derive(Debug, Clone, Copy)]
pub struct FireReport {
    pub outcome: RunOutcome,
    /// JSON samples the writer thread could not keep up with.
    pub dropped_samples: u64,
}

/// Result of `self-check`.
#[derive(Debug, Clone, Copy)]
pub struct CheckReport {
    pub backend: &'static str,
    pub temp_c: f64,
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn sim_kiln(cfg: &Config) -> kiln_hardware::SimulatedKiln {
    kiln_hardware::SimulatedKiln::new(kiln_hardware::SimParams {
        initial_c: cfg.sim.initial_c,
        ambient_c: cfg.control.ambient_c,
        heat_c_per_sample: cfg.sim.heat_c_per_sample,
        loss_per_sample: cfg.sim.loss_per_sample,
    })
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
pub fn assemble(cfg: &Config) -> Result<Ports> {
    let kiln = sim_kiln(cfg);
    tracing::info!(
        initial_c = cfg.sim.initial_c,
        heat_c_per_sample = cfg.sim.heat_c_per_sample,
        "using simulated kiln"
    );
    Ok(Ports {
        sensor: Box::new(kiln.sensor()),
        heater: Box::new(kiln.heater()),
        button: None,
        backend: "sim",
    })
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub fn assemble(cfg: &Config) -> Result<Ports> {
    use kiln_hardware::{MaskedSensor, Max6675, RelayHeater, make_button_checker};

    let p = &cfg.pins;
    // Relay first so the element is driven off as early as possible.
    let heater = RelayHeater::new(p.relay, cfg.hardware.relay_active_low)
        .map_err(eyre::Report::new)
        .wrap_err("open relay pin")?;
    let tc = Max6675::new(p.thermo_clk, p.thermo_cs, p.thermo_do)
        .map_err(eyre::Report::new)
        .wrap_err("open thermocouple pins")?;
    let button: Option<Rc<dyn Fn() -> bool>> = match p.button {
        Some(pin) => {
            let check = make_button_checker(pin, cfg.hardware.button_active_low)
                .map_err(eyre::Report::new)
                .wrap_err("open button pin")?;
            tracing::info!(
                pin,
                active_low = cfg.hardware.button_active_low,
                "button enabled"
            );
            Some(Rc::new(check))
        }
        None => None,
    };
    Ok(Ports {
        sensor: Box::new(MaskedSensor::new(tc, cfg.control.ambient_c)),
        heater: Box::new(heater),
        button,
        backend: "max6675",
    })
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
pub fn self_check(cfg: &Config) -> Result<CheckReport> {
    let mut sensor = sim_kiln(cfg).sensor();
    Ok(CheckReport {
        backend: "sim",
        temp_c: sensor.read_celsius(),
    })
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub fn self_check(cfg: &Config) -> Result<CheckReport> {
    use kiln_hardware::{Max6675, RelayHeater};

    let p = &cfg.pins;
    RelayHeater::new(p.relay, cfg.hardware.relay_active_low)
        .map_err(eyre::Report::new)
        .wrap_err("open relay pin")?;
    let mut tc = Max6675::new(p.thermo_clk, p.thermo_cs, p.thermo_do)
        .map_err(eyre::Report::new)
        .wrap_err("open thermocouple pins")?;
    // Unmasked on purpose: a self-check must surface an open probe.
    let temp_c = tc
        .read_celsius()
        .map_err(eyre::Report::new)
        .wrap_err("read thermocouple")?;
    Ok(CheckReport {
        backend: "max6675",
        temp_c,
    })
}

pub fn sample_json(s: &ProgressSample) -> serde_json::Value {
    json!({
        "phase": s.phase_index,
        "elapsed_s": s.elapsed_s,
        "temp_c": s.measured_c,
        "setpoint_c": s.setpoint_c,
        "gain": s.gain,
        "heater": s.heater_on,
    })
}

fn spawn_json_writer(rx: Receiver<ProgressSample>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let stdout = std::io::stdout();
        for s in rx.iter() {
            let mut out = stdout.lock();
            if writeln!(out, "{}", sample_json(&s)).is_err() {
                break;
            }
        }
    })
}

fn install_ctrlc(shutdown: Arc<AtomicBool>, firing: Arc<AtomicBool>) -> Result<()> {
    ctrlc::set_handler(move || {
        if firing.load(Ordering::Relaxed) {
            shutdown.store(true, Ordering::Relaxed);
        } else {
            // Nothing has been energized yet.
            eprintln!("interrupted before the firing started");
            std::process::exit(EXIT_ABORTED);
        }
    })
    .wrap_err("install Ctrl-C handler")
}

/// Run one firing of `profile` on the configured backend.
pub fn run_fire(
    cfg: &Config,
    profile: Profile,
    wait_button: bool,
    json: bool,
) -> Result<FireReport> {
    let ports = assemble(cfg)?;
    if wait_button && ports.button.is_none() {
        return Err(eyre::Report::new(KilnError::Config(format!(
            "--wait-button needs a start button, none on the {} backend",
            ports.backend
        ))));
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let firing = Arc::new(AtomicBool::new(false));
    install_ctrlc(shutdown.clone(), firing.clone())?;

    let abort = {
        let button = ports.button.clone();
        move || {
            // The abort port is only polled while a phase runs.
            firing.store(true, Ordering::Relaxed);
            shutdown.load(Ordering::Relaxed) || button.as_ref().is_some_and(|b| b())
        }
    };

    let mut builder = RampRunner::builder()
        .with_sensor(ports.sensor)
        .with_heater(ports.heater)
        .with_profile(profile)
        .with_cfg(RampCfg::from(&cfg.control))
        .with_abort_check(abort);
    if wait_button && let Some(button) = ports.button {
        builder = builder.with_start_trigger(move || button());
    }
    let mut dropped = None;
    let writer = if json {
        let (tx, rx) = crossbeam_channel::bounded(TELEMETRY_CAPACITY);
        let sink = ChannelSink::new(tx);
        dropped = Some(sink.dropped_counter());
        builder = builder.with_progress(sink);
        Some(spawn_json_writer(rx))
    } else {
        builder = builder.with_progress(TracingSink);
        None
    };

    let mut ramp = builder.build()?;
    tracing::info!(
        backend = ports.backend,
        phases = ramp.profile().len(),
        total_s = ramp.profile().total_duration_s(),
        "firing"
    );
    let outcome = ramp.run(RunOptions {
        wait_for_trigger: wait_button,
    });

    // Dropping the ramp closes the channel and ends the writer.
    drop(ramp);
    if let Some(handle) = writer
        && handle.join().is_err()
    {
        tracing::warn!("telemetry writer panicked");
    }
    let dropped_samples = dropped.map_or(0, |d| d.get());
    if dropped_samples > 0 {
        tracing::warn!(dropped_samples, "telemetry consumer fell behind");
    }
    Ok(FireReport {
        outcome: outcome?,
        dropped_samples,
    })
}
