#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and firing-profile documents for the kiln controller.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - `ProfileDoc` is the stored shape of a firing profile. It accepts the
//!   column layout written by the kiln controller firmware
//!   (`{"Time": [...], "Temperature": [...]}`), an explicit list of phases,
//!   or a CSV table with a strict header.
//!
//! Nothing here checks ramp invariants such as non-zero durations; that is
//! the job of `kiln_core::Profile`, which every document is converted into.
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One phase as stored on disk.
///
/// CSV schema, expected headers:
/// duration_s,target_c
///
/// Example:
/// duration_s,target_c
/// 600,100.0
/// 1800,600.0
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct PhaseDoc {
    pub duration_s: u64,
    pub target_c: f64,
}

/// Stored firing profile.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum ProfileDoc {
    /// Parallel arrays of durations (s) and target temperatures (°C).
    Columns {
        #[serde(alias = "Time")]
        time: Vec<u64>,
        #[serde(alias = "Temperature")]
        temperature: Vec<f64>,
    },
    /// Explicit list of phases.
    Phases { phases: Vec<PhaseDoc> },
}

impl ProfileDoc {
    /// Number of entries as stored; for columns, the longer of the two arrays.
    pub fn len(&self) -> usize {
        match self {
            Self::Columns { time, temperature } => time.len().max(temperature.len()),
            Self::Phases { phases } => phases.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ProfileDoc {
    fn default() -> Self {
        Self::Phases { phases: Vec::new() }
    }
}

/// On-disk profile encodings, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileFormat {
    Json,
    Toml,
    Csv,
}

impl ProfileFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" | "txt" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

pub fn parse_profile_json(s: &str) -> Result<ProfileDoc, serde_json::Error> {
    serde_json::from_str::<ProfileDoc>(s)
}

pub fn parse_profile_toml(s: &str) -> Result<ProfileDoc, toml::de::Error> {
    toml::from_str::<ProfileDoc>(s)
}

pub fn load_profile_csv(path: &Path) -> eyre::Result<ProfileDoc> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open profile CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["duration_s", "target_c"];
    let actual: Vec<String> = headers.iter().map(ToString::to_string).collect();
    if actual != expected {
        eyre::bail!(
            "profile CSV must have headers 'duration_s,target_c', got: {}",
            actual.join(",")
        );
    }

    let mut phases = Vec::new();
    for (idx, rec) in rdr.deserialize::<PhaseDoc>().enumerate() {
        match rec {
            Ok(row) => phases.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }
    Ok(ProfileDoc::Phases { phases })
}

/// Read and parse a profile document, picking the decoder from the extension.
pub fn load_profile(path: &Path) -> eyre::Result<ProfileDoc> {
    let Some(format) = ProfileFormat::from_path(path) else {
        eyre::bail!(
            "unsupported profile file {:?}: expected .json, .toml or .csv",
            path
        );
    };
    let read = || {
        std::fs::read_to_string(path).map_err(|e| eyre::eyre!("read profile {:?}: {}", path, e))
    };
    match format {
        ProfileFormat::Csv => load_profile_csv(path),
        ProfileFormat::Json => parse_profile_json(&read()?)
            .map_err(|e| eyre::eyre!("parse profile JSON {:?}: {}", path, e)),
        ProfileFormat::Toml => parse_profile_toml(&read()?)
            .map_err(|e| eyre::eyre!("parse profile TOML {:?}: {}", path, e)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Pins {
    pub thermo_clk: u8,
    pub thermo_cs: u8,
    pub thermo_do: u8,
    pub relay: u8,
    pub button: Option<u8>,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            thermo_clk: 6,
            thermo_cs: 7,
            thermo_do: 8,
            relay: 3,
            button: Some(2),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControlCfg {
    /// Sampling cadence of the ramp (ms). One setpoint/heater decision per sample.
    pub sample_period_ms: u64,
    /// Start temperature of the first phase (°C).
    pub ambient_c: f64,
    /// Sleep between control-loop iterations (ms).
    pub poll_ms: u64,
    /// Start-button settle delay (ms).
    pub settle_ms: u64,
}

impl Default for ControlCfg {
    fn default() -> Self {
        Self {
            sample_period_ms: 1000,
            ambient_c: 25.0,
            poll_ms: 5,
            settle_ms: 100,
        }
    }
}

/// What to do when the profile file cannot be read or parsed.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProfileFallback {
    #[default]
    Strict,
    /// Continue with an empty profile (a firing that completes immediately).
    Empty,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ProfileCfg {
    /// Path to a .json/.toml/.csv profile document.
    pub path: Option<PathBuf>,
    pub on_error: ProfileFallback,
    /// Inline phases; used when no path is given.
    pub phases: Option<Vec<PhaseDoc>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Hardware {
    /// Drive the relay pin low to energize the element.
    pub relay_active_low: bool,
    /// Treat low level as pressed (button wired to ground with pull-up)
    pub button_active_low: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimCfg {
    pub initial_c: f64,
    /// Temperature gained per sample while the element is on (°C).
    pub heat_c_per_sample: f64,
    /// Fraction of the excess over ambient lost per sample.
    pub loss_per_sample: f64,
}

impl Default for SimCfg {
    fn default() -> Self {
        Self {
            initial_c: 25.0,
            heat_c_per_sample: 2.0,
            loss_per_sample: 0.01,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub pins: Pins,
    pub control: ControlCfg,
    pub profile: ProfileCfg,
    pub hardware: Hardware,
    pub sim: SimCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Control
        if self.control.sample_period_ms == 0 {
            eyre::bail!("control.sample_period_ms must be >= 1");
        }
        if self.control.sample_period_ms > 60_000 {
            eyre::bail!("control.sample_period_ms is unreasonably large (>60s)");
        }
        if !self.control.ambient_c.is_finite() {
            eyre::bail!("control.ambient_c must be finite");
        }
        if self.control.poll_ms == 0 {
            eyre::bail!("control.poll_ms must be >= 1");
        }
        if self.control.poll_ms >= self.control.sample_period_ms {
            eyre::bail!("control.poll_ms must be < control.sample_period_ms");
        }
        if self.control.settle_ms > 1000 {
            eyre::bail!("control.settle_ms is unreasonably large (>1s)");
        }

        // Profile
        if self.profile.path.is_some() && self.profile.phases.is_some() {
            eyre::bail!("profile.path and profile.phases are mutually exclusive");
        }

        // Sim
        if !self.sim.initial_c.is_finite() {
            eyre::bail!("sim.initial_c must be finite");
        }
        if !(self.sim.heat_c_per_sample.is_finite() && self.sim.heat_c_per_sample >= 0.0) {
            eyre::bail!("sim.heat_c_per_sample must be >= 0.0");
        }
        if !(0.0..=1.0).contains(&self.sim.loss_per_sample) {
            eyre::bail!("sim.loss_per_sample must be in [0.0, 1.0]");
        }

        // Logging
        if let Some(rotation) = self.logging.rotation.as_deref()
            && !matches!(rotation, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never, daily, hourly");
        }

        Ok(())
    }
}
