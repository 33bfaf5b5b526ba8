//! Human-readable error descriptions, exit codes and structured JSON errors.

use kiln_core::error::{BuildError, KilnError, ProfileError};
use kiln_hardware::error::HwError;

pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_INVALID_INPUT: i32 = 3;
pub const EXIT_ABORTED: i32 = 4;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingSensor => {
                "What happened: No temperature sensor was provided to the controller.\nLikely causes: The thermocouple failed to initialize or was not wired into the builder.\nHow to fix: Check the MAX6675 pins under [pins] and rerun self-check.".to_string()
            }
            BuildError::MissingHeater => {
                "What happened: No heater output was provided to the controller.\nLikely causes: The relay pin failed to initialize.\nHow to fix: Check [pins] relay and GPIO permissions.".to_string()
            }
            BuildError::MissingProfile => {
                "What happened: No firing profile was loaded.\nLikely causes: Neither --profile nor [profile] was given.\nHow to fix: Pass --profile FILE or set [profile] path/phases in the config.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in [control].\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(ke) = err.downcast_ref::<KilnError>() {
        return match ke {
            KilnError::Profile(pe) => {
                let hint = match pe {
                    ProfileError::ZeroDuration { .. } => "Give every phase a duration of at least 1 second.",
                    ProfileError::NonFiniteTarget { .. } => "Use plain numbers for every target temperature.",
                    ProfileError::TooManyPhases { .. } => "Split the firing or merge phases.",
                    ProfileError::MismatchedColumns { .. } => {
                        "Make the Time and Temperature arrays the same length."
                    }
                };
                format!(
                    "What happened: The firing profile is invalid ({pe}).\nLikely causes: A typo or missing value in the profile file.\nHow to fix: {hint}"
                )
            }
            KilnError::Config(msg) => format!(
                "What happened: Configuration problem ({msg}).\nLikely causes: Missing file, bad path or malformed TOML/JSON/CSV.\nHow to fix: Check the paths passed with --config/--profile and the file contents."
            ),
            KilnError::State(msg) => format!(
                "What happened: The controller refused the request ({msg}).\nLikely causes: A firing is already in progress.\nHow to fix: Wait for it to finish or abort it first."
            ),
            KilnError::Io(msg) => format!(
                "What happened: I/O error ({msg}).\nLikely causes: Permissions or a full disk.\nHow to fix: Check the log and output paths."
            ),
        };
    }

    if let Some(he) = err.downcast_ref::<HwError>() {
        return match he {
            HwError::ThermocoupleOpen => "What happened: The thermocouple reads as open.\nLikely causes: Probe disconnected or broken.\nHow to fix: Reseat the probe on the MAX6675 terminals.".to_string(),
            HwError::Gpio(msg) => format!(
                "What happened: Failed to initialize hardware pins ({msg}).\nLikely causes: Incorrect pin numbers or insufficient GPIO permissions.\nHow to fix: Fix the [pins] values; ensure the process may access GPIO."
            ),
            other => format!(
                "What happened: Hardware error ({other}).\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug."
            ),
        };
    }

    // Generic fallback
    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Invalid profiles and configs map to 3; everything else to 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<KilnError>() {
        Some(KilnError::Profile(_) | KilnError::Config(_)) => return EXIT_INVALID_INPUT,
        Some(_) => return EXIT_FAILURE,
        None => {}
    }
    if let Some(BuildError::InvalidConfig(_) | BuildError::MissingProfile) =
        err.downcast_ref::<BuildError>()
    {
        return EXIT_INVALID_INPUT;
    }
    EXIT_FAILURE
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = match err.downcast_ref::<KilnError>() {
        Some(KilnError::Profile(_)) => "InvalidProfile",
        Some(KilnError::Config(_)) => "InvalidConfig",
        Some(KilnError::State(_)) => "State",
        Some(KilnError::Io(_)) => "Io",
        None if err.downcast_ref::<BuildError>().is_some() => "Build",
        None if err.downcast_ref::<HwError>().is_some() => "Hardware",
        None => "Error",
    };
    json!({
        "reason": reason,
        "code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_profile_maps_to_exit_3_with_hint() {
        let err = eyre::Report::new(KilnError::Profile(ProfileError::ZeroDuration { index: 2 }));
        assert_eq!(exit_code_for_error(&err), EXIT_INVALID_INPUT);
        let text = humanize(&err);
        assert!(text.contains("phase 2 has zero duration"), "{text}");
        assert!(text.contains("at least 1 second"));
    }

    #[test]
    fn wrapped_errors_keep_their_type() {
        use eyre::WrapErr;
        let err: eyre::Result<()> =
            Err::<(), _>(eyre::Report::new(KilnError::Config("missing".into())))
                .wrap_err("loading");
        let err = err.unwrap_err();
        assert_eq!(exit_code_for_error(&err), EXIT_INVALID_INPUT);
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "InvalidConfig");
        assert_eq!(v["code"], 3);
    }

    #[test]
    fn unknown_errors_are_generic() {
        let err = eyre::eyre!("boom");
        assert_eq!(exit_code_for_error(&err), EXIT_FAILURE);
        assert!(humanize(&err).contains("Original: boom"));
    }
}
