//! Human-readable error descriptions and structured JSON error formatting.

use magcal_core::error::{BuildError, GeneratorError};
use magcal_sim::SimError;

/// Innermost message of the report chain (the actual failure, not its context).
fn root_message(err: &eyre::Report) -> String {
    err.chain()
        .last()
        .map_or_else(|| err.to_string(), ToString::to_string)
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingSensor => {
                "What happened: No sensor kind was selected for the generator.\nLikely causes: The builder was not given a sensor.\nHow to fix: Set generator.sensor in the config or pass --sensor.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(ge) = err.downcast_ref::<GeneratorError>() {
        return match ge {
            GeneratorError::InitializationFailed { base_noise_level } => format!(
                "What happened: Initialization failed: base noise level {base_noise_level:.4} m/s² is above the allowed threshold.\nLikely causes: The platform moved during the first detector.initial_static_samples samples, or a vibrating mount.\nHow to fix: Hold the sensor still at the start of the recording, or raise detector.base_noise_level_absolute_threshold."
            ),
            GeneratorError::Source(msg) => format!(
                "What happened: Reading samples failed ({msg}).\nLikely causes: Truncated input or a disconnected source.\nHow to fix: Check the sample source and rerun."
            ),
            GeneratorError::Classifier(msg) => format!(
                "What happened: Interval detection rejected a sample ({msg}).\nLikely causes: Non-finite or corrupted specific-force values.\nHow to fix: Clean the input data and rerun."
            ),
            // Fallback to generic for other domain errors
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    if let Some(se) = err.downcast_ref::<SimError>() {
        return format!(
            "What happened: {se}.\nLikely causes: Zero cycles or zero-length phases.\nHow to fix: Pass --cycles, --static-samples and --dynamic-samples values >= 1."
        );
    }

    if let Some(te) = err.downcast_ref::<toml::de::Error>() {
        return format!(
            "What happened: The config file is not valid TOML or has unknown values.\nLikely causes: A typo in a key or value ({}).\nHow to fix: Fix the config file and rerun.",
            te.message()
        );
    }

    // String-based heuristics for errors coming from config or CSV loading
    let root = root_message(err);
    let lower = root.to_ascii_lowercase();

    if lower.contains("sample csv must have headers") {
        return "Invalid headers in sample CSV. Expected 'timestamp_s,fx,fy,fz,bx,by,bz' optionally followed by ',wx,wy,wz'.".to_string();
    }

    if lower.contains("non-decreasing") || lower.contains("invalid csv row") || lower.contains("non-finite value") {
        return format!(
            "What happened: The sample CSV has a bad row ({root}).\nLikely causes: Corrupted export or rows out of time order.\nHow to fix: Fix or drop the offending row and rerun."
        );
    }

    if lower.starts_with("detector.") || lower.starts_with("generator.") || lower.starts_with("logging.") {
        return format!(
            "What happened: Invalid configuration ({root}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
        );
    }

    // Generic fallback
    let msg = err.to_string();
    let cause = if root == msg {
        String::new()
    } else {
        format!(" Cause: {root}")
    };
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 for a failed initialization, 1 for everything else.
/// (clap exits with 2 on usage errors before any of this runs.)
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<GeneratorError>() {
        Some(GeneratorError::InitializationFailed { .. }) => 3,
        _ => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(ge) = err.downcast_ref::<GeneratorError>() {
        return match ge {
            GeneratorError::Busy => "Busy",
            GeneratorError::Classifier(_) => "Classifier",
            GeneratorError::Accumulator(_) => "Accumulator",
            GeneratorError::Source(_) => "Source",
            GeneratorError::InvalidSetting(_) => "Config",
            GeneratorError::InitializationFailed { .. } => "InitializationFailed",
        };
    }
    if err.downcast_ref::<BuildError>().is_some() || err.downcast_ref::<toml::de::Error>().is_some() {
        return "Config";
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let msg = humanize(err);
    match err.downcast_ref::<GeneratorError>() {
        Some(GeneratorError::InitializationFailed { base_noise_level }) => json!({
            "reason": reason_name(err),
            "details": { "base_noise_level": base_noise_level },
            "message": msg,
        })
        .to_string(),
        _ => json!({ "reason": reason_name(err), "message": msg }).to_string(),
    }
}
