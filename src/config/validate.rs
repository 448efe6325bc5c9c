// src/config/validate.rs

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, TorPrebuiltError};
use crate::process::OutputMode;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = TorPrebuiltError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_tor_section(&raw)?;
        let timeout = raw
            .launcher
            .timeout
            .as_deref()
            .map(parse_timeout)
            .transpose()?;
        let ready_on_stdout = validate_ready_pattern(&raw)?;

        Ok(ConfigFile {
            work_dir: raw.launcher.work_dir,
            timeout,
            output: raw.launcher.output,
            ready_on_stdout,
            bundle_dir: raw.bundle.dir,
            rewrite_prefix: raw.bundle.rewrite_prefix.filter(|p| !p.is_empty()),
            torrc: raw.tor.torrc,
            defaults_torrc: raw.tor.defaults_torrc,
            args: raw.tor.args,
        })
    }
}

fn validate_tor_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.tor.torrc.trim().is_empty() {
        return Err(TorPrebuiltError::Config(
            "[tor].torrc must not be empty".to_string(),
        ));
    }
    if cfg.tor.defaults_torrc.trim().is_empty() {
        return Err(TorPrebuiltError::Config(
            "[tor].defaults_torrc must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn parse_timeout(s: &str) -> Result<Duration> {
    timeout_from_str("[launcher].timeout", s)
}

/// Parse a process timeout for `field`: a duration greater than zero.
pub(crate) fn timeout_from_str(field: &str, s: &str) -> Result<Duration> {
    let dur = parse_duration(s).map_err(|e| TorPrebuiltError::Config(format!("{field}: {e}")))?;
    if dur.is_zero() {
        return Err(TorPrebuiltError::Config(format!(
            "{field} must be greater than zero"
        )));
    }
    Ok(dur)
}

fn validate_ready_pattern(cfg: &RawConfigFile) -> Result<Option<Regex>> {
    let Some(pattern) = cfg.launcher.ready_on_stdout.as_deref() else {
        return Ok(None);
    };
    if cfg.launcher.output != OutputMode::Log {
        return Err(TorPrebuiltError::Config(
            "[launcher].ready_on_stdout requires output = \"log\"".to_string(),
        ));
    }
    Regex::new(pattern).map(Some).map_err(|e| {
        TorPrebuiltError::Config(format!(
            "[launcher].ready_on_stdout is not a valid regex: {e}"
        ))
    })
}

fn duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)\s*([A-Za-z]*)$").expect("duration regex is valid"))
}

/// Parse a duration string like `"250ms"`, `"3s"`, `"1m"` or `"2h"`.
///
/// Values that do not fit in a `u64` count of seconds are rejected.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let caps = duration_regex()
        .captures(s)
        .ok_or_else(|| format!("invalid duration '{s}'; expected e.g. 250ms, 3s, 1m or 2h"))?;
    let value: u64 = caps[1]
        .parse()
        .map_err(|_| format!("duration '{s}' is too large"))?;

    let secs_per_unit = match caps[2].to_lowercase().as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "" => return Err("duration missing unit suffix".to_string()),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        unit => {
            return Err(format!(
                "unsupported duration unit '{unit}'; expected ms, s, m, or h"
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{s}' is too large"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration(" 3s "), Ok(Duration::from_secs(3)));
        assert_eq!(parse_duration("2h"), Ok(Duration::from_secs(7200)));
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("5d").is_err());
        assert!(parse_duration("5 days").unwrap_err().contains("unsupported duration unit"));
    }

    #[test]
    fn oversized_durations_are_errors() {
        assert!(parse_duration("999999999999999999m").unwrap_err().contains("too large"));
        assert!(parse_duration("99999999999999999999s").unwrap_err().contains("too large"));
        assert_eq!(
            parse_duration("18446744073709551615s"),
            Ok(Duration::from_secs(u64::MAX))
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.launcher.timeout = Some("0s".to_string());
        let err = ConfigFile::try_from(raw).unwrap_err();
        assert!(matches!(err, TorPrebuiltError::Config(msg) if msg.contains("greater than zero")));
    }

    #[test]
    fn ready_pattern_needs_log_output() {
        let mut raw = RawConfigFile::default();
        raw.launcher.ready_on_stdout = Some("Bootstrapped 100%".to_string());
        assert!(ConfigFile::try_from(raw.clone()).is_err());

        raw.launcher.output = OutputMode::Log;
        let cfg = ConfigFile::try_from(raw).unwrap();
        assert!(cfg.ready_on_stdout.unwrap().is_match("[notice] Bootstrapped 100% (done): Done"));
    }

    #[test]
    fn empty_torrc_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.tor.torrc = "  ".to_string();
        assert!(ConfigFile::try_from(raw).is_err());
    }
}
