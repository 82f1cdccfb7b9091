//! Format-mode configuration.
//!
//! The mode can come from code ([`set_default_format`]), from an
//! application's own config file (`FromStr`, or serde with the `serde`
//! feature), or from the `STACKTRACE_FORMAT` environment variable.

use std::str::FromStr;

use crate::format::{FormatMode, set_default_format};

/// Environment variable read by [`FormatMode::from_env`].
pub const FORMAT_ENV: &str = "STACKTRACE_FORMAT";

/// Configuration error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The value names no known format mode.
    #[error("unknown format mode `{value}`, expected `full` or `brief`")]
    UnknownFormat {
        /// The rejected value.
        value: String,
    },
}

impl FromStr for FormatMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "brief" => Ok(Self::Brief),
            _ => Err(ConfigError::UnknownFormat {
                value: s.to_owned(),
            }),
        }
    }
}

impl FormatMode {
    /// Read the mode from `STACKTRACE_FORMAT`.
    ///
    /// Unset or empty means [`FormatMode::Full`]. An unrecognized value is
    /// logged and also falls back to [`FormatMode::Full`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(FORMAT_ENV).ok().as_deref())
    }

    fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::default(),
            Some(raw) => raw.parse().unwrap_or_else(|err: ConfigError| {
                tracing::warn!(env = FORMAT_ENV, %err, "ignoring invalid format mode");
                Self::default()
            }),
        }
    }
}

/// Install the mode from `STACKTRACE_FORMAT` as the process default.
///
/// Returns the installed mode.
pub fn init_from_env() -> FormatMode {
    let mode = FormatMode::from_env();
    set_default_format(mode);
    mode
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[rstest]
    #[case("full", FormatMode::Full)]
    #[case("FULL", FormatMode::Full)]
    #[case(" brief ", FormatMode::Brief)]
    #[case("Brief", FormatMode::Brief)]
    fn parses_known_modes(#[case] raw: &str, #[case] expected: FormatMode) {
        assert_eq!(raw.parse::<FormatMode>(), Ok(expected));
    }

    #[test]
    fn rejects_unknown_mode() {
        let err = "verbose".parse::<FormatMode>().unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownFormat {
                value: "verbose".to_owned()
            }
        );
        assert_eq!(
            err.to_string(),
            "unknown format mode `verbose`, expected `full` or `brief`"
        );
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for mode in [FormatMode::Full, FormatMode::Brief] {
            assert_eq!(mode.to_string().parse::<FormatMode>(), Ok(mode));
        }
    }

    #[rstest]
    #[case(None, FormatMode::Full)]
    #[case(Some(""), FormatMode::Full)]
    #[case(Some("brief"), FormatMode::Brief)]
    fn env_value_selects_mode(#[case] value: Option<&str>, #[case] expected: FormatMode) {
        assert_eq!(FormatMode::from_env_value(value), expected);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn invalid_env_value_warns_and_falls_back() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .finish();

        let mode = tracing::subscriber::with_default(subscriber, || {
            FormatMode::from_env_value(Some("verbose"))
        });

        assert_eq!(mode, FormatMode::Full);
        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"), "{output}");
        assert!(output.contains("ignoring invalid format mode"), "{output}");
        assert!(output.contains("verbose"), "{output}");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&FormatMode::Brief).unwrap(), "\"brief\"");
        let mode: FormatMode = serde_json::from_str("\"full\"").unwrap();
        assert_eq!(mode, FormatMode::Full);
    }
}
