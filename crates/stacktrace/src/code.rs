//! Classification codes attached to traced errors.

use std::fmt;

/// Application-defined classification code.
///
/// Codes are opaque to this crate: it only stores them, compares them, and
/// hands back the nearest explicitly assigned one during lookup. Applications
/// usually declare their codes as constants:
///
/// ```
/// use stacktrace::ErrorCode;
///
/// const ECODE_NOT_FOUND: ErrorCode = ErrorCode::new(404);
/// const ECODE_TIMEOUT: ErrorCode = ErrorCode::new(504);
///
/// assert_ne!(ECODE_NOT_FOUND, ECODE_TIMEOUT);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ErrorCode(u16);

/// Sentinel meaning "no explicit code assigned".
pub const NO_CODE: ErrorCode = ErrorCode::NO_CODE;

impl ErrorCode {
    /// Sentinel meaning "no explicit code assigned".
    ///
    /// Occupies the top of the `u16` range so that application codes can
    /// start from zero.
    pub const NO_CODE: Self = Self(u16::MAX);

    /// Create a code from its raw value.
    #[inline]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Raw numeric value.
    #[inline]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// `true` for the [`NO_CODE`] sentinel.
    #[inline]
    pub const fn is_no_code(self) -> bool {
        self.0 == u16::MAX
    }
}

impl Default for ErrorCode {
    fn default() -> Self {
        Self::NO_CODE
    }
}

impl From<u16> for ErrorCode {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_no_code() {
            f.write_str("NoCode")
        } else {
            write!(f, "{}", self.0)
        }
    }
}
