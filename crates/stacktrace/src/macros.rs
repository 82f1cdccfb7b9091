//! Formatting shorthands for the propagation API.
//!
//! Each macro records the frame of the function it is expanded in.

/// Create a root [`TracedError`](crate::TracedError) with a formatted message.
///
/// # Examples
///
/// ```rust
/// use stacktrace::{ErrorCode, new_error};
///
/// const ECODE_NOT_FOUND: ErrorCode = ErrorCode::new(404);
///
/// let id = 42;
/// let err = new_error!("no user with id {id}");
/// assert_eq!(err.message(), "no user with id 42");
///
/// let err = new_error!(code = ECODE_NOT_FOUND; "no user with id {}", id);
/// assert_eq!(err.code(), ECODE_NOT_FOUND);
/// ```
#[macro_export]
#[collapse_debuginfo(yes)]
macro_rules! new_error {
    (code = $code:expr; $($arg:tt)+) => {
        $crate::new_error_with_code($code, ::std::format!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::new_error(::std::format!($($arg)+))
    };
}

/// Propagate the error of a `Result` with a formatted message.
///
/// Without a code the message is only formatted when the result is an
/// `Err`.
///
/// # Examples
///
/// ```rust
/// use stacktrace::{TracedError, propagate};
///
/// fn load(path: &str) -> Result<String, TracedError> {
///     propagate!(std::fs::read_to_string(path), "loading {path}")
/// }
///
/// let err = load("/nonexistent/settings.toml").unwrap_err();
/// assert_eq!(err.message(), "loading /nonexistent/settings.toml");
/// ```
#[macro_export]
#[collapse_debuginfo(yes)]
macro_rules! propagate {
    ($result:expr, code = $code:expr; $($arg:tt)+) => {
        $crate::ResultExt::propagate_with_code($result, $code, ::std::format!($($arg)+))
    };
    ($result:expr, $($arg:tt)+) => {
        $crate::ResultExt::propagate_with($result, || ::std::format!($($arg)+))
    };
}

/// Return early with a [`TracedError`](crate::TracedError) unless a condition holds.
///
/// The error is converted with `Into`, so the enclosing function may return
/// any error type a `TracedError` converts into.
///
/// # Examples
///
/// ```rust
/// use stacktrace::{ErrorCode, TracedError, ensure};
///
/// const ECODE_RANGE: ErrorCode = ErrorCode::new(22);
///
/// fn check_port(port: u32) -> Result<u16, TracedError> {
///     ensure!(port != 0, "port must be non-zero");
///     ensure!(port <= 65_535, code = ECODE_RANGE; "port {port} out of range");
///     Ok(port as u16)
/// }
///
/// assert_eq!(check_port(8080).unwrap(), 8080);
/// assert_eq!(check_port(70_000).unwrap_err().code(), ECODE_RANGE);
/// ```
#[macro_export]
#[collapse_debuginfo(yes)]
macro_rules! ensure {
    ($cond:expr, code = $code:expr; $($arg:tt)+) => {
        if !($cond) {
            return ::std::result::Result::Err(
                $crate::new_error_with_code($code, ::std::format!($($arg)+)).into(),
            );
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        if !($cond) {
            return ::std::result::Result::Err($crate::new_error(::std::format!($($arg)+)).into());
        }
    };
}
