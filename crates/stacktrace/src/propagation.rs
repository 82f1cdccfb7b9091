//! Constructing and propagating traced errors.
//!
//! Every entry point records the frame of its caller. Propagating `None`
//! (or an `Ok` through [`ResultExt`]) is a no-op, so a chain of
//! propagations passes an absent error straight through.

use std::error::Error;
use std::panic::Location;

use crate::cause::Cause;
use crate::code::ErrorCode;
use crate::frame::Frame;
use crate::record::TracedError;

// Each entry point calls `Frame::capture_or` itself: the walk skips exactly
// one frame of this crate above the capture.

/// Create a root error at the caller's site.
///
/// ```
/// use stacktrace::{NO_CODE, new_error};
///
/// let err = new_error("failed to start");
/// assert_eq!(err.message(), "failed to start");
/// assert_eq!(err.code(), NO_CODE);
/// ```
#[track_caller]
pub fn new_error(message: impl Into<String>) -> TracedError {
    let frame = Frame::capture_or(0, Location::caller());
    TracedError::build(message.into(), Cause::None, None, frame)
}

/// Create a root error carrying `code`.
#[track_caller]
pub fn new_error_with_code(code: ErrorCode, message: impl Into<String>) -> TracedError {
    let frame = Frame::capture_or(0, Location::caller());
    TracedError::build(message.into(), Cause::None, Some(code), frame)
}

/// Wrap `err` in a new layer recorded at the caller's site.
///
/// Returns `None` when `err` is `None`.
#[track_caller]
pub fn propagate<E>(err: Option<E>, message: impl Into<String>) -> Option<TracedError>
where
    E: Error + Send + Sync + 'static,
{
    let cause = Cause::from_error(err?);
    let frame = Frame::capture_or(0, Location::caller());
    Some(TracedError::build(message.into(), cause, None, frame))
}

/// Wrap `err` in a new layer carrying `code`.
///
/// The code shadows any code set deeper in the chain. Returns `None` when
/// `err` is `None`.
#[track_caller]
pub fn propagate_with_code<E>(
    err: Option<E>,
    code: ErrorCode,
    message: impl Into<String>,
) -> Option<TracedError>
where
    E: Error + Send + Sync + 'static,
{
    let cause = Cause::from_error(err?);
    let frame = Frame::capture_or(0, Location::caller());
    Some(TracedError::build(message.into(), cause, Some(code), frame))
}

/// Like [`propagate`], recording the frame `depth` levels above the caller.
///
/// For helpers that propagate on behalf of their own caller: a helper
/// called directly by the code it reports passes 1.
///
/// ```
/// use stacktrace::{TracedError, propagate_with_depth};
///
/// #[inline(never)]
/// fn annotate(err: Option<std::io::Error>) -> Option<TracedError> {
///     propagate_with_depth(err, 1, "while loading")
/// }
///
/// let err = annotate(Some(std::io::Error::other("eof"))).unwrap();
/// assert_eq!(err.message(), "while loading");
/// ```
#[track_caller]
pub fn propagate_with_depth<E>(
    err: Option<E>,
    depth: usize,
    message: impl Into<String>,
) -> Option<TracedError>
where
    E: Error + Send + Sync + 'static,
{
    let cause = Cause::from_error(err?);
    let frame = Frame::capture_or(depth, Location::caller());
    Some(TracedError::build(message.into(), cause, None, frame))
}

/// [`propagate`] for an already type-erased error.
#[track_caller]
pub fn propagate_boxed(
    err: Option<Box<dyn Error + Send + Sync + 'static>>,
    message: impl Into<String>,
) -> Option<TracedError> {
    let cause = Cause::from_boxed(err?);
    let frame = Frame::capture_or(0, Location::caller());
    Some(TracedError::build(message.into(), cause, None, frame))
}

/// Extension trait for propagating the error of a `Result`.
///
/// `Ok` values pass through untouched.
///
/// ```
/// use stacktrace::ResultExt;
///
/// fn read_config() -> Result<String, stacktrace::TracedError> {
///     std::fs::read_to_string("/nonexistent/app.toml").propagate("reading config")
/// }
///
/// let err = read_config().unwrap_err();
/// assert_eq!(err.message(), "reading config");
/// ```
pub trait ResultExt<T> {
    /// Wrap the error in a new layer with `message`.
    fn propagate(self, message: impl Into<String>) -> Result<T, TracedError>;

    /// Wrap the error in a new layer with `message` and `code`.
    fn propagate_with_code(
        self,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Result<T, TracedError>;

    /// Wrap the error, recording the frame `depth` levels above the caller.
    fn propagate_with_depth(self, depth: usize, message: impl Into<String>) -> Result<T, TracedError>;

    /// Wrap the error with a lazily built message.
    fn propagate_with<F, M>(self, message: F) -> Result<T, TracedError>
    where
        F: FnOnce() -> M,
        M: Into<String>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Error + Send + Sync + 'static,
{
    #[track_caller]
    fn propagate(self, message: impl Into<String>) -> Result<T, TracedError> {
        match self {
            Ok(value) => Ok(value),
            Err(err) => {
                let frame = Frame::capture_or(0, Location::caller());
                Err(TracedError::build(message.into(), Cause::from_error(err), None, frame))
            }
        }
    }

    #[track_caller]
    fn propagate_with_code(
        self,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Result<T, TracedError> {
        match self {
            Ok(value) => Ok(value),
            Err(err) => {
                let frame = Frame::capture_or(0, Location::caller());
                Err(TracedError::build(message.into(), Cause::from_error(err), Some(code), frame))
            }
        }
    }

    #[track_caller]
    fn propagate_with_depth(self, depth: usize, message: impl Into<String>) -> Result<T, TracedError> {
        match self {
            Ok(value) => Ok(value),
            Err(err) => {
                let frame = Frame::capture_or(depth, Location::caller());
                Err(TracedError::build(message.into(), Cause::from_error(err), None, frame))
            }
        }
    }

    #[track_caller]
    fn propagate_with<F, M>(self, message: F) -> Result<T, TracedError>
    where
        F: FnOnce() -> M,
        M: Into<String>,
    {
        match self {
            Ok(value) => Ok(value),
            Err(err) => {
                let frame = Frame::capture_or(0, Location::caller());
                Err(TracedError::build(message().into(), Cause::from_error(err), None, frame))
            }
        }
    }
}
