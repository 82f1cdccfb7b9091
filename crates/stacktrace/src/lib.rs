//! # stacktrace
//!
//! Error chains annotated with the call site of every layer.
//!
//! Each time an error is created or propagated, the library records a
//! message, an optional [`ErrorCode`], and the [`Frame`] (file, line,
//! function) of the code that did it. The result is a [`TracedError`]: an
//! ordinary `std::error::Error` that renders as a readable causal chain.
//!
//! ## Quick Start
//!
//! ```rust
//! use stacktrace::prelude::*;
//!
//! const ECODE_CONFIG: ErrorCode = ErrorCode::new(1);
//!
//! fn read_settings() -> Result<String, TracedError> {
//!     std::fs::read_to_string("/nonexistent/settings.toml")
//!         .propagate_with_code(ECODE_CONFIG, "reading settings")
//! }
//!
//! fn start() -> Result<(), TracedError> {
//!     read_settings().propagate("starting service")?;
//!     Ok(())
//! }
//!
//! let err = start().unwrap_err();
//! assert_eq!(err.code(), ECODE_CONFIG);
//!
//! // starting service
//! //  --- at src/main.rs:20 (start) ---
//! // Caused by: reading settings
//! //  --- at src/main.rs:15 (read_settings) ---
//! // Caused by: No such file or directory (os error 2)
//! println!("{err}");
//!
//! assert_eq!(
//!     err.display(FormatMode::Brief).to_string().lines().next(),
//!     Some("starting service"),
//! );
//! ```
//!
//! ## Absent errors
//!
//! The free functions take `Option<E>` and pass `None` straight through, so
//! a propagation site can be written without checking first:
//!
//! ```rust
//! use stacktrace::{TracedError, propagate};
//!
//! let nothing: Option<TracedError> = None;
//! assert!(propagate(nothing, "never recorded").is_none());
//! ```
//!
//! ## Features
//!
//! - `serde`: (de)serialize [`ErrorCode`] and [`FormatMode`] for use in
//!   application config files.
//!
//! ## Configuration
//!
//! `Display` uses the process-wide [`default_format`]. Set it with
//! [`set_default_format`], or from the `STACKTRACE_FORMAT` environment
//! variable (`full` or `brief`) with [`init_from_env`].

mod cause;
mod code;
mod config;
mod format;
mod frame;
mod lookup;
#[macro_use]
mod macros;
mod propagation;
mod record;

pub use cause::Cause;
pub use code::{ErrorCode, NO_CODE};
pub use config::{ConfigError, FORMAT_ENV, init_from_env};
pub use format::{
    FormatMode, Rendered, default_format, render, render_default, set_default_format,
};
pub use frame::Frame;
pub use lookup::{dyn_root_cause, get_code, get_dyn_code, root_cause};
pub use propagation::{
    ResultExt, new_error, new_error_with_code, propagate, propagate_boxed, propagate_with_code,
    propagate_with_depth,
};
pub use record::{Chain, TracedError};

/// Everything needed to create, propagate, and inspect traced errors.
pub mod prelude {
    pub use super::{
        ErrorCode, FormatMode, NO_CODE, ResultExt, TracedError, get_code, new_error,
        new_error_with_code, propagate, propagate_with_code, propagate_with_depth,
    };

    pub use crate::ensure;
}
