//! [`TracedError`], one layer of an annotated error chain.

use std::error::Error;
use std::fmt;

use crate::cause::Cause;
use crate::code::ErrorCode;
use crate::format::{self, FormatMode, Rendered};
use crate::frame::Frame;
use crate::lookup;

/// An error annotated with a message, an optional classification code, and
/// the call site that created it.
///
/// Records are immutable. Propagating one wraps it in a new outer record
/// that exclusively owns the previous one as its [`Cause`], so a chain is
/// finite and acyclic by construction.
///
/// `Display` renders the whole chain using the process-wide
/// [`default_format`](crate::default_format); [`TracedError::display`]
/// renders under an explicit mode.
pub struct TracedError {
    message: String,
    cause: Cause,
    code: Option<ErrorCode>,
    frame: Frame,
}

impl TracedError {
    pub(crate) fn build(
        message: String,
        cause: Cause,
        code: Option<ErrorCode>,
        frame: Frame,
    ) -> Self {
        Self {
            message,
            cause,
            code,
            frame,
        }
    }

    /// This layer's message, possibly empty.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The call site captured when this layer was created.
    #[inline]
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// What this layer wraps.
    #[inline]
    pub fn cause(&self) -> &Cause {
        &self.cause
    }

    /// The code assigned to this layer itself.
    ///
    /// `None` means the layer inherits whatever its cause carries.
    #[inline]
    pub fn explicit_code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// The nearest explicitly assigned code, outermost first.
    ///
    /// Returns [`NO_CODE`](crate::NO_CODE) when no layer carries one.
    pub fn code(&self) -> ErrorCode {
        lookup::nearest_code(self)
    }

    /// The innermost error of the chain: the foreign error it terminates
    /// in, or the innermost traced layer.
    pub fn root_cause(&self) -> &(dyn Error + 'static) {
        let innermost = self.chain().last().unwrap_or(self);
        match innermost.cause.as_foreign() {
            Some(foreign) => foreign as &(dyn Error + 'static),
            None => innermost as &(dyn Error + 'static),
        }
    }

    /// Iterate over the traced layers, starting with `self`.
    pub fn chain(&self) -> Chain<'_> {
        Chain { next: Some(self) }
    }

    /// Render under an explicit format mode, ignoring the process default.
    ///
    /// ```
    /// use stacktrace::{FormatMode, new_error};
    ///
    /// let err = new_error("disk full");
    /// assert_eq!(err.display(FormatMode::Brief).to_string(), "disk full");
    /// ```
    pub fn display(&self, mode: FormatMode) -> Rendered<'_> {
        Rendered::new(self, mode)
    }
}

/// Iterator over the traced layers of a chain, outermost first.
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    next: Option<&'a TracedError>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a TracedError;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.cause.as_traced();
        Some(current)
    }
}

impl std::iter::FusedIterator for Chain<'_> {}

impl Drop for TracedError {
    fn drop(&mut self) {
        // Unlink iteratively so long chains cannot overflow the stack.
        let mut cause = std::mem::take(&mut self.cause);
        while let Cause::Traced(mut inner) = cause {
            cause = std::mem::take(&mut inner.cause);
        }
    }
}

impl Error for TracedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_error()
    }
}

impl fmt::Display for TracedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format::write_chain(f, self, format::default_format())
    }
}

impl fmt::Debug for TracedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return f
                .debug_struct("TracedError")
                .field("message", &self.message)
                .field("code", &self.code)
                .field("frame", &self.frame)
                .field("cause", &self.cause)
                .finish();
        }
        format::write_chain(f, self, FormatMode::Full)
    }
}
