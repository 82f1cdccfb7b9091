//! The cause of a traced error.

use std::error::Error;

use crate::record::TracedError;

/// What a [`TracedError`] wraps.
///
/// Classification happens once, when the record is built: a
/// [`TracedError`] handed over as a plain error value is stored as
/// [`Cause::Traced`], anything else as [`Cause::Foreign`]. Code lookup and
/// rendering only ever match on this tag.
#[derive(Debug, Default)]
pub enum Cause {
    /// A root record.
    #[default]
    None,
    /// Another layer of the chain.
    Traced(Box<TracedError>),
    /// A terminal error from outside this crate. It has no frame and no code.
    Foreign(Box<dyn Error + Send + Sync + 'static>),
}

impl Cause {
    /// Classify an error value.
    pub fn from_error<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::from_boxed(Box::new(err))
    }

    /// Classify an already type-erased error.
    pub fn from_boxed(err: Box<dyn Error + Send + Sync + 'static>) -> Self {
        match err.downcast::<TracedError>() {
            Ok(traced) => Self::Traced(traced),
            Err(foreign) => Self::Foreign(foreign),
        }
    }

    /// `true` for a root record's cause.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// The next traced layer, if the cause is one.
    pub fn as_traced(&self) -> Option<&TracedError> {
        match self {
            Self::Traced(traced) => Some(&**traced),
            _ => None,
        }
    }

    /// The foreign terminal error, if the cause is one.
    pub fn as_foreign(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        match self {
            Self::Foreign(foreign) => Some(&**foreign),
            _ => None,
        }
    }

    /// The cause as a plain error reference.
    pub fn as_error(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::None => None,
            Self::Traced(traced) => Some(&**traced as &(dyn Error + 'static)),
            Self::Foreign(foreign) => Some(&**foreign as &(dyn Error + 'static)),
        }
    }
}
