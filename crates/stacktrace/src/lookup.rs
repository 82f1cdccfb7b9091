//! Code lookup and root-cause resolution over arbitrary error values.

use std::error::Error;

use crate::code::{ErrorCode, NO_CODE};
use crate::record::TracedError;

/// The nearest explicitly assigned code of `err`.
///
/// Walks the chain outermost first; the first layer with an explicit code
/// wins, shadowing codes set deeper in the chain. Foreign errors and `None`
/// yield [`NO_CODE`].
///
/// ```
/// use stacktrace::{ErrorCode, NO_CODE, TracedError, get_code, new_error_with_code, propagate};
///
/// const ECODE_INVALID: ErrorCode = ErrorCode::new(1);
///
/// let err = new_error_with_code(ECODE_INVALID, "bad input");
/// let err = propagate(Some(err), "handling request");
/// assert_eq!(get_code(err.as_ref()), ECODE_INVALID);
///
/// assert_eq!(get_code::<TracedError>(None), NO_CODE);
/// assert_eq!(get_code(Some(&std::io::Error::other("eof"))), NO_CODE);
/// ```
pub fn get_code<E>(err: Option<&E>) -> ErrorCode
where
    E: Error + 'static,
{
    get_dyn_code(err.map(|err| err as &(dyn Error + 'static)))
}

/// [`get_code`] for type-erased errors.
pub fn get_dyn_code(err: Option<&(dyn Error + 'static)>) -> ErrorCode {
    err.and_then(|err| err.downcast_ref::<TracedError>())
        .map_or(NO_CODE, TracedError::code)
}

/// The innermost error behind `err`.
///
/// For a traced chain this is the foreign error it terminates in, or the
/// innermost traced layer. Any other error is its own root cause.
pub fn root_cause<E>(err: &E) -> &(dyn Error + 'static)
where
    E: Error + 'static,
{
    dyn_root_cause(err)
}

/// [`root_cause`] for type-erased errors.
pub fn dyn_root_cause<'a>(err: &'a (dyn Error + 'static)) -> &'a (dyn Error + 'static) {
    match err.downcast_ref::<TracedError>() {
        Some(traced) => traced.root_cause(),
        None => err,
    }
}

pub(crate) fn nearest_code(err: &TracedError) -> ErrorCode {
    err.chain()
        .find_map(TracedError::explicit_code)
        .unwrap_or(NO_CODE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cause::Cause;
    use crate::frame::Frame;
    use pretty_assertions::assert_eq;
    use std::io;

    const A: ErrorCode = ErrorCode::new(10);
    const B: ErrorCode = ErrorCode::new(20);

    fn layer(cause: Cause, code: Option<ErrorCode>) -> TracedError {
        TracedError::build(String::new(), cause, code, Frame::new("src/lib.rs", 1, "f"))
    }

    fn wrap(inner: TracedError, code: Option<ErrorCode>) -> TracedError {
        layer(Cause::Traced(Box::new(inner)), code)
    }

    #[test]
    fn none_has_no_code() {
        assert_eq!(get_code::<TracedError>(None), NO_CODE);
        assert_eq!(get_dyn_code(None), NO_CODE);
    }

    #[test]
    fn foreign_has_no_code() {
        let err = io::Error::other("eof");
        assert_eq!(get_code(Some(&err)), NO_CODE);
    }

    #[test]
    fn absent_code_inherits_from_cause() {
        let err = wrap(wrap(layer(Cause::None, Some(A)), None), None);
        assert_eq!(get_code(Some(&err)), A);
    }

    #[test]
    fn outermost_explicit_code_wins() {
        let err = wrap(wrap(layer(Cause::None, Some(A)), None), Some(B));
        assert_eq!(get_code(Some(&err)), B);
    }

    #[test]
    fn explicit_no_code_shadows_inner_code() {
        let err = wrap(layer(Cause::None, Some(A)), Some(NO_CODE));
        assert_eq!(err.code(), NO_CODE);
    }

    #[test]
    fn code_behind_foreign_terminal_is_not_consulted() {
        let err = wrap(layer(Cause::from_error(io::Error::other("eof")), None), None);
        assert_eq!(err.code(), NO_CODE);
    }

    #[test]
    fn lookup_is_idempotent() {
        let err = wrap(layer(Cause::None, Some(A)), None);
        assert_eq!(err.code(), err.code());
    }

    #[test]
    fn dyn_lookup_downcasts_traced() {
        let err = layer(Cause::None, Some(B));
        let erased: &(dyn Error + 'static) = &err;
        assert_eq!(get_dyn_code(Some(erased)), B);
    }

    #[test]
    fn dyn_root_cause_walks_traced_chain() {
        let inner = layer(Cause::from_error(io::Error::other("reset")), None);
        let err = wrap(inner, Some(A));
        let erased: &(dyn Error + 'static) = &err;
        assert_eq!(dyn_root_cause(erased).to_string(), "reset");

        let foreign = io::Error::other("plain");
        let erased: &(dyn Error + 'static) = &foreign;
        assert_eq!(dyn_root_cause(erased).to_string(), "plain");
    }

    #[test]
    fn root_cause_of_foreign_is_itself() {
        let err = io::Error::other("eof");
        assert_eq!(root_cause(&err).to_string(), "eof");
    }
}
