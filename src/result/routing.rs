//! Callback-style error routing
//!
//! Every operation returns [`Result`]. Callers that prefer success/error
//! callbacks wrap the result with [`Routed`]: non-fatal errors are handed
//! to the error callback as an [`ErrorPayload`] and swallowed, fatal ones
//! (malformed table JSON, missing database directory) still come back as
//! `Err`.

use crate::core::{ErrorPayload, Result};

pub trait Routed<T> {
    /// Invoke exactly one of the callbacks.
    fn route<S, E>(self, on_success: S, on_error: E) -> Result<()>
    where
        S: FnOnce(T),
        E: FnOnce(ErrorPayload);

    /// Send errors to `on_error` and keep the value, if any.
    fn or_route<E>(self, on_error: E) -> Result<Option<T>>
    where
        E: FnOnce(ErrorPayload);
}

impl<T> Routed<T> for Result<T> {
    fn route<S, E>(self, on_success: S, on_error: E) -> Result<()>
    where
        S: FnOnce(T),
        E: FnOnce(ErrorPayload),
    {
        match self {
            Ok(value) => {
                on_success(value);
                Ok(())
            }
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                on_error(err.payload());
                Ok(())
            }
        }
    }

    fn or_route<E>(self, on_error: E) -> Result<Option<T>>
    where
        E: FnOnce(ErrorPayload),
    {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                on_error(err.payload());
                Ok(None)
            }
        }
    }
}
