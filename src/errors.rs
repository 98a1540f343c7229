use std::io;

/// All error types that can occur while running the strip firmware.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to serialize data to JSON.
    #[error("failed to dump json: {0:?}")]
    JsonDump(serde_json::Error),

    /// Failed to deserialize JSON data.
    #[error("failed to load json: {0:?}")]
    JsonLoad(serde_json::Error),

    /// A network socket operation failed while servicing a connection.
    #[error("socket {action} error: {err:?}")]
    Socket { action: String, err: io::Error },

    /// The command body named a method this device does not implement.
    #[error("unknown command method {0:?}")]
    UnknownMethod(String),

    /// The `param` object was missing a field or carried a wrong-typed value.
    #[error("invalid parameters for {method}: {err:?}")]
    Param {
        method: &'static str,
        err: serde_json::Error,
    },

    /// The request body was empty where a command was expected.
    #[error("empty command body")]
    EmptyBody,
}

impl Error {
    /// Create a new socket error
    pub fn socket(action: &str, err: io::Error) -> Self {
        Error::Socket {
            action: action.to_string(),
            err,
        }
    }

    /// Create a new invalid-parameters error
    pub fn param(method: &'static str, err: serde_json::Error) -> Self {
        Error::Param { method, err }
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
