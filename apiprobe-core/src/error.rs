use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection-level failure (refused, reset, timed out). Carries the
    /// endpoint and how long the attempt ran before giving up. Never
    /// retried by the client.
    #[error("transport failure on \"{endpoint}\" after {elapsed:?}: {source}")]
    Transport {
        endpoint: String,
        elapsed: Duration,
        #[source]
        source: reqwest::Error,
    },
    /// The body was expected to be JSON but was not. Distinct from a
    /// transport failure and never silently swallowed.
    #[error("non-JSON body from \"{endpoint}\": {source}")]
    Parse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    /// Occurs when `apiprobe.toml` fails to load or deserialize.
    #[error("failed to load apiprobe.toml: {0}")]
    Config(String),
}
