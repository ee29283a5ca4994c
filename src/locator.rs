use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid URL {input:?}: {reason}")]
pub struct LocatorError {
    input: String,
    reason: String,
}

/// A remote resource address, kept exactly as the caller wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator(String);

impl Locator {
    pub fn parse(input: &str) -> Result<Self, LocatorError> {
        reqwest::Url::parse(input).map_err(|err| LocatorError {
            input: input.to_string(),
            reason: err.to_string(),
        })?;
        Ok(Locator(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the local file this locator is stored under.
    pub fn filename(&self) -> &str {
        derive_filename(&self.0)
    }
}

impl FromStr for Locator {
    type Err = LocatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locator::parse(s)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Last `/`-separated segment of `locator`. Query and fragment are kept.
pub fn derive_filename(locator: &str) -> &str {
    locator.rsplit('/').next().unwrap_or(locator)
}
