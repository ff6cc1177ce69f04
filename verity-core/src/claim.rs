use std::fmt;

use serde::Serialize;

use crate::analyzer::AnalysisError;

/// A news statement submitted for checking.
///
/// The text is kept exactly as submitted: it is both the search query and the
/// text quoted to the model. Whitespace only matters for the emptiness check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Claim(String);

impl Claim {
    pub fn parse(raw: &str) -> Result<Self, AnalysisError> {
        if raw.trim().is_empty() {
            return Err(AnalysisError::EmptyClaim);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
