use colored::*;
use count_contigs_core::{ClientError, CountContigsResults, JsonRpcError};
use std::fmt::Display;

/// A wrapper struct for a formatted, colored string.
///
/// Implements `Display` so it can be printed directly.
pub struct FormattedString(pub String);

pub struct GenericError<T: Display>(pub &'static str, pub T);

impl std::fmt::Display for FormattedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", self.0)?;
        Ok(())
    }
}

impl From<CountContigsResults> for FormattedString {
    fn from(results: CountContigsResults) -> Self {
        let value = serde_json::to_value(&results).unwrap_or_default();
        FormattedString(serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()))
    }
}

impl From<ClientError> for FormattedString {
    fn from(err: ClientError) -> Self {
        FormattedString(format!(
            "{}\n\n'{}'",
            "Failed to create the client:".red().bold(),
            err
        ))
    }
}

impl From<JsonRpcError> for FormattedString {
    fn from(err: JsonRpcError) -> Self {
        match err {
            JsonRpcError::Server(error) => {
                let mut out = format!(
                    "{} name={:?} code={} message={:?}",
                    "Server Error:".red().bold(),
                    error.name,
                    error.code,
                    error.message
                );
                if let Some(data) = error.data.as_ref().and_then(|d| d.as_str()) {
                    out.push_str(&format!("\n\n{}", data.dimmed()));
                }
                FormattedString(out)
            }
            err => FormattedString(format!("{}\n\n'{}'", "Call Failed:".red().bold(), err)),
        }
    }
}

impl<T: Display> From<GenericError<T>> for FormattedString {
    fn from(GenericError(msg, err): GenericError<T>) -> Self {
        FormattedString(format!("{}\n\n'{}'", msg.red().bold(), err))
    }
}
