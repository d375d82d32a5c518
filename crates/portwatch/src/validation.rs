//! Input validation for monitored endpoints.
//!
//! The url is used verbatim as a connection host, so the only rule for it is
//! that it must not be blank. Ports are accepted as wide integers (or text) so
//! that out-of-range input can be reported with the value the user typed.

use crate::error::ValidationError;

/// Validate the host part of an endpoint
pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    if url.trim().is_empty() {
        return Err(ValidationError::EmptyUrl);
    }
    Ok(())
}

/// Validate a port number and narrow it to `u16`
pub fn validate_port(port: i64) -> Result<u16, ValidationError> {
    if (1..=i64::from(u16::MAX)).contains(&port) {
        Ok(port as u16)
    } else {
        Err(ValidationError::InvalidPort(port))
    }
}

/// Parse a port typed as text, e.g. from a command line or a legacy record
pub fn parse_port(raw: &str) -> Result<u16, ValidationError> {
    let trimmed = raw.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_| ValidationError::PortNotNumeric(trimmed.to_string()))?;
    validate_port(value)
}

/// Validate a full endpoint identity
pub fn validate_endpoint(url: &str, port: i64) -> Result<u16, ValidationError> {
    validate_url(url)?;
    validate_port(port)
}
