//! Error types for wsdl-rs
//!
//! Every failure surfaced by the reader, the writer or the extension registry
//! is an [`Error`]: a fault code, a message, an optional location pointing into
//! the source tree and an optional wrapped cause.

use std::fmt;
use thiserror::Error;

/// Result type alias using the wsdl Error
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed cause carried by an [`Error`]
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Classification of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultCode {
    /// Structural violation of the description language
    InvalidWsdl,
    /// The underlying text is not well-formed XML
    ParserError,
    /// Registry misconfiguration
    ConfigurationError,
    /// I/O, resolution or any other failure
    OtherError,
}

impl FaultCode {
    /// Wire name of the fault code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidWsdl => "INVALID_WSDL",
            Self::ParserError => "PARSER_ERROR",
            Self::ConfigurationError => "CONFIGURATION_ERROR",
            Self::OtherError => "OTHER_ERROR",
        }
    }
}

impl fmt::Display for FaultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for wsdl operations
#[derive(Error, Debug)]
#[error("WSDLException{}: faultCode={fault_code}: {message}{}", fmt_location(.location), fmt_cause(.source))]
pub struct Error {
    /// Fault code
    pub fault_code: FaultCode,
    /// Error message
    pub message: String,
    /// Path-like pointer into the source tree
    pub location: Option<String>,
    /// Wrapped cause
    #[source]
    pub source: Option<BoxedCause>,
}

fn fmt_location(location: &Option<String>) -> String {
    match location {
        Some(loc) => format!(" (at {})", loc),
        None => String::new(),
    }
}

fn fmt_cause(source: &Option<BoxedCause>) -> String {
    match source {
        Some(cause) => format!(": {}", cause),
        None => String::new(),
    }
}

impl Error {
    /// Create a new error
    pub fn new(fault_code: FaultCode, message: impl Into<String>) -> Self {
        Self {
            fault_code,
            message: message.into(),
            location: None,
            source: None,
        }
    }

    /// Structural violation
    pub fn invalid_wsdl(message: impl Into<String>) -> Self {
        Self::new(FaultCode::InvalidWsdl, message)
    }

    /// Malformed XML
    pub fn parser(message: impl Into<String>) -> Self {
        Self::new(FaultCode::ParserError, message)
    }

    /// Registry misconfiguration
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(FaultCode::ConfigurationError, message)
    }

    /// Any other failure
    pub fn other(message: impl Into<String>) -> Self {
        Self::new(FaultCode::OtherError, message)
    }

    /// Attach a wrapped cause
    pub fn with_source(mut self, source: impl Into<BoxedCause>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the location unless an inner frame already did
    pub fn with_location_if_unset(mut self, location: &str) -> Self {
        if self.location.is_none() {
            self.location = Some(location.to_string());
        }
        self
    }

    /// Check the fault code
    pub fn is(&self, fault_code: FaultCode) -> bool {
        self.fault_code == fault_code
    }
}

impl From<roxmltree::Error> for Error {
    fn from(err: roxmltree::Error) -> Self {
        Error::parser(format!("Problem parsing document: {}", err)).with_source(err)
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::other(format!("Problem writing document: {}", err)).with_source(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::other(format!("I/O error: {}", err)).with_source(err)
    }
}
