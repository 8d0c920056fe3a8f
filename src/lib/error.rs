// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    InvalidArgument,
    /// Unparseable line in resolv.conf
    MalformedLine,
    /// Too many name servers or search domains for resolv.conf
    CapacityExceeded,
    /// MAC address not found in live system or rename unsupported
    DeviceResolution,
    MissingNetmaskOrPrefix,
    /// Platform hook not implemented by the selected backend
    UnsupportedCapability,
    CommandExecutionFailure,
    IoError,
    Bug,
}

impl ErrorKind {
    // Errors which are logged and skipped instead of failing the whole
    // render.
    pub(crate) fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ErrorKind::CapacityExceeded
                | ErrorKind::DeviceResolution
                | ErrorKind::MissingNetmaskOrPrefix
                | ErrorKind::IoError
        )
    }
}

impl Default for ErrorKind {
    fn default() -> Self {
        Self::Bug
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::fmt::Display for NetRenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.kind == ErrorKind::MalformedLine {
            write!(
                f,
                "{}: {}\n| line {}: {}",
                self.kind, self.msg, self.line_number, self.line
            )
        } else {
            write!(f, "{}: {}", self.kind, self.msg)
        }
    }
}

impl Error for NetRenderError {}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct NetRenderError {
    kind: ErrorKind,
    msg: String,
    line: String,
    line_number: usize,
}

impl NetRenderError {
    pub fn new(kind: ErrorKind, msg: String) -> Self {
        Self {
            kind,
            msg,
            ..Default::default()
        }
    }

    pub fn new_malformed_line(
        msg: String,
        line: &str,
        line_number: usize,
    ) -> Self {
        Self {
            kind: ErrorKind::MalformedLine,
            line: line.to_string(),
            msg,
            line_number,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn msg(&self) -> &str {
        self.msg.as_str()
    }

    pub fn line(&self) -> &str {
        self.line.as_str()
    }

    /// The line number of the malformed line, the first line is 1.
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl From<std::io::Error> for NetRenderError {
    fn from(e: std::io::Error) -> Self {
        NetRenderError::new(ErrorKind::IoError, format!("IO error: {e}"))
    }
}

impl From<serde_yaml::Error> for NetRenderError {
    fn from(e: serde_yaml::Error) -> Self {
        NetRenderError::new(
            ErrorKind::InvalidArgument,
            format!("Invalid network state: {e}"),
        )
    }
}

impl From<serde_json::Error> for NetRenderError {
    fn from(e: serde_json::Error) -> Self {
        NetRenderError::new(
            ErrorKind::InvalidArgument,
            format!("Invalid network state: {e}"),
        )
    }
}

impl From<std::net::AddrParseError> for NetRenderError {
    fn from(e: std::net::AddrParseError) -> Self {
        NetRenderError::new(
            ErrorKind::InvalidArgument,
            format!("Invalid IP address: {e}"),
        )
    }
}
