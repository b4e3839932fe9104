/*!
 * Error types for pinlink
 */

use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, PinError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_SOFT: i32 = 1;
pub const EXIT_FATAL: i32 = 2;

#[derive(Debug)]
pub enum PinError {
    /// No device visible to the bridge tool
    DeviceNotFound,

    /// Bridge tool failed at the process level (missing binary, spawn error)
    Bridge(String),

    /// Bridge command exceeded the overall command timeout
    BridgeTimeout { seconds: u64 },

    /// Hotspot join routine exited non-zero; carries its diagnostic output
    HotspotJoin { output: String },

    /// Stream port unreachable after all connection methods were exhausted
    StreamUnreachable { ip: String, port: u16 },

    /// Device reported no usable IP address
    IpNotDetected,

    /// Media tool (ffmpeg/ffplay) failure
    Media(String),

    /// Remote file operation failure; carries the bridge diagnostic
    Transfer(String),

    /// Configuration error
    Config(String),

    /// Invalid user input (empty SSID, malformed path, ...)
    InvalidInput(String),

    /// I/O error
    Io(io::Error),

    /// Generic error with message
    Other(String),
}

impl PinError {
    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        if self.is_fatal() {
            EXIT_FATAL
        } else {
            EXIT_SOFT
        }
    }

    /// Fatal errors abort the connection sequence; everything else is a
    /// soft failure the caller may retry or report and continue from.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PinError::DeviceNotFound
                | PinError::HotspotJoin { .. }
                | PinError::StreamUnreachable { .. }
                | PinError::Config(_)
                | PinError::InvalidInput(_)
        )
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> ErrorCategory {
        match self {
            PinError::DeviceNotFound => ErrorCategory::Discovery,
            PinError::Bridge(_) | PinError::BridgeTimeout { .. } => ErrorCategory::Bridge,
            PinError::HotspotJoin { .. } => ErrorCategory::Hotspot,
            PinError::StreamUnreachable { .. } | PinError::IpNotDetected => {
                ErrorCategory::Reachability
            }
            PinError::Media(_) => ErrorCategory::Media,
            PinError::Transfer(_) => ErrorCategory::Transfer,
            PinError::Config(_) => ErrorCategory::Configuration,
            PinError::InvalidInput(_) => ErrorCategory::Validation,
            PinError::Io(_) => ErrorCategory::IoError,
            PinError::Other(_) => ErrorCategory::Unknown,
        }
    }

    /// Remediation hints shown when discovery fails
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            PinError::DeviceNotFound => Some(
                "If the device is already on Wi-Fi, check that the cached IP is valid.\n\
                 Otherwise connect the LUCI Pin over USB and enable ADB.",
            ),
            PinError::StreamUnreachable { .. } => {
                Some("Verify the device joined the hotspot and the stream service is running.")
            }
            _ => None,
        }
    }
}

/// Error category for classification and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Device discovery errors
    Discovery,
    /// Bridge tool process errors
    Bridge,
    /// Hotspot join errors
    Hotspot,
    /// Stream/IP reachability errors
    Reachability,
    /// External media tool errors
    Media,
    /// Remote file transfer errors
    Transfer,
    /// Configuration errors
    Configuration,
    /// Input validation errors
    Validation,
    /// I/O operation errors
    IoError,
    /// Uncategorized errors
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Discovery => write!(f, "discovery"),
            ErrorCategory::Bridge => write!(f, "bridge"),
            ErrorCategory::Hotspot => write!(f, "hotspot"),
            ErrorCategory::Reachability => write!(f, "reachability"),
            ErrorCategory::Media => write!(f, "media"),
            ErrorCategory::Transfer => write!(f, "transfer"),
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Validation => write!(f, "validation"),
            ErrorCategory::IoError => write!(f, "io"),
            ErrorCategory::Unknown => write!(f, "unknown"),
        }
    }
}

impl fmt::Display for PinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinError::DeviceNotFound => write!(f, "No LUCI Pin detected via ADB"),
            PinError::Bridge(msg) => write!(f, "Bridge command failed: {}", msg),
            PinError::BridgeTimeout { seconds } => {
                write!(f, "Bridge command timed out after {}s", seconds)
            }
            PinError::HotspotJoin { output } => {
                write!(f, "Hotspot join failed: {}", output)
            }
            PinError::StreamUnreachable { ip, port } => {
                write!(f, "RTSP stream not reachable at {}:{}", ip, port)
            }
            PinError::IpNotDetected => write!(f, "Device IP address not detected"),
            PinError::Media(msg) => write!(f, "Media tool error: {}", msg),
            PinError::Transfer(msg) => write!(f, "Transfer failed: {}", msg),
            PinError::Config(msg) => write!(f, "Configuration error: {}", msg),
            PinError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            PinError::Io(err) => write!(f, "I/O error: {}", err),
            PinError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for PinError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PinError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for PinError {
    fn from(err: io::Error) -> Self {
        PinError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(PinError::DeviceNotFound.is_fatal());
        assert!(PinError::HotspotJoin {
            output: "wpa_supplicant failed".into()
        }
        .is_fatal());
        assert!(PinError::StreamUnreachable {
            ip: "192.168.4.1".into(),
            port: 50001
        }
        .is_fatal());

        // Soft failures: the orchestrator falls through to the next method
        assert!(!PinError::Bridge("adb: not found".into()).is_fatal());
        assert!(!PinError::BridgeTimeout { seconds: 30 }.is_fatal());
        assert!(
            !PinError::Io(io::Error::new(io::ErrorKind::ConnectionRefused, "refused")).is_fatal()
        );
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(PinError::DeviceNotFound.exit_code(), EXIT_FATAL);
        assert_eq!(PinError::Transfer("pull failed".into()).exit_code(), EXIT_SOFT);
    }

    #[test]
    fn test_discovery_has_remediation() {
        let err = PinError::DeviceNotFound;
        assert!(err.remediation().unwrap().contains("USB"));
        assert!(PinError::Other("x".into()).remediation().is_none());
    }

    #[test]
    fn test_category_display() {
        assert_eq!(PinError::DeviceNotFound.category().to_string(), "discovery");
        assert_eq!(
            PinError::BridgeTimeout { seconds: 1 }.category().to_string(),
            "bridge"
        );
    }
}
