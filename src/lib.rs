/*!
 * pinlink - LUCI Pin desktop toolkit
 *
 * Device discovery over USB/ADB or Wi-Fi with a persistent IP cache,
 * RTSP recording and viewing through FFmpeg, device health inspection,
 * and a windowed file browser over the ADB bridge.
 */

pub mod adb;
pub mod browse;
pub mod cache;
pub mod cli_style;
pub mod config;
pub mod connect;
pub mod device;
pub mod error;
pub mod fsops;
pub mod hotspot;
pub mod logging;
pub mod output;
pub mod probe;
pub mod recorder;
pub mod stream;

// Re-export commonly used types
pub use adb::{AdbClient, AdbTransport, ShellOutput, Transport};
pub use cache::IpCache;
pub use config::PinConfig;
pub use connect::{AdbBridge, Connection, Connector, DeviceBridge};
pub use error::{PinError, Result};
pub use hotspot::{CredentialSource, HotspotCredentials, HotspotJoiner, PromptCredentials};
pub use probe::{Reachability, TcpProbe};
pub use recorder::{RecordingSession, RtspRecorder};
pub use stream::StreamEndpoint;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_semver_shaped() {
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert_eq!(parts.len(), 3, "expected major.minor.patch, got {VERSION}");
        for part in parts {
            part.parse::<u64>().expect("version component is numeric");
        }
    }
}
