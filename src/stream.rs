/*!
 * RTSP stream endpoint
 */

/// Default RTSP port on the LUCI Pin
pub const DEFAULT_STREAM_PORT: u16 = 50001;

/// Default RTSP path on the LUCI Pin
pub const DEFAULT_STREAM_PATH: &str = "/live/0";

/// Assembled-at-use-time stream address; no independent lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEndpoint {
    pub ip: String,
    pub port: u16,
    pub path: String,
}

impl StreamEndpoint {
    pub fn new(ip: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            port,
            path: path.into(),
        }
    }

    /// Endpoint on the default port and path
    pub fn with_defaults(ip: impl Into<String>) -> Self {
        Self::new(ip, DEFAULT_STREAM_PORT, DEFAULT_STREAM_PATH)
    }

    /// Render as `rtsp://<ip>:<port><path>`
    pub fn url(&self) -> String {
        format!("rtsp://{}:{}{}", self.ip, self.port, self.path)
    }
}

impl std::fmt::Display for StreamEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_format() {
        let ep = StreamEndpoint::new("192.168.4.1", 50001, "/live/0");
        assert_eq!(ep.url(), "rtsp://192.168.4.1:50001/live/0");
    }

    #[test]
    fn test_defaults() {
        let ep = StreamEndpoint::with_defaults("10.0.0.5");
        assert_eq!(ep.port, DEFAULT_STREAM_PORT);
        assert_eq!(ep.url(), "rtsp://10.0.0.5:50001/live/0");
    }
}
