/*!
 * TCP reachability probing
 *
 * A fast connect test against the device's stream port, used to decide
 * whether a cached or freshly detected IP is worth handing to FFmpeg.
 */

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::debug;

/// Reachability check seam; the orchestrator takes this as a capability so
/// tests can substitute a scripted prober.
pub trait Reachability {
    /// Return true iff a TCP connection to host:port completes in time.
    fn reachable(&self, host: &str, port: u16) -> bool;
}

/// Real TCP prober with a connect timeout
#[derive(Debug, Clone)]
pub struct TcpProbe {
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

impl Reachability for TcpProbe {
    fn reachable(&self, host: &str, port: u16) -> bool {
        let addrs: Vec<SocketAddr> = match (host, port).to_socket_addrs() {
            Ok(addrs) => addrs.collect(),
            Err(e) => {
                debug!(host, port, error = %e, "address resolution failed");
                return false;
            }
        };

        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(_) => return true,
                Err(e) => debug!(%addr, error = %e, "probe connect failed"),
            }
        }
        false
    }
}
