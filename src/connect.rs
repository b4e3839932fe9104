/*!
 * Connection orchestration
 *
 * Produces a reachable device IP using the cheapest method first:
 * cached IP, then ADB discovery, then an interactive hotspot join. The
 * working IP is persisted to the cache only after a confirmed success.
 */

use tracing::{info, warn};

use crate::cache::IpCache;
use crate::error::{PinError, Result};
use crate::hotspot::{CredentialSource, HotspotCredentials};
use crate::probe::Reachability;

/// Discovery and per-device operations the orchestrator needs from the
/// bridge. `AdbBridge` is the live implementation; tests script their own.
pub trait DeviceBridge {
    /// Enumerate bridge-visible device serials
    fn discover(&self) -> Result<Vec<String>>;

    /// The device's reported wlan0 IP, if any
    fn device_ip(&self, serial: &str) -> Result<Option<String>>;

    /// Join the device hotspot and block until the routine returns
    fn join_hotspot(&self, serial: &str, creds: &HotspotCredentials) -> Result<()>;
}

/// A resolved, reachable device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    /// Reachable stream IP
    pub ip: String,
    /// Serial of the bridge device the IP came from; None when the cached
    /// IP answered and discovery never ran
    pub serial: Option<String>,
}

/// Sequences cache lookup, reachability, discovery, and hotspot join
pub struct Connector<P: Reachability, B: DeviceBridge> {
    cache: IpCache,
    probe: P,
    bridge: B,
    stream_port: u16,
}

impl<P: Reachability, B: DeviceBridge> Connector<P, B> {
    pub fn new(cache: IpCache, probe: P, bridge: B, stream_port: u16) -> Self {
        Self {
            cache,
            probe,
            bridge,
            stream_port,
        }
    }

    /// Resolve a reachable device IP. Credentials are only requested when
    /// both the cached IP and the ADB-reported IP fail the probe.
    pub fn establish(&self, credentials: &dyn CredentialSource) -> Result<Connection> {
        // 1. Cached IP: cheapest path, skips discovery entirely
        if let Some(cached) = self.cache.load() {
            info!(ip = %cached, "found cached IP");
            if self.probe.reachable(&cached, self.stream_port) {
                info!(ip = %cached, "stream reachable via cached IP");
                return Ok(Connection {
                    ip: cached,
                    serial: None,
                });
            }
            warn!(ip = %cached, "cached IP not reachable");
        }

        // 2. Bridge discovery: no device is fatal, with remediation hints
        info!("trying ADB discovery");
        let devices = self.bridge.discover()?;
        let serial = devices.first().cloned().ok_or(PinError::DeviceNotFound)?;
        info!(serial = %serial, "connected via ADB");

        // 3. Device-reported IP
        if let Some(ip) = self.bridge.device_ip(&serial)? {
            if self.probe.reachable(&ip, self.stream_port) {
                info!(ip = %ip, "stream reachable via ADB-detected IP");
                self.cache.store(&ip)?;
                return Ok(Connection {
                    ip,
                    serial: Some(serial),
                });
            }
            warn!(ip = %ip, "ADB-detected IP not reachable");
        }

        // 4. Hotspot join, then one final reachability check
        info!("attempting hotspot connection");
        let creds = credentials.obtain()?;
        self.bridge.join_hotspot(&serial, &creds)?;

        let ip = self
            .bridge
            .device_ip(&serial)?
            .ok_or(PinError::IpNotDetected)?;
        if !self.probe.reachable(&ip, self.stream_port) {
            return Err(PinError::StreamUnreachable {
                ip,
                port: self.stream_port,
            });
        }

        self.cache.store(&ip)?;
        info!(ip = %ip, "stream reachable after hotspot join");
        Ok(Connection {
            ip,
            serial: Some(serial),
        })
    }
}

/// Live bridge over adb plus the external hotspot join routine
pub struct AdbBridge {
    adb: crate::adb::AdbClient,
    joiner: crate::hotspot::HotspotJoiner,
}

impl AdbBridge {
    pub fn new(adb: crate::adb::AdbClient, joiner: crate::hotspot::HotspotJoiner) -> Self {
        Self { adb, joiner }
    }

    pub fn adb(&self) -> &crate::adb::AdbClient {
        &self.adb
    }
}

impl DeviceBridge for AdbBridge {
    fn discover(&self) -> Result<Vec<String>> {
        self.adb.devices()
    }

    fn device_ip(&self, serial: &str) -> Result<Option<String>> {
        self.adb.detect_ip(serial)
    }

    fn join_hotspot(&self, _serial: &str, creds: &HotspotCredentials) -> Result<()> {
        self.joiner.join(creds)
    }
}
