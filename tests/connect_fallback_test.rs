/*!
 * Integration tests for the connection fallback chain
 *
 * The orchestrator is exercised against scripted probe/bridge/credential
 * doubles and a real cache file in a temp directory. Call counters are
 * shared handles because the connector takes ownership of its parts.
 */

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use tempfile::tempdir;

use pinlink::connect::{Connector, DeviceBridge};
use pinlink::error::PinError;
use pinlink::hotspot::{CredentialSource, HotspotCredentials};
use pinlink::probe::Reachability;
use pinlink::IpCache;

const PORT: u16 = 50001;

/// Probe answering from a pre-recorded script, one answer per call
struct ScriptedProbe {
    script: RefCell<VecDeque<bool>>,
}

impl ScriptedProbe {
    fn new(script: &[bool]) -> Self {
        Self {
            script: RefCell::new(script.iter().copied().collect()),
        }
    }
}

impl Reachability for ScriptedProbe {
    fn reachable(&self, _host: &str, _port: u16) -> bool {
        self.script.borrow_mut().pop_front().unwrap_or(false)
    }
}

/// Bridge with scripted devices and per-call IP answers
struct ScriptedBridge {
    devices: Vec<String>,
    ips: RefCell<VecDeque<Option<String>>>,
    discover_calls: Rc<Cell<usize>>,
    join_calls: Rc<Cell<usize>>,
}

impl ScriptedBridge {
    fn new(devices: &[&str], ips: &[Option<&str>]) -> Self {
        Self {
            devices: devices.iter().map(|s| s.to_string()).collect(),
            ips: RefCell::new(ips.iter().map(|ip| ip.map(str::to_string)).collect()),
            discover_calls: Rc::new(Cell::new(0)),
            join_calls: Rc::new(Cell::new(0)),
        }
    }
}

impl DeviceBridge for ScriptedBridge {
    fn discover(&self) -> pinlink::Result<Vec<String>> {
        self.discover_calls.set(self.discover_calls.get() + 1);
        Ok(self.devices.clone())
    }

    fn device_ip(&self, _serial: &str) -> pinlink::Result<Option<String>> {
        Ok(self.ips.borrow_mut().pop_front().flatten())
    }

    fn join_hotspot(&self, _serial: &str, _creds: &HotspotCredentials) -> pinlink::Result<()> {
        self.join_calls.set(self.join_calls.get() + 1);
        Ok(())
    }
}

/// Credential source that records whether it was ever consulted
struct RecordingCreds {
    asked: Rc<Cell<bool>>,
}

impl RecordingCreds {
    fn new() -> Self {
        Self {
            asked: Rc::new(Cell::new(false)),
        }
    }
}

impl CredentialSource for RecordingCreds {
    fn obtain(&self) -> pinlink::Result<HotspotCredentials> {
        self.asked.set(true);
        HotspotCredentials::new("testnet", "testpass")
    }
}

fn cache_with(dir: &tempfile::TempDir, ip: Option<&str>) -> IpCache {
    let cache = IpCache::new(dir.path().join("device_ip"));
    if let Some(ip) = ip {
        cache.store(ip).unwrap();
    }
    cache
}

#[test]
fn cached_reachable_ip_skips_discovery() {
    let dir = tempdir().unwrap();
    let cache = cache_with(&dir, Some("192.168.4.1"));
    let bridge = ScriptedBridge::new(&["ABC123"], &[]);
    let discover_calls = bridge.discover_calls.clone();
    let creds = RecordingCreds::new();

    let connector = Connector::new(cache, ScriptedProbe::new(&[true]), bridge, PORT);
    let connection = connector.establish(&creds).unwrap();

    assert_eq!(connection.ip, "192.168.4.1");
    assert_eq!(connection.serial, None);
    assert_eq!(discover_calls.get(), 0);
    assert!(!creds.asked.get());
}

#[test]
fn no_cache_and_no_device_fails_without_prompt() {
    let dir = tempdir().unwrap();
    let cache = cache_with(&dir, None);
    let creds = RecordingCreds::new();

    let connector = Connector::new(
        cache,
        ScriptedProbe::new(&[]),
        ScriptedBridge::new(&[], &[]),
        PORT,
    );
    let err = connector.establish(&creds).unwrap_err();

    assert!(matches!(err, PinError::DeviceNotFound));
    assert!(!creds.asked.get());
}

#[test]
fn discovered_reachable_ip_is_persisted() {
    let dir = tempdir().unwrap();
    let cache = cache_with(&dir, None);
    let cache_path = cache.path().to_path_buf();
    let creds = RecordingCreds::new();

    let connector = Connector::new(
        cache,
        ScriptedProbe::new(&[true]),
        ScriptedBridge::new(&["ABC123"], &[Some("192.168.4.9")]),
        PORT,
    );
    let connection = connector.establish(&creds).unwrap();

    assert_eq!(connection.ip, "192.168.4.9");
    assert_eq!(connection.serial.as_deref(), Some("ABC123"));
    assert!(!creds.asked.get());
    assert_eq!(
        IpCache::new(cache_path).load().as_deref(),
        Some("192.168.4.9")
    );
}

#[test]
fn stale_cache_retries_same_ip_via_discovery() {
    // Cached IP refuses the first probe, then the same ADB-reported IP
    // answers on retry: cache keeps that IP, no hotspot prompt occurs.
    let dir = tempdir().unwrap();
    let cache = cache_with(&dir, Some("192.168.4.1"));
    let cache_path = cache.path().to_path_buf();
    let bridge = ScriptedBridge::new(&["ABC123"], &[Some("192.168.4.1")]);
    let join_calls = bridge.join_calls.clone();
    let creds = RecordingCreds::new();

    let connector = Connector::new(cache, ScriptedProbe::new(&[false, true]), bridge, PORT);
    let connection = connector.establish(&creds).unwrap();

    assert_eq!(connection.ip, "192.168.4.1");
    assert_eq!(connection.serial.as_deref(), Some("ABC123"));
    assert!(!creds.asked.get());
    assert_eq!(join_calls.get(), 0);
    assert_eq!(
        IpCache::new(cache_path).load().as_deref(),
        Some("192.168.4.1")
    );
}

#[test]
fn hotspot_join_recovers_unreachable_device() {
    // No usable IP before the join, a reachable one after it
    let dir = tempdir().unwrap();
    let cache = cache_with(&dir, None);
    let cache_path = cache.path().to_path_buf();
    let bridge = ScriptedBridge::new(&["ABC123"], &[None, Some("192.168.4.5")]);
    let join_calls = bridge.join_calls.clone();
    let creds = RecordingCreds::new();

    let connector = Connector::new(cache, ScriptedProbe::new(&[true]), bridge, PORT);
    let connection = connector.establish(&creds).unwrap();

    assert_eq!(connection.ip, "192.168.4.5");
    assert!(creds.asked.get());
    assert_eq!(join_calls.get(), 1);
    assert_eq!(
        IpCache::new(cache_path).load().as_deref(),
        Some("192.168.4.5")
    );
}

#[test]
fn unreachable_after_join_is_fatal_and_not_cached() {
    let dir = tempdir().unwrap();
    let cache = cache_with(&dir, None);
    let cache_path = cache.path().to_path_buf();
    // ADB-reported IP never answers, before or after the join
    let creds = RecordingCreds::new();

    let connector = Connector::new(
        cache,
        ScriptedProbe::new(&[false, false]),
        ScriptedBridge::new(&["ABC123"], &[Some("192.168.4.5"), Some("192.168.4.5")]),
        PORT,
    );
    let err = connector.establish(&creds).unwrap_err();

    assert!(matches!(err, PinError::StreamUnreachable { .. }));
    assert!(creds.asked.get());
    assert_eq!(IpCache::new(cache_path).load(), None);
}
