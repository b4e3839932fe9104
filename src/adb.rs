/*!
 * ADB bridge client
 *
 * Thin wrapper over the external `adb` binary: device enumeration, shell
 * execution, and file push/pull, all parsed as line-oriented text.
 *
 * Shell execution follows one uniform policy: the trimmed stdout text is
 * always returned together with the device-side exit code, and a non-zero
 * exit is never an error by itself. Only bridge-level failures (missing
 * binary, spawn error, overall timeout) surface as `PinError`.
 */

use crossbeam_channel::{bounded, RecvTimeoutError};
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::error::{PinError, Result};

/// Interface-dump commands tried in order when resolving the device IP.
/// Covers iproute2, classic ifconfig, and BusyBox DHCP-client output.
const IP_DETECT_COMMANDS: &[&str] = &[
    "ip addr show wlan0",
    "ifconfig wlan0",
    "udhcpc -n -q -i wlan0",
];

/// Result of a device shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOutput {
    /// Trimmed standard output text
    pub stdout: String,
    /// Device-side exit code; -1 when the bridge could not report one
    pub exit_code: i32,
}

impl ShellOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Transport seam over a single connected device. The device layer and the
/// file browser talk to this trait so tests can run against an in-memory
/// mock instead of a live bridge.
pub trait Transport {
    /// Execute a shell command on the device
    fn shell(&self, command: &str) -> Result<ShellOutput>;

    /// Copy a remote file to a local path
    fn pull(&self, remote: &str, local: &Path) -> Result<()>;

    /// Copy a local file to a remote directory or path
    fn push(&self, local: &Path, remote: &str) -> Result<()>;
}

/// Client for the adb binary itself (not bound to a device)
#[derive(Debug, Clone)]
pub struct AdbClient {
    adb_path: String,
    timeout: Duration,
}

impl AdbClient {
    pub fn new(adb_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            adb_path: adb_path.into(),
            timeout,
        }
    }

    /// Enumerate connected devices, returning serials in the `device`
    /// state. Offline and unauthorized entries are skipped.
    pub fn devices(&self) -> Result<Vec<String>> {
        let raw = self.run(&["devices"])?;
        Ok(parse_devices(&raw.stdout))
    }

    /// Execute a shell command on a specific device
    pub fn shell(&self, serial: &str, command: &str) -> Result<ShellOutput> {
        let raw = self.run(&["-s", serial, "shell", command])?;
        trace!(serial, command, exit = raw.exit_code, "adb shell");
        Ok(ShellOutput {
            stdout: raw.stdout.trim().to_string(),
            exit_code: raw.exit_code,
        })
    }

    /// Pull a remote file to a local path
    pub fn pull(&self, serial: &str, remote: &str, local: &Path) -> Result<()> {
        let local_str = local.to_string_lossy();
        let raw = self.run(&["-s", serial, "pull", remote, &local_str])?;
        if raw.exit_code != 0 {
            return Err(PinError::Transfer(format!(
                "adb pull {} failed: {}",
                remote,
                raw.diagnostic()
            )));
        }
        Ok(())
    }

    /// Push a local file to a remote directory or path
    pub fn push(&self, serial: &str, local: &Path, remote: &str) -> Result<()> {
        let local_str = local.to_string_lossy();
        let raw = self.run(&["-s", serial, "push", &local_str, remote])?;
        if raw.exit_code != 0 {
            return Err(PinError::Transfer(format!(
                "adb push {} failed: {}",
                local.display(),
                raw.diagnostic()
            )));
        }
        Ok(())
    }

    /// Resolve the device's wlan0 IP, tolerating iproute2, ifconfig, and
    /// udhcpc output formats. Returns the first valid dotted-quad found.
    pub fn detect_ip(&self, serial: &str) -> Result<Option<String>> {
        for cmd in IP_DETECT_COMMANDS {
            let out = self.shell(serial, cmd)?;
            if let Some(ip) = extract_ip(&out.stdout) {
                debug!(serial, cmd, ip, "detected device IP");
                return Ok(Some(ip));
            }
        }
        Ok(None)
    }

    /// Bind this client to one device serial
    pub fn transport(&self, serial: impl Into<String>) -> AdbTransport {
        AdbTransport {
            client: self.clone(),
            serial: serial.into(),
        }
    }

    /// Run an adb invocation under the overall bridge timeout
    fn run(&self, args: &[&str]) -> Result<RawOutput> {
        run_with_timeout(&self.adb_path, args, self.timeout)
    }
}

/// A `Transport` bound to one device serial
#[derive(Debug, Clone)]
pub struct AdbTransport {
    client: AdbClient,
    serial: String,
}

impl AdbTransport {
    pub fn serial(&self) -> &str {
        &self.serial
    }
}

impl Transport for AdbTransport {
    fn shell(&self, command: &str) -> Result<ShellOutput> {
        self.client.shell(&self.serial, command)
    }

    fn pull(&self, remote: &str, local: &Path) -> Result<()> {
        self.client.pull(&self.serial, remote, local)
    }

    fn push(&self, local: &Path, remote: &str) -> Result<()> {
        self.client.push(&self.serial, local, remote)
    }
}

/// Raw process output before any policy is applied
#[derive(Debug)]
struct RawOutput {
    stdout: String,
    stderr: String,
    exit_code: i32,
}

impl RawOutput {
    /// Prefer stderr for diagnostics, fall back to stdout
    fn diagnostic(&self) -> String {
        let err = self.stderr.trim();
        if err.is_empty() {
            self.stdout.trim().to_string()
        } else {
            err.to_string()
        }
    }
}

/// Run an external command with piped output and a hard overall deadline.
/// Output pipes are drained on worker threads so a chatty child can never
/// deadlock the wait loop.
fn run_with_timeout(program: &str, args: &[&str], timeout: Duration) -> Result<RawOutput> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| PinError::Bridge(format!("failed to run '{}': {}", program, e)))?;

    let (tx, rx) = bounded::<(bool, String)>(2);

    if let Some(mut stdout) = child.stdout.take() {
        let tx = tx.clone();
        std::thread::spawn(move || {
            let mut buf = String::new();
            let _ = stdout.read_to_string(&mut buf);
            let _ = tx.send((true, buf));
        });
    }
    if let Some(mut stderr) = child.stderr.take() {
        let tx = tx.clone();
        std::thread::spawn(move || {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf);
            let _ = tx.send((false, buf));
        });
    }
    drop(tx);

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(PinError::BridgeTimeout {
                        seconds: timeout.as_secs(),
                    });
                }
                std::thread::sleep(Duration::from_millis(25));
            }
            Err(e) => {
                return Err(PinError::Bridge(format!("failed to wait on '{}': {}", program, e)))
            }
        }
    };

    let mut stdout = String::new();
    let mut stderr = String::new();
    for _ in 0..2 {
        match rx.recv_timeout(Duration::from_secs(1)) {
            Ok((true, buf)) => stdout = buf,
            Ok((false, buf)) => stderr = buf,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(RawOutput {
        stdout,
        stderr,
        exit_code: status.code().unwrap_or(-1),
    })
}

/// Parse `adb devices` output: skip the header line, keep serials whose
/// state column reads `device`.
pub fn parse_devices(raw: &str) -> Vec<String> {
    raw.lines()
        .skip(1)
        .filter_map(|line| {
            let mut cols = line.split_whitespace();
            let serial = cols.next()?;
            let state = cols.next()?;
            if state == "device" {
                Some(serial.to_string())
            } else {
                None
            }
        })
        .collect()
}

fn dotted_quad_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").expect("static pattern"))
}

/// Scan interface-dump text for the first plausible host address.
/// CIDR suffixes and `addr:` prefixes fall out of the token match; masks
/// and the all-zeros address are rejected so ifconfig's netmask column
/// cannot win over the inet address.
pub fn extract_ip(text: &str) -> Option<String> {
    for m in dotted_quad_re().find_iter(text) {
        let candidate = m.as_str();
        if !candidate.split('.').all(|octet| octet.parse::<u8>().is_ok()) {
            continue;
        }
        if candidate == "0.0.0.0" || candidate.starts_with("255.") {
            continue;
        }
        return Some(candidate.to_string());
    }
    None
}
