/*!
 * Device inspection over the bridge transport
 *
 * Wraps the shell queries the LUCI Pin answers on BusyBox: storage usage,
 * OS release, uptime, and the wlan0 address.
 */

use crate::adb::{extract_ip, ShellOutput, Transport};
use crate::error::Result;

/// High-level device information interface
pub struct DeviceShell<T: Transport> {
    transport: T,
}

impl<T: Transport> DeviceShell<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Storage usage (`df -h`)
    pub fn storage(&self) -> Result<ShellOutput> {
        self.transport.shell("df -h")
    }

    /// OS / configuration information (`cat /etc/os-release`)
    pub fn os_release(&self) -> Result<ShellOutput> {
        self.transport.shell("cat /etc/os-release")
    }

    /// Device uptime
    pub fn uptime(&self) -> Result<ShellOutput> {
        self.transport.shell("uptime")
    }

    /// The wlan0 IP address, if the interface has one
    pub fn ip_address(&self) -> Result<Option<String>> {
        let out = self.transport.shell("ip addr show wlan0")?;
        Ok(extract_ip(&out.stdout))
    }
}
