//! Structured output for CLI results: human-readable or JSON.

use serde::Serialize;

use crate::cli_style::{self, Theme};

/// Output mode for CLI results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Result of a connection attempt
#[derive(Debug, Serialize)]
pub struct ConnectReport {
    pub ip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    pub stream_url: String,
}

/// Device health snapshot for `status`
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub serial: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    pub storage: String,
    pub os_release: String,
    pub uptime: String,
}

/// Writer supporting both human-readable and JSON output
#[derive(Debug, Clone, Copy)]
pub struct OutputWriter {
    pub mode: OutputMode,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self {
            mode: if json { OutputMode::Json } else { OutputMode::Human },
        }
    }

    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    pub fn connect_report(&self, report: &ConnectReport) {
        match self.mode {
            OutputMode::Json => print_json(report),
            OutputMode::Human => {
                cli_style::print_success(&format!(
                    "Device reachable at {}",
                    Theme::value(&report.ip)
                ));
                println!("  Stream: {}", Theme::primary(&report.stream_url));
                if let Some(serial) = &report.serial {
                    println!("  Serial: {}", Theme::muted(serial));
                }
            }
        }
    }

    pub fn status_report(&self, report: &StatusReport) {
        match self.mode {
            OutputMode::Json => print_json(report),
            OutputMode::Human => {
                let rows = [
                    ("Serial", report.serial.clone()),
                    (
                        "IP address",
                        report.ip.clone().unwrap_or_else(|| "not detected".to_string()),
                    ),
                    ("Uptime", report.uptime.clone()),
                    ("OS release", report.os_release.clone()),
                    ("Storage", report.storage.clone()),
                ];
                println!("{}", cli_style::device_status_table(&rows));
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    if let Ok(json) = serde_json::to_string_pretty(value) {
        println!("{}", json);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_report_serializes() {
        let report = ConnectReport {
            ip: "192.168.4.1".to_string(),
            serial: None,
            stream_url: "rtsp://192.168.4.1:50001/live/0".to_string(),
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("192.168.4.1"));
        // serial is omitted when discovery never ran
        assert!(!json.contains("serial"));
    }

    #[test]
    fn test_writer_mode() {
        assert!(OutputWriter::new(true).is_json());
        assert!(!OutputWriter::new(false).is_json());
    }
}
