/*!
 * RTSP recording and viewing via external media tools
 *
 * Recording runs FFmpeg in segment mode so an interrupted session still
 * leaves playable files behind. A session is a scoped acquisition: `stop`
 * asks FFmpeg to finish the in-flight segment and waits for it, and the
 * `Drop` impl runs the same shutdown on every exit path, so every start is
 * paired with exactly one stop even when the waiting period is interrupted.
 */

use chrono::Local;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::error::{PinError, Result};

/// How long to wait for FFmpeg to finalize the current segment after a
/// graceful quit before escalating to kill
const STOP_GRACE: Duration = Duration::from_secs(5);

/// Segment-mode recorder for an RTSP stream
#[derive(Debug, Clone)]
pub struct RtspRecorder {
    ffmpeg_path: String,
    save_dir: PathBuf,
    segment_time: u32,
}

impl RtspRecorder {
    pub fn new(ffmpeg_path: impl Into<String>, save_dir: impl Into<PathBuf>, segment_time: u32) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            save_dir: save_dir.into(),
            segment_time,
        }
    }

    /// Start recording. The save directory is created on demand; segment
    /// files are named after the session start time.
    pub fn start(&self, url: &str) -> Result<RecordingSession> {
        std::fs::create_dir_all(&self.save_dir)?;

        let pattern = segment_pattern(&self.save_dir);
        let args = build_ffmpeg_args(url, self.segment_time, &pattern);
        info!(url, save_dir = %self.save_dir.display(), "starting recording");

        let child = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| PinError::Media(format!("failed to run '{}': {}", self.ffmpeg_path, e)))?;

        Ok(RecordingSession {
            child,
            save_dir: self.save_dir.clone(),
            stopped: false,
        })
    }
}

/// A running FFmpeg recording; stopping is guaranteed via `Drop`
#[derive(Debug)]
pub struct RecordingSession {
    child: Child,
    save_dir: PathBuf,
    stopped: bool,
}

impl RecordingSession {
    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// Stop the recording and wait for the in-flight segment to finalize
    pub fn stop(mut self) -> Result<()> {
        self.shutdown();
        Ok(())
    }

    /// Graceful shutdown: 'q' on stdin asks FFmpeg to close the current
    /// segment; kill is the fallback when it does not comply in time.
    fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;

        if let Some(stdin) = self.child.stdin.as_mut() {
            let _ = stdin.write_all(b"q");
            let _ = stdin.flush();
        }
        // Closing stdin unblocks FFmpeg if it never read the 'q'
        drop(self.child.stdin.take());

        let deadline = Instant::now() + STOP_GRACE;
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    debug!(%status, "recorder exited");
                    break;
                }
                Ok(None) => {
                    if Instant::now() >= deadline {
                        warn!("recorder did not exit in time, killing");
                        let _ = self.child.kill();
                        let _ = self.child.wait();
                        break;
                    }
                    std::thread::sleep(Duration::from_millis(50));
                }
                Err(e) => {
                    warn!(error = %e, "failed to wait on recorder");
                    break;
                }
            }
        }
        info!(save_dir = %self.save_dir.display(), "recording finished");
    }

    #[cfg(test)]
    fn from_child(child: Child, save_dir: PathBuf) -> Self {
        Self {
            child,
            save_dir,
            stopped: false,
        }
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// strftime output pattern for this session's segment files
fn segment_pattern(save_dir: &Path) -> String {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    save_dir
        .join(format!("luci_{}_%03d.mp4", stamp))
        .to_string_lossy()
        .into_owned()
}

/// FFmpeg arguments for segment-mode RTSP recording with stream copy
fn build_ffmpeg_args(url: &str, segment_time: u32, output_pattern: &str) -> Vec<String> {
    vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "warning".to_string(),
        "-rtsp_transport".to_string(),
        "tcp".to_string(),
        "-i".to_string(),
        url.to_string(),
        "-c".to_string(),
        "copy".to_string(),
        "-f".to_string(),
        "segment".to_string(),
        "-segment_time".to_string(),
        segment_time.to_string(),
        "-reset_timestamps".to_string(),
        "1".to_string(),
        output_pattern.to_string(),
    ]
}

/// Open the stream in ffplay and block until the viewer window is closed
pub fn view_stream(ffplay_path: &str, url: &str) -> Result<()> {
    info!(url, "opening stream viewer");
    let status = Command::new(ffplay_path)
        .args(["-rtsp_transport", "tcp", "-window_title", "LUCI Pin", url])
        .status()
        .map_err(|e| PinError::Media(format!("failed to run '{}': {}", ffplay_path, e)))?;
    debug!(%status, "viewer closed");
    Ok(())
}

/// Extract a single-frame JPEG thumbnail from a local video file
pub fn extract_thumbnail(ffmpeg_path: &str, video: &Path, out_jpg: &Path) -> Result<()> {
    let output = Command::new(ffmpeg_path)
        .args(["-y", "-hide_banner", "-loglevel", "error", "-i"])
        .arg(video)
        .args(["-ss", "00:00:01", "-frames:v", "1"])
        .arg(out_jpg)
        .output()
        .map_err(|e| PinError::Media(format!("failed to run '{}': {}", ffmpeg_path, e)))?;

    if !output.status.success() || !out_jpg.exists() {
        return Err(PinError::Media(format!(
            "thumbnail extraction failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ffmpeg_args_shape() {
        let args = build_ffmpeg_args("rtsp://192.168.4.1:50001/live/0", 5, "out/luci_%03d.mp4");
        assert!(args.contains(&"rtsp://192.168.4.1:50001/live/0".to_string()));
        assert!(args.contains(&"segment".to_string()));
        let idx = args.iter().position(|a| a == "-segment_time").unwrap();
        assert_eq!(args[idx + 1], "5");
        assert_eq!(args.last().unwrap(), "out/luci_%03d.mp4");
    }

    #[test]
    fn test_segment_pattern_under_save_dir() {
        let pattern = segment_pattern(Path::new("recordings"));
        assert!(pattern.starts_with("recordings"));
        assert!(pattern.ends_with("_%03d.mp4"));
    }

    #[cfg(unix)]
    #[test]
    fn test_stop_waits_out_child() {
        crate::logging::init_test_logging();
        // cat blocks on stdin; closing it makes cat exit, which is the
        // graceful path shutdown() relies on
        let child = Command::new("cat")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .unwrap();
        let session = RecordingSession::from_child(child, PathBuf::from("recordings"));
        session.stop().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_drop_stops_unstopped_session() {
        let child = Command::new("cat")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .unwrap();
        let session = RecordingSession::from_child(child, PathBuf::from("recordings"));
        // Early interruption path: session dropped without an explicit stop
        drop(session);
    }

    #[cfg(unix)]
    #[test]
    fn test_stop_is_noop_on_exited_child() {
        let child = Command::new("true")
            .stdin(Stdio::piped())
            .spawn()
            .unwrap();
        std::thread::sleep(Duration::from_millis(100));
        let session = RecordingSession::from_child(child, PathBuf::from("recordings"));
        session.stop().unwrap();
    }
}
