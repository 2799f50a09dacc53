//! Video decoding through an `ffmpeg` child process.
//!
//! The file is probed with `ffprobe` for its size and frame rate, then decoded
//! as raw `rgb24` frames streamed over the child's stdout.

use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use serde::Deserialize;
use tracing::{debug, info, warn};

use ascii_video_core::{Error, Result};

use crate::source::{Frame, FrameSource};

/// Stream properties reported by `ffprobe`.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    /// Source file
    pub path: PathBuf,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Frames per second, 0 when unknown
    pub fps: f64,
    /// Frame count, when the container reports it
    pub frame_count: Option<usize>,
}

impl VideoInfo {
    /// Bytes in one decoded `rgb24` frame.
    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

#[derive(Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    nb_frames: Option<String>,
}

#[derive(Deserialize)]
struct ProbeOut {
    streams: Vec<ProbeStream>,
}

/// Parse an ffmpeg rational such as `30000/1001`.
fn parse_ratio(s: &str) -> Option<f64> {
    let (num, den) = s.split_once('/')?;
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;
    if den == 0.0 {
        None
    } else {
        Some(num / den)
    }
}

/// Parse `ffprobe -print_format json` output into [`VideoInfo`].
pub fn parse_probe(path: &Path, json: &[u8]) -> Result<VideoInfo> {
    let parsed: ProbeOut = serde_json::from_slice(json)?;
    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| Error::Source(format!("no video stream in '{}'", path.display())))?;

    let width = stream.width.unwrap_or(0);
    let height = stream.height.unwrap_or(0);
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions {
            rows: height,
            cols: width,
        });
    }

    Ok(VideoInfo {
        path: path.to_path_buf(),
        width,
        height,
        fps: stream
            .r_frame_rate
            .as_deref()
            .and_then(parse_ratio)
            .unwrap_or(0.0),
        frame_count: stream.nb_frames.as_deref().and_then(|n| n.parse().ok()),
    })
}

/// Probe a video file with `ffprobe`.
pub fn probe(path: &Path) -> Result<VideoInfo> {
    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .map_err(|e| Error::Source(format!("failed to run ffprobe: {e}")))?;

    if !out.status.success() {
        return Err(Error::Source(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    parse_probe(path, &out.stdout)
}

/// A video file decoded frame by frame.
#[derive(Debug)]
pub struct VideoSource {
    info: VideoInfo,
    child: Child,
    stdout: BufReader<ChildStdout>,
    decoded: usize,
    finished: bool,
}

impl VideoSource {
    /// Probe `path` and start decoding it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let info = probe(path)?;

        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-nostdin", "-i"])
            .arg(path)
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Source(format!("failed to run ffmpeg: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Source("ffmpeg stdout not captured".to_string()))?;

        info!(
            "Decoding '{}': {}x{} @ {:.2} fps",
            path.display(),
            info.width,
            info.height,
            info.fps
        );

        Ok(Self {
            info,
            child,
            stdout: BufReader::new(stdout),
            decoded: 0,
            finished: false,
        })
    }

    fn finish(&mut self) {
        self.finished = true;
        match self.child.wait() {
            Ok(status) if !status.success() => {
                warn!(
                    "ffmpeg exited with {} after {} frames of '{}'",
                    status,
                    self.decoded,
                    self.info.path.display()
                );
            }
            Ok(_) => debug!("ffmpeg finished after {} frames", self.decoded),
            Err(e) => warn!("Failed to reap ffmpeg: {}", e),
        }
    }
}

/// Read exactly `buf.len()` bytes, distinguishing a clean end of stream
/// (nothing read) from a truncated frame.
fn read_frame(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => {
                return Err(std::io::Error::new(
                    ErrorKind::UnexpectedEof,
                    format!("truncated frame: {filled} of {} bytes", buf.len()),
                ))
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}

impl FrameSource for VideoSource {
    fn next_frame(&mut self) -> Option<Result<Frame>> {
        if self.finished {
            return None;
        }

        let mut buf = vec![0u8; self.info.frame_len()];
        match read_frame(&mut self.stdout, &mut buf) {
            Ok(true) => {
                self.decoded += 1;
                let frame = Frame::from_raw(self.info.width, self.info.height, buf)
                    .ok_or_else(|| Error::Decode("frame buffer size mismatch".to_string()));
                Some(frame)
            }
            Ok(false) => {
                self.finish();
                None
            }
            Err(e) => {
                self.finish();
                Some(Err(Error::Decode(format!(
                    "'{}' frame {}: {e}",
                    self.info.path.display(),
                    self.decoded
                ))))
            }
        }
    }

    fn describe(&self) -> String {
        format!("video '{}'", self.info.path.display())
    }

    fn len_hint(&self) -> Option<usize> {
        self.info.frame_count
    }
}

impl Drop for VideoSource {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ratio() {
        assert_eq!(parse_ratio("30/1"), Some(30.0));
        assert!((parse_ratio("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert_eq!(parse_ratio("0/0"), None);
        assert_eq!(parse_ratio("garbage"), None);
    }

    #[test]
    fn test_parse_probe() {
        let json = br#"{
            "streams": [
                {"codec_type": "audio"},
                {"codec_type": "video", "width": 640, "height": 360,
                 "r_frame_rate": "24/1", "nb_frames": "120"}
            ]
        }"#;
        let info = parse_probe(Path::new("clip.mp4"), json).unwrap();
        assert_eq!(info.width, 640);
        assert_eq!(info.height, 360);
        assert_eq!(info.fps, 24.0);
        assert_eq!(info.frame_count, Some(120));
        assert_eq!(info.frame_len(), 640 * 360 * 3);
    }

    #[test]
    fn test_parse_probe_without_video() {
        let json = br#"{"streams": [{"codec_type": "audio"}]}"#;
        let result = parse_probe(Path::new("song.mp3"), json);
        assert!(matches!(result, Err(Error::Source(_))));
    }

    #[test]
    fn test_parse_probe_zero_size() {
        let json = br#"{"streams": [{"codec_type": "video", "width": 0, "height": 0}]}"#;
        let result = parse_probe(Path::new("bad.mp4"), json);
        assert!(matches!(result, Err(Error::InvalidDimensions { .. })));
    }

    #[test]
    fn test_read_frame_clean_eof() {
        let mut reader: &[u8] = &[];
        let mut buf = [0u8; 6];
        assert!(!read_frame(&mut reader, &mut buf).unwrap());
    }

    #[test]
    fn test_read_frame_full_and_truncated() {
        let data = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let mut reader: &[u8] = &data;
        let mut buf = [0u8; 6];
        assert!(read_frame(&mut reader, &mut buf).unwrap());
        assert_eq!(buf, [1, 2, 3, 4, 5, 6]);

        let err = read_frame(&mut reader, &mut buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
    }
}
