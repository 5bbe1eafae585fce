//! FFmpeg invocation for the three operation kinds.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info};

use vedit_models::EncodingConfig;

use crate::error::{MediaError, MediaResult};

/// Handle to a resolved ffmpeg binary.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    binary: PathBuf,
    timeout: Duration,
}

impl Ffmpeg {
    /// Resolve ffmpeg from PATH.
    pub fn new(timeout: Duration) -> MediaResult<Self> {
        let binary = which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;
        debug!("Resolved ffmpeg binary: {}", binary.display());
        Ok(Self { binary, timeout })
    }

    /// Use an explicit binary path (tests, containers with fixed layout).
    pub fn with_binary(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// Generate a low-resolution proxy derivative of `input`.
    pub async fn generate_proxy(
        &self,
        input: &Path,
        output: &Path,
        encoding: &EncodingConfig,
    ) -> MediaResult<()> {
        require_input(input)?;
        info!("Generating proxy: {} -> {}", input.display(), output.display());
        self.run(proxy_args(input, output, encoding)).await
    }

    /// Extract the sub-range [start, end) from `input`, re-encoding with the
    /// fixed encoder settings.
    pub async fn cut(
        &self,
        input: &Path,
        output: &Path,
        start: f64,
        end: f64,
        encoding: &EncodingConfig,
    ) -> MediaResult<()> {
        require_input(input)?;
        info!(
            "Cutting [{start}, {end}) from {} -> {}",
            input.display(),
            output.display()
        );
        self.run(cut_args(input, output, start, end, encoding)).await
    }

    /// Concatenate `sources` in order by stream copy.
    ///
    /// All inputs must share compatible encodings; in the timeline pipeline
    /// this holds because every intermediate was cut with identical settings.
    pub async fn concat(&self, sources: &[PathBuf], output: &Path) -> MediaResult<()> {
        for source in sources {
            require_input(source)?;
        }

        let mut list_file = tempfile::Builder::new()
            .prefix("vedit-concat-")
            .suffix(".txt")
            .tempfile()?;
        list_file.write_all(concat_list(sources).as_bytes())?;
        list_file.flush()?;

        info!(
            "Concatenating {} inputs -> {}",
            sources.len(),
            output.display()
        );
        // The list file must outlive the ffmpeg process; it is removed when
        // `list_file` drops.
        self.run(concat_args(list_file.path(), output)).await
    }

    async fn run(&self, args: Vec<OsString>) -> MediaResult<()> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(&args).kill_on_drop(true);

        debug!("Running ffmpeg with args: {:?}", args);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| MediaError::Timeout(self.timeout.as_secs()))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(MediaError::ffmpeg_failed(
                format!("ffmpeg exited with {}", output.status),
                Some(stderr),
                output.status.code(),
            ));
        }

        Ok(())
    }
}

fn require_input(path: &Path) -> MediaResult<()> {
    if !path.is_file() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }
    Ok(())
}

fn encode_args(encoding: &EncodingConfig) -> Vec<OsString> {
    vec![
        "-c:v".into(),
        encoding.video_codec.clone().into(),
        "-preset".into(),
        encoding.preset.clone().into(),
        "-crf".into(),
        encoding.crf.to_string().into(),
        "-c:a".into(),
        encoding.audio_codec.clone().into(),
        "-b:a".into(),
        encoding.audio_bitrate.clone().into(),
    ]
}

fn proxy_args(input: &Path, output: &Path, encoding: &EncodingConfig) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-i".into(),
        input.into(),
        "-vf".into(),
        encoding.proxy_scale_filter().into(),
    ];
    args.extend(encode_args(encoding));
    args.extend(["-y".into(), output.into()]);
    args
}

fn cut_args(
    input: &Path,
    output: &Path,
    start: f64,
    end: f64,
    encoding: &EncodingConfig,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-i".into(),
        input.into(),
        "-ss".into(),
        start.to_string().into(),
        "-to".into(),
        end.to_string().into(),
    ];
    args.extend(encode_args(encoding));
    args.extend(["-y".into(), output.into()]);
    args
}

fn concat_args(list_file: &Path, output: &Path) -> Vec<OsString> {
    vec![
        "-f".into(),
        "concat".into(),
        "-safe".into(),
        "0".into(),
        "-i".into(),
        list_file.into(),
        "-c".into(),
        "copy".into(),
        "-y".into(),
        output.into(),
    ]
}

/// Render the ffconcat list file contents, one `file` directive per source.
fn concat_list(sources: &[PathBuf]) -> String {
    let mut list = String::new();
    for source in sources {
        let escaped = source.display().to_string().replace('\'', "'\\''");
        list.push_str(&format!("file '{}'\n", escaped));
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(s: &str) -> OsString {
        OsString::from(s)
    }

    #[test]
    fn test_proxy_args_scale_and_preset() {
        let args = proxy_args(
            Path::new("/in/a.mp4"),
            Path::new("/out/proxy_a.mp4"),
            &EncodingConfig::default(),
        );
        let expect = [
            "-i", "/in/a.mp4", "-vf", "scale=-2:360", "-c:v", "libx264", "-preset", "veryfast",
            "-crf", "28", "-c:a", "aac", "-b:a", "128k", "-y", "/out/proxy_a.mp4",
        ];
        assert_eq!(args, expect.iter().map(|s| os(s)).collect::<Vec<_>>());
    }

    #[test]
    fn test_cut_args_range_and_reencode() {
        let args = cut_args(
            Path::new("/in/a.mp4"),
            Path::new("/out/cut.mp4"),
            1.5,
            7.0,
            &EncodingConfig::default(),
        );
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        assert_eq!(args[ss + 1], os("1.5"));
        let to = args.iter().position(|a| a == "-to").unwrap();
        assert_eq!(args[to + 1], os("7"));
        // Cuts re-encode rather than stream-copy
        assert!(args.contains(&os("-c:v")));
        assert!(!args.windows(2).any(|w| w[0] == "-c" && w[1] == "copy"));
    }

    #[test]
    fn test_concat_args_stream_copy() {
        let args = concat_args(Path::new("/tmp/list.txt"), Path::new("/out/final.mp4"));
        assert!(args.windows(2).any(|w| w[0] == "-f" && w[1] == "concat"));
        assert!(args.windows(2).any(|w| w[0] == "-c" && w[1] == "copy"));
        assert!(!args.contains(&os("-crf")));
    }

    #[test]
    fn test_concat_list_preserves_order() {
        let list = concat_list(&[PathBuf::from("/work/cut_1_a.mp4"), PathBuf::from("/work/cut_2_a.mp4")]);
        assert_eq!(list, "file '/work/cut_1_a.mp4'\nfile '/work/cut_2_a.mp4'\n");
    }

    #[test]
    fn test_concat_list_escapes_quotes() {
        let list = concat_list(&[PathBuf::from("/work/it's.mp4")]);
        assert_eq!(list, "file '/work/it'\\''s.mp4'\n");
    }

    #[tokio::test]
    async fn test_missing_input_is_distinct_error() {
        let ffmpeg = Ffmpeg::with_binary("/usr/bin/ffmpeg", Duration::from_secs(10));
        let err = ffmpeg
            .cut(
                Path::new("/nonexistent/input.mp4"),
                Path::new("/tmp/out.mp4"),
                0.0,
                5.0,
                &EncodingConfig::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }
}
