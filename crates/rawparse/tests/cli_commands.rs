#![cfg(feature = "cli")]

use std::path::PathBuf;
use std::process::{Command, Output};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "rawparse-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn write_input(dir: &PathBuf, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).expect("input should be writable");
    path
}

fn rawparse(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rawparse"))
        .args(["--log-level", "error"])
        .args(args)
        .env_remove("RAWPARSE_CHUNK_SIZE")
        .env_remove("RAWPARSE_LOG_LEVEL")
        .output()
        .expect("rawparse should run")
}

fn count_events(stdout: &str, event: &str) -> usize {
    let needle = format!("\"event\":\"{event}\"");
    stdout.lines().filter(|line| line.contains(&needle)).count()
}

#[test]
fn audio_prints_batches_and_drops_trailing_bytes() {
    let dir = unique_temp_dir("audio");
    let input = write_input(&dir, "stereo.raw", &[0u8; 1002]);

    let output = rawparse(&[
        "--format",
        "json",
        "audio",
        input.to_str().expect("utf-8 path"),
        "--rate",
        "8000",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(count_events(&stdout, "caps"), 1);
    assert!(stdout.contains("format=(string)S16LE"));
    assert!(stdout.contains("\"frames\":250"));
    assert!(stdout.contains("\"dropped_bytes\":2"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn audio_raw_output_is_reordered() {
    let dir = unique_temp_dir("reorder");
    let input = write_input(&dir, "swapped.raw", &[1, 2, 3, 4]);

    let output = rawparse(&[
        "--format",
        "raw",
        "audio",
        input.to_str().expect("utf-8 path"),
        "--pcm-format",
        "S8",
        "--channels",
        "2",
        "--channel-positions",
        "FR,FL",
    ]);

    assert!(output.status.success());
    assert_eq!(output.stdout, vec![2, 1, 4, 3]);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn audio_follows_caps_flag() {
    let dir = unique_temp_dir("caps-flag");
    let input = write_input(&dir, "mono.raw", &[0u8; 30]);

    let output = rawparse(&[
        "--format",
        "json",
        "audio",
        input.to_str().expect("utf-8 path"),
        "--caps",
        "audio/x-raw, format=S24LE, rate=16000, channels=1, layout=interleaved",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"frames\":10"));
    assert!(stdout.contains("\"dropped_bytes\":0"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn video_emits_one_batch_per_frame() {
    let dir = unique_temp_dir("video");
    let input = write_input(&dir, "gray.raw", &[7u8; 24]);
    let path = input.to_str().expect("utf-8 path");
    let args = [
        "--format",
        "json",
        "video",
        path,
        "--pixel-format",
        "GRAY8",
        "--width",
        "4",
        "--height",
        "2",
    ];

    let output = rawparse(&args);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(count_events(&stdout, "frames"), 3);
    assert!(stdout.contains("\"pts_ns\":80000000"));

    let mut limited = args.to_vec();
    limited.extend(["--count", "2"]);
    let output = rawparse(&limited);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(count_events(&stdout, "frames"), 2);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn chunk_size_env_splits_reads() {
    let dir = unique_temp_dir("chunk");
    let input = write_input(&dir, "stereo.raw", &[0u8; 8]);

    let output = Command::new(env!("CARGO_BIN_EXE_rawparse"))
        .args(["--log-level", "error", "--format", "json", "audio"])
        .arg(&input)
        .env("RAWPARSE_CHUNK_SIZE", "1")
        .output()
        .expect("rawparse should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(count_events(&stdout, "frames"), 2);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn caps_validates_descriptors() {
    let output = rawparse(&[
        "--format",
        "json",
        "caps",
        "video/x-unaligned-raw, format=I420, width=320, height=240, framerate=25/1",
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"kind\":\"video\""));
    assert!(stdout.contains("\"output\":\"video/x-raw"));

    let output = rawparse(&["caps", "audio/x-raw, format=S16LE, channels=2"]);
    assert_eq!(output.status.code(), Some(60));

    let output = rawparse(&["caps", "audio/x-raw, rate=(int)abc"]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn bad_property_is_usage_error() {
    let dir = unique_temp_dir("usage");
    let input = write_input(&dir, "empty.raw", &[]);

    let output = rawparse(&["audio", input.to_str().expect("utf-8 path"), "--rate", "0"]);
    assert_eq!(output.status.code(), Some(64));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn blank_channel_positions_are_usage_errors() {
    let dir = unique_temp_dir("positions");
    let input = write_input(&dir, "empty.raw", &[]);
    let path = input.to_str().expect("utf-8 path");

    for list in [",", "FL,,FR"] {
        let output = rawparse(&["audio", path, "--channels", "2", "--channel-positions", list]);
        assert_eq!(output.status.code(), Some(64), "list {list:?}");
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("--channel-positions"), "list {list:?}");
    }

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_input_fails() {
    let dir = unique_temp_dir("missing");
    let output = rawparse(&[
        "video",
        dir.join("absent.raw").to_str().expect("utf-8 path"),
    ]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot open"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn envinfo_reports_version() {
    let output = rawparse(&["--format", "json", "envinfo"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("\"version\":\"{}\"", env!("CARGO_PKG_VERSION"))));
    assert!(stdout.contains("RAWPARSE_CHUNK_SIZE"));
}

#[test]
fn version_prints_name() {
    let output = rawparse(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("rawparse "));
}
