//! Configuration loading tests

use ladderd::config::{load_config, load_config_or_default};
use ladderd::ladder::Ladder;
use ladderd_common::Resolution;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn test_load_example_config() {
    let (dir, path) = write_config(
        r#"
[server]
host = "127.0.0.1"
port = 9090

[dispatch]
concurrent = 3
encode_timeout_secs = 3600

[callback]
url = "http://cms.internal/encode-callback"
timeout_secs = 5

[policy]
min_resolution = "640x360"
min_aspect_ratio = 1.0
max_aspect_ratio = 2.5

[ladder.default_mode]
args = ["-c:v", "libx264", "-crf", "23", "-c:a", "aac"]

[[ladder.modes]]
resolution = "1920x1080"
args = ["-c:v", "libx264", "-crf", "22", "-c:a", "aac"]

[[ladder.modes]]
resolution = "1280x720"
args = ["-c:v", "libx264", "-crf", "23", "-c:a", "aac"]
file_ext = ".mp4"

[tools]
ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
"#,
    );

    let config = load_config(&path).unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.dispatch.concurrent, 3);
    assert_eq!(config.dispatch.encode_timeout_secs, Some(3600));
    assert_eq!(
        config.callback.url.as_deref(),
        Some("http://cms.internal/encode-callback")
    );
    assert_eq!(config.callback.timeout_secs, 5);
    assert_eq!(config.policy.min_resolution, Resolution::new(640, 360));
    assert_eq!(
        config.tools.ffmpeg_path,
        Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg"))
    );
    assert!(config.tools.ffprobe_path.is_none());

    let ladder = Ladder::from_config(&config.ladder).unwrap();
    assert_eq!(ladder.rungs().len(), 2);
    assert_eq!(ladder.rungs()[0].label, "1920x1080");
    assert_eq!(ladder.default_mode().extension, ".mp4");

    drop(dir);
}

#[test]
fn test_invalid_rung_names_the_input() {
    let (_dir, path) = write_config(
        r#"
[[ladder.modes]]
resolution = "1920x1080p"
"#,
    );

    let err = load_config(&path).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("1920x1080p"), "{message}");
}

#[test]
fn test_invalid_toml() {
    let (_dir, path) = write_config("[server\nport = 1");
    let err = load_config(&path).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to parse config"));
}

#[test]
fn test_explicit_path_is_required_to_exist() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(load_config_or_default(Some(&missing)).is_err());
}
