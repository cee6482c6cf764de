//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against a throwaway home
//! directory and verify outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command with `home` as the user's home directory.
fn run_cli(home: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new("cargo")
        .args(["run", "-q", "-p", "moodelix-cli", "--"])
        .args(args)
        .env("HOME", home)
        .env("MOODELIX_ENV", "dev")
        .env_remove("SUPABASE_URL")
        .env_remove("NEXT_PUBLIC_SUPABASE_URL")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn parse_json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_media_parse_youtube() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(
        home.path(),
        &["media", "parse", "https://youtu.be/dQw4w9WgXcQ"],
    );
    assert_eq!(code, 0, "media parse failed");
    let json = parse_json(&stdout);
    assert_eq!(json["source"]["platform"], "youtube");
    assert_eq!(json["source"]["id"], "dQw4w9WgXcQ");
    assert!(json["embed_url"]
        .as_str()
        .unwrap()
        .starts_with("https://www.youtube.com/embed/dQw4w9WgXcQ?"));
}

#[test]
fn test_media_parse_rejects_unknown_link() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["media", "parse", "https://example.com/x"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_media_play_sends_pause_then_play() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(
        home.path(),
        &["media", "play", "https://open.spotify.com/playlist/2Al9G2jrWkwDlRFMZaw1GX"],
    );
    assert_eq!(code, 0);
    let json = parse_json(&stdout);
    let sent = json["sent"].as_array().unwrap();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].as_str().unwrap().contains("\"pause\""));
    assert!(sent[1].as_str().unwrap().contains("\"resume\""));
}

#[test]
fn test_focus_plan_long_session() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["focus", "plan", "--minutes", "130"]);
    assert_eq!(code, 0, "focus plan failed");
    let json = parse_json(&stdout);
    assert_eq!(json["type"], "FocusSessionStarted");
    assert_eq!(json["first_segment_secs"], 32 * 60);
    assert_eq!(json["breaks"].as_array().unwrap().len(), 3);
}

#[test]
fn test_focus_plan_rejects_short_focus() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(home.path(), &["focus", "plan", "--minutes", "10"]);
    assert_ne!(code, 0);
}

#[test]
fn test_config_set_and_get() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["config", "get", "schedule.focus"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "25");

    let (code, _, _) = run_cli(home.path(), &["config", "set", "schedule.focus", "50"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(home.path(), &["config", "get", "schedule.focus"]);
    assert_eq!(stdout.trim(), "50");

    let (code, _, stderr) = run_cli(home.path(), &["config", "set", "schedule.focus", "5"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("schedule.focus"));
    let (_, stdout, _) = run_cli(home.path(), &["config", "get", "schedule.focus"]);
    assert_eq!(stdout.trim(), "50");

    let (code, _, _) = run_cli(home.path(), &["config", "get", "schedule.nope"]);
    assert_ne!(code, 0);
}

#[test]
fn test_todo_add_toggle_list() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["todo", "add", "Read chapter 3"]);
    assert_eq!(code, 0, "todo add failed");
    let created = parse_json(&stdout);
    let id = created["id"].as_str().unwrap().to_string();

    let (code, stdout, _) = run_cli(home.path(), &["todo", "toggle", &id]);
    assert_eq!(code, 0);
    assert_eq!(parse_json(&stdout)["completed"], true);

    let (code, stdout, _) = run_cli(home.path(), &["todo", "list", "--json"]);
    assert_eq!(code, 0);
    let list = parse_json(&stdout);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (code, _, _) = run_cli(home.path(), &["todo", "rm", &id]);
    assert_eq!(code, 0);
    let (code, _, _) = run_cli(home.path(), &["todo", "rm", &id]);
    assert_ne!(code, 0);
}

#[test]
fn test_supabase_backend_without_url_reports_missing_key() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(home.path(), &["config", "set", "storage.backend", "supabase"]);
    assert_eq!(code, 0);
    let (code, _, stderr) = run_cli(home.path(), &["todo", "list"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("storage.supabase_url"));
}

#[test]
fn test_todo_rename_rejects_blank_title() {
    let home = tempfile::tempdir().unwrap();
    let (_, stdout, _) = run_cli(home.path(), &["todo", "add", "Outline"]);
    let id = parse_json(&stdout)["id"].as_str().unwrap().to_string();
    let (code, _, stderr) = run_cli(home.path(), &["todo", "rename", &id, "  "]);
    assert_ne!(code, 0);
    assert!(stderr.contains("title must not be empty"));
}

#[test]
fn test_wallpaper_list_and_resolve() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["wallpaper", "list", "--category", "live"]);
    assert_eq!(code, 0);
    assert_eq!(parse_json(&stdout).as_array().unwrap().len(), 15);

    let (code, stdout, _) = run_cli(
        home.path(),
        &["wallpaper", "resolve", "live-wallpapers/cyberpunk.mp4"],
    );
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "/wallpaper/live wallpapers/cyberpunk.mp4");
}

#[test]
fn test_sounds_scan_assigns_roles() {
    let home = tempfile::tempdir().unwrap();
    let sounds = home.path().join("sounds");
    std::fs::create_dir(&sounds).unwrap();
    for name in ["click.mp3", "click 2.mp3", "exit.wav", "notes.txt"] {
        std::fs::write(sounds.join(name), b"").unwrap();
    }

    let (code, stdout, _) = run_cli(
        home.path(),
        &["sounds", "scan", "--dir", sounds.to_str().unwrap()],
    );
    assert_eq!(code, 0);
    let json = parse_json(&stdout);
    assert_eq!(json["count"], 3);
    assert_eq!(json["roles"]["click2"], "/sounds/click 2.mp3");
    assert!(json["roles"]["toggle"].is_null());
}
