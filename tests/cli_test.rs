//! Command line tests against the built binary
//!
//! Covers argument errors, profile bootstrap, and a full server/client run
//! driven through the interactive prompts.

use std::fs;
use std::path::Path;
use std::process::Stdio;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;

use filesync::keys::generate_key;

/// Result type for test operations
type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

const BINARY: &str = env!("CARGO_BIN_EXE_filesync");

/// Exit codes are negative; the OS reports them as an unsigned byte
fn signed(code: Option<i32>) -> Option<i32> {
	code.map(|c| i32::from(c as u8 as i8))
}

async fn run(args: &[&str], config: &Path) -> TestResult<Option<i32>> {
	let status = Command::new(BINARY)
		.args(args)
		.arg("--config")
		.arg(config)
		.stdin(Stdio::null())
		.stdout(Stdio::null())
		.stderr(Stdio::null())
		.status()
		.await?;
	Ok(signed(status.code()))
}

#[tokio::test]
async fn test_missing_arguments() -> TestResult<()> {
	let dir = TempDir::new()?;
	let config = dir.path().join("filesync.json");
	assert_eq!(run(&["client"], &config).await?, Some(-1));
	Ok(())
}

#[tokio::test]
async fn test_invalid_mode() -> TestResult<()> {
	let dir = TempDir::new()?;
	let config = dir.path().join("filesync.json");
	assert_eq!(run(&["relay", "home"], &config).await?, Some(-2));
	Ok(())
}

#[tokio::test]
async fn test_unknown_profile_writes_template() -> TestResult<()> {
	let dir = TempDir::new()?;
	let config = dir.path().join("filesync.json");

	assert_eq!(run(&["server", "nas"], &config).await?, Some(-3));

	let text = fs::read_to_string(&config)?;
	assert!(text.contains("\"example\""));
	assert!(text.contains("\"nas\""));

	// The template's placeholder directory does not validate
	assert_eq!(run(&["server", "nas"], &config).await?, Some(-4));
	Ok(())
}

#[tokio::test]
async fn test_server_and_client_processes() -> TestResult<()> {
	let work = TempDir::new()?;
	let server_dir = work.path().join("server");
	let client_dir = work.path().join("client");
	fs::create_dir_all(server_dir.join("photos"))?;
	fs::create_dir_all(&client_dir)?;
	fs::write(server_dir.join("photos/cat.jpg"), b"meow")?;
	fs::write(client_dir.join("stale.txt"), b"remove me")?;

	let port = {
		let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
		listener.local_addr()?.port()
	};
	let key = generate_key();
	let config = work.path().join("filesync.json");
	let profiles = serde_json::json!([
		{
			"id": "srv",
			"serverHost": "127.0.0.1",
			"serverPort": port,
			"syncDir": server_dir,
			"ignoreList": [],
			"secretKey": key,
		},
		{
			"id": "cli",
			"serverHost": "127.0.0.1",
			"serverPort": port,
			"syncDir": client_dir,
			"ignoreList": [],
			"secretKey": key,
		}
	]);
	fs::write(&config, serde_json::to_string_pretty(&profiles)?)?;

	let mut server = Command::new(BINARY)
		.args(["server", "srv", "--config"])
		.arg(&config)
		.env("RUST_LOG", "info")
		.stdin(Stdio::null())
		.stdout(Stdio::null())
		.stderr(Stdio::piped())
		.spawn()?;

	// Wait until the server is listening
	let stderr = server.stderr.take().ok_or("Failed to get server stderr")?;
	let mut lines = BufReader::new(stderr).lines();
	loop {
		let line = lines.next_line().await?.ok_or("server exited before listening")?;
		if line.contains("Waiting for a client") {
			break;
		}
	}
	tokio::spawn(async move { while let Ok(Some(_)) = lines.next_line().await {} });

	let mut client = Command::new(BINARY)
		.args(["client", "cli", "--config"])
		.arg(&config)
		.stdin(Stdio::piped())
		.stdout(Stdio::null())
		.stderr(Stdio::null())
		.spawn()?;
	let mut stdin = client.stdin.take().ok_or("Failed to get client stdin")?;
	stdin.write_all(b"1\nyes\n").await?;
	drop(stdin);

	let client_status = client.wait().await?;
	let server_status = server.wait().await?;
	assert!(client_status.success());
	assert!(server_status.success());

	assert_eq!(fs::read(client_dir.join("photos/cat.jpg"))?, b"meow");
	assert!(!client_dir.join("stale.txt").exists());
	Ok(())
}

// vim: ts=4
