use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use std::process::{Command, Output};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const BIN: &str = env!("CARGO_BIN_EXE_elevation-stress");

fn stress(args: &[&str]) -> Output {
    Command::new(BIN)
        .args(args)
        .env("RUST_LOG", "info")
        .env("NO_COLOR", "1")
        .output()
        .unwrap()
}

async fn stress_async(args: &[&str]) -> Output {
    tokio::process::Command::new(BIN)
        .args(args)
        .env("RUST_LOG", "info")
        .env("NO_COLOR", "1")
        .output()
        .await
        .unwrap()
}

/// Serves 200 for every request except the `fail_on`th, which gets a 500.
async fn serve(fail_on: Option<usize>) -> String {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new().route(
        "/v1/elevations",
        post(move || {
            let hits = hits.clone();
            async move {
                let n = hits.fetch_add(1, Ordering::SeqCst) + 1;
                if fail_on == Some(n) {
                    StatusCode::INTERNAL_SERVER_ERROR
                } else {
                    StatusCode::OK
                }
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{addr}")
}

fn aborted_count(stderr: &str) -> u64 {
    let rest = stderr
        .split("Aborted at ")
        .nth(1)
        .unwrap_or_else(|| panic!("no abort line in:\n{stderr}"));
    rest.chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap()
}

#[test]
fn zero_clients_exits_one() {
    let out = stress(&["-c", "0"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn unknown_flag_exits_one() {
    let out = stress(&["--bogus"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(!out.stderr.is_empty());
}

#[test]
fn help_exits_zero() {
    let out = stress(&["--help"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("--host"));
}

#[test]
fn refused_connection_exits_one_with_abort_line() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let host = format!("http://{addr}");

    let out = stress(&["-h", &host, "-c", "2", "-r", "3", "-l", "1", "--no-progress"]);
    assert_eq!(out.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert_eq!(aborted_count(&stderr), 0);
    assert_eq!(stderr.matches("Aborted at").count(), 1, "{stderr}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn full_run_exits_zero_with_summary() {
    let host = serve(None).await;

    let out = stress_async(&["-h", &host, "-c", "2", "-r", "3", "-l", "1", "--no-progress"]).await;
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert_eq!(out.status.code(), Some(0), "{stderr}");
    assert_eq!(
        stderr
            .matches("Finished 6 elevation queries by 6 requests.")
            .count(),
        1,
        "{stderr}"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn server_error_exits_one_before_target() {
    let host = serve(Some(4)).await;

    let out = stress_async(&["-h", &host, "-c", "2", "-r", "3", "-l", "1", "--no-progress"]).await;
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert_eq!(out.status.code(), Some(1), "{stderr}");
    assert!(aborted_count(&stderr) < 6, "{stderr}");
    assert!(stderr.contains("500 Internal Server Error"), "{stderr}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn json_flag_prints_summary_on_stdout() {
    let host = serve(None).await;

    let out = stress_async(&[
        "-h", &host, "-c", "1", "-r", "2", "-l", "3", "--no-progress", "--json",
    ])
    .await;
    assert_eq!(out.status.code(), Some(0));

    let summary: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(summary["locations"], 6);
    assert_eq!(summary["requests"], 2);
}
