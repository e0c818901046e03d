// tests/concurrent_drain.rs
mod common;
use crate::common::{init_tracing, prog, verbose_context};

use cmdpipe::Invocation;
use cmdpipe_test_utils::with_timeout;

fn sh(label: &str, script: &str) -> Invocation {
    Invocation::new(label, [prog("sh"), "-c".to_string(), script.to_string()])
}

#[tokio::test]
async fn small_writes_to_error_then_output_are_both_captured() {
    init_tracing();
    let mut ctx = verbose_context();

    let output = with_timeout(ctx.execute(&sh("err-then-out", "echo problem >&2; echo result")))
        .await
        .unwrap();

    assert_eq!(output.stdout.as_deref(), Some("result"));
    assert_eq!(output.stderr.as_deref(), Some("problem"));
}

#[tokio::test]
async fn payloads_larger_than_a_pipe_buffer_do_not_deadlock() {
    init_tracing();
    let mut ctx = verbose_context();

    // 256 KiB on stderr first, then 256 KiB on stdout: the child blocks on
    // stderr unless the parent drains it while waiting for stdout.
    let script = "head -c 262144 /dev/zero | tr '\\000' e >&2; head -c 262144 /dev/zero | tr '\\000' o";
    let output = with_timeout(ctx.execute(&sh("big-streams", script)))
        .await
        .unwrap();

    let stdout = output.stdout.unwrap();
    let stderr = output.stderr.unwrap();
    assert_eq!(stdout.len(), 262144);
    assert_eq!(stderr.len(), 262144);
    assert!(stdout.bytes().all(|b| b == b'o'));
    assert!(stderr.bytes().all(|b| b == b'e'));
}

#[tokio::test]
async fn interleaved_lines_are_not_truncated() {
    init_tracing();
    let mut ctx = verbose_context();

    let script = "i=0; while [ $i -lt 5000 ]; do echo out$i; echo err$i >&2; i=$((i+1)); done";
    let output = with_timeout(ctx.execute(&sh("interleaved", script)))
        .await
        .unwrap();

    let out_lines: Vec<&str> = output.stdout.as_deref().unwrap().lines().collect();
    let err_lines: Vec<&str> = output.stderr.as_deref().unwrap().lines().collect();
    assert_eq!(out_lines.len(), 5000);
    assert_eq!(err_lines.len(), 5000);
    assert_eq!(out_lines[0], "out0");
    assert_eq!(out_lines[4999], "out4999");
    assert_eq!(err_lines[4999], "err4999");
}

#[tokio::test]
async fn large_input_with_small_output_round_trips() {
    init_tracing();
    let mut ctx = verbose_context();

    // Input is bigger than a pipe buffer but the child consumes it before
    // writing much: `wc -l` only prints a count at the end.
    let lines: Vec<String> = (0..20_000).map(|i| format!("row {i}")).collect();
    let inv = Invocation::new("count", [prog("wc"), "-l".to_string()]).with_input(lines);

    let output = with_timeout(ctx.execute(&inv)).await.unwrap();
    assert_eq!(output.stdout.as_deref().map(str::trim), Some("20000"));
}
