// tests/engine_scenarios.rs
mod common;
use crate::common::{init_tracing, prog, verbose_context};

use cmdpipe_test_utils::with_timeout;

use cmdpipe::{CmdpipeError, ExecContext, ExitOutcome, Invocation, LoggedOutcome, ProgramLocator};

#[tokio::test]
async fn echo_output_is_captured_without_trailing_newline() {
    init_tracing();
    let mut ctx = verbose_context();

    let inv = Invocation::new("echo-test", [prog("echo"), "hello world".to_string()]);
    let output = ctx.execute(&inv).await.unwrap();

    assert_eq!(output.status, ExitOutcome::Exited(0));
    assert_eq!(output.stdout.as_deref(), Some("hello world"));
    // Nothing written to stderr is still a captured, present stream.
    assert_eq!(output.stderr.as_deref(), Some(""));

    let entry = ctx.journal().last().unwrap();
    assert_eq!(entry.label, "echo-test");
    assert_eq!(entry.exit_code(), Some(0));
    assert_eq!(entry.stdout.as_deref(), Some("hello world\n"));
    assert_eq!(entry.stderr.as_deref(), Some(""));
}

#[tokio::test]
async fn nonzero_exit_raises_abnormal_exit() {
    init_tracing();
    let mut ctx = verbose_context();

    let inv = Invocation::new("fail-test", [prog("sh"), "-c".to_string(), "exit 3".to_string()]);
    let err = ctx.execute(&inv).await.unwrap_err();

    match err {
        CmdpipeError::AbnormalExit {
            ref label, code, ..
        } => {
            assert_eq!(label, "fail-test");
            assert_eq!(code, 3);
        }
        ref other => panic!("expected AbnormalExit, got {:?}", other),
    }
    assert!(err.to_string().contains('3'));
    assert_eq!(ctx.journal().len(), 1);
    assert_eq!(ctx.journal().last().unwrap().exit_code(), Some(3));
}

#[tokio::test]
async fn abnormal_exit_keeps_stderr_text() {
    init_tracing();
    let mut ctx = ExecContext::default();

    let inv = Invocation::new(
        "mkfs",
        [
            prog("sh"),
            "-c".to_string(),
            "echo 'device busy' >&2; exit 1".to_string(),
        ],
    );
    match ctx.execute(&inv).await {
        Err(CmdpipeError::AbnormalExit { code, stderr, .. }) => {
            assert_eq!(code, 1);
            assert_eq!(stderr.as_deref(), Some("device busy"));
        }
        other => panic!("expected AbnormalExit, got {:?}", other),
    }
}

#[tokio::test]
async fn signal_termination_is_decoded() {
    init_tracing();
    let mut ctx = verbose_context();

    let inv = Invocation::new(
        "signal-test",
        [prog("sh"), "-c".to_string(), "kill -TERM $$".to_string()],
    );
    let err = ctx.execute(&inv).await.unwrap_err();

    match err {
        CmdpipeError::Signaled {
            signal,
            core_dumped,
            ..
        } => {
            assert_eq!(signal, 15);
            assert!(!core_dumped);
        }
        ref other => panic!("expected Signaled, got {:?}", other),
    }
    assert!(err.to_string().contains("15"));

    let entry = ctx.journal().last().unwrap();
    assert_eq!(entry.signal(), Some(15));
    assert!(!entry.core_dumped());
    assert_eq!(entry.exit_code(), None);
}

#[tokio::test]
async fn input_is_fed_to_the_child() {
    init_tracing();
    let mut ctx = verbose_context();

    let inv = Invocation::new("echo-input", [prog("cat")]).with_input(["Ad astra"]);
    let output = ctx.execute(&inv).await.unwrap();
    assert_eq!(output.stdout.as_deref(), Some("Ad astra"));

    let entry = ctx.journal().last().unwrap();
    assert_eq!(entry.input.as_deref(), Some(&["Ad astra".to_string()][..]));
}

#[tokio::test]
async fn child_sees_end_of_input_without_payload() {
    init_tracing();
    let mut ctx = ExecContext::default();

    // `cat` would block forever if stdin were left open.
    let inv = Invocation::new("cat-eof", [prog("cat")]);
    let output = with_timeout(ctx.execute(&inv)).await.unwrap();
    assert_eq!(output.stdout.as_deref(), Some(""));
}

#[tokio::test]
async fn spawn_failure_is_reported_and_logged() {
    init_tracing();
    let mut ctx = verbose_context();

    let inv = Invocation::new("missing", ["/nonexistent/cmdpipe-no-such-tool"]);
    let err = ctx.execute(&inv).await.unwrap_err();
    assert!(matches!(err, CmdpipeError::Spawn { ref label, .. } if label == "missing"));

    let entry = ctx.journal().last().unwrap();
    assert!(matches!(entry.outcome, LoggedOutcome::Failed(_)));
    assert!(entry.stdout.is_none());
    assert!(entry.stderr.is_none());
}

#[tokio::test]
async fn empty_argv_is_a_spawn_failure() {
    init_tracing();
    let mut ctx = verbose_context();

    let err = ctx
        .execute(&Invocation::new("empty", Vec::<String>::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, CmdpipeError::Spawn { .. }));
    assert_eq!(ctx.journal().len(), 1);
}

#[tokio::test]
async fn input_rejected_by_exiting_child_is_a_stream_write_failure() {
    init_tracing();
    let mut ctx = verbose_context();

    // Far more than a pipe buffer, to a child that never reads stdin.
    let lines: Vec<String> = (0..20_000).map(|i| format!("line {i:08}")).collect();
    let inv = Invocation::new("no-reader", [prog("sh"), "-c".to_string(), "exec 0<&-; exit 0".to_string()])
        .with_input(lines);

    match ctx.execute(&inv).await {
        Err(CmdpipeError::StreamWrite { outcome, .. }) => {
            assert_eq!(outcome, ExitOutcome::Exited(0));
        }
        other => panic!("expected StreamWrite, got {:?}", other),
    }
    // The child was still reaped, and its entry says why the run failed.
    let entry = ctx.journal().last().unwrap();
    assert_eq!(entry.exit_code(), Some(0));
    assert!(matches!(entry.outcome, LoggedOutcome::InputFailed { .. }));
    let dump = ctx.journal().dump();
    assert!(dump.contains("status: exit status 0"));
    assert!(dump.contains("input write failed:"), "dump was:\n{dump}");
}

#[tokio::test]
async fn quiet_context_keeps_no_log() {
    init_tracing();
    let mut ctx = ExecContext::new(ProgramLocator::new(), false);

    ctx.execute(&Invocation::new("quiet", [prog("true")])).await.unwrap();
    let _ = ctx
        .execute(&Invocation::new("quiet-fail", [prog("false")]))
        .await;

    assert!(ctx.journal().is_empty());
}

#[tokio::test]
async fn every_invocation_yields_one_log_entry() {
    init_tracing();
    let mut ctx = verbose_context();

    let invocations = vec![
        Invocation::new("ok", [prog("true")]),
        Invocation::new("bad", [prog("false")]),
        Invocation::new("gone", ["/nonexistent/tool"]),
        Invocation::new("sig", [prog("sh"), "-c".to_string(), "kill -KILL $$".to_string()]),
    ];
    for inv in &invocations {
        let _ = ctx.execute(inv).await;
    }

    let labels: Vec<&str> = ctx.journal().entries().iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["ok", "bad", "gone", "sig"]);
    assert_eq!(ctx.journal().entries()[3].signal(), Some(9));
}
