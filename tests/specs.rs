// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end CLI scenarios (spec.md §8) driven against the real `taro` /
//! `tarod` binaries over a Unix socket in a scratch state directory.

use assert_cmd::Command;
use std::time::Duration;
use tempfile::TempDir;

fn taro(state_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("taro").expect("taro binary");
    cmd.env("TARO_STATE_DIR", state_dir.path());
    cmd.timeout(Duration::from_secs(10));
    cmd
}

fn shutdown(state_dir: &TempDir) {
    let _ = taro(state_dir).args(["daemon", "stop"]).output();
    std::thread::sleep(Duration::from_millis(200));
}

#[test]
fn echo_runs_to_completion_and_tail_contains_its_output() {
    let dir = TempDir::new().expect("tempdir");

    let assert = taro(&dir).args(["exec", "--job-id", "greeter", "echo", "hi"]).assert();
    let output = assert.get_output();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("completed"), "unexpected exec output: {stdout}");

    let instance_id = stdout.split(':').next().expect("instance id prefix").trim();

    let tail_output = taro(&dir).args(["tail", instance_id]).output().expect("tail");
    let tail_text = String::from_utf8_lossy(&tail_output.stdout);
    assert!(tail_text.contains("hi"), "tail did not contain echoed output: {tail_text}");

    shutdown(&dir);
}

#[test]
fn pending_instance_runs_after_its_latch_is_released() {
    let dir = TempDir::new().expect("tempdir");

    let exec_output =
        taro(&dir).args(["exec", "--job-id", "waiter", "--pending", "gate-1", "-b", "echo", "go"]).output().expect("exec");
    let stdout = String::from_utf8_lossy(&exec_output.stdout);
    assert!(stdout.contains("pending") || stdout.contains("completed"), "unexpected pending-exec output: {stdout}");

    let release = taro(&dir).args(["release", "gate-1"]).output().expect("release");
    let release_text = String::from_utf8_lossy(&release.stdout);
    assert!(release_text.contains("released"), "unexpected release output: {release_text}");

    shutdown(&dir);
}

#[test]
fn stopping_a_long_running_instance_reaches_stopped_with_exit_zero() {
    let dir = TempDir::new().expect("tempdir");

    let mut child = taro(&dir)
        .args(["exec", "--job-id", "sleeper", "sleep", "60"])
        .spawn()
        .expect("spawn exec");
    std::thread::sleep(Duration::from_millis(300));

    let ps_output = taro(&dir).args(["ps"]).output().expect("ps");
    let ps_text = String::from_utf8_lossy(&ps_output.stdout);
    let instance_id = ps_text.lines().next().and_then(|l| l.split('\t').next()).map(str::to_string);

    if let Some(instance_id) = instance_id {
        let stop = taro(&dir).args(["stop", &instance_id]).output().expect("stop");
        assert!(stop.status.success());
    }

    let status = child.wait().expect("wait on exec child");
    assert!(status.success(), "exec should exit 0 for a stopped instance");

    shutdown(&dir);
}

#[test]
fn disabling_a_job_keeps_new_instances_from_spawning() {
    let dir = TempDir::new().expect("tempdir");

    let disable = taro(&dir).args(["disable", "quarantined"]).output().expect("disable");
    assert!(disable.status.success());

    let exec_output = taro(&dir).args(["exec", "--job-id", "quarantined", "echo", "should-not-run"]).output().expect("exec");
    let stdout = String::from_utf8_lossy(&exec_output.stdout);
    assert!(stdout.contains("disabled"), "disabled job should report the disabled state: {stdout}");

    let history = taro(&dir).args(["history", "--job-id", "quarantined"]).output().expect("history");
    let history_text = String::from_utf8_lossy(&history.stdout);
    assert!(history_text.contains("disabled"), "history should record the disabled instance: {history_text}");

    shutdown(&dir);
}

#[test]
fn a_nonzero_exit_is_reported_as_failed() {
    let dir = TempDir::new().expect("tempdir");

    let assert = taro(&dir).args(["exec", "--job-id", "doomed", "false"]).assert();
    let output = assert.get_output();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed"), "unexpected failed-exec stderr: {stderr}");
    assert!(stderr.contains("exit code 1"), "failed-exec stderr should carry the error: {stderr}");

    shutdown(&dir);
}

#[test]
fn daemon_status_reports_not_running_before_anything_starts_it() {
    let dir = TempDir::new().expect("tempdir");
    let status = taro(&dir).args(["daemon", "status"]).output().expect("status");
    let text = String::from_utf8_lossy(&status.stdout);
    assert!(text.contains("not_running") || text.contains("not running"), "unexpected status output: {text}");
}
