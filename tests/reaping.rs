//! Finished background children must not pile up as zombies.
#![cfg(target_os = "linux")]

use std::fs;
use std::io::{Read, Write};
use std::process::{ChildStdout, Command, Stdio};

const PROMPT: &str = "lambda-shell$ ";

fn wait_for_prompts(stdout: &mut ChildStdout, count: usize) {
    let mut seen = String::new();
    let mut buf = [0u8; 512];
    while seen.matches(PROMPT).count() < count {
        let n = stdout.read(&mut buf).expect("read shell output");
        assert!(n > 0, "shell exited early: {seen:?}");
        seen.push_str(&String::from_utf8_lossy(&buf[..n]));
    }
}

/// Pids of zombie processes whose parent is `parent`.
fn zombie_children(parent: u32) -> Vec<u32> {
    let mut zombies = Vec::new();
    for entry in fs::read_dir("/proc").unwrap().flatten() {
        let Ok(pid) = entry.file_name().to_string_lossy().parse::<u32>() else {
            continue;
        };
        let Ok(stat) = fs::read_to_string(entry.path().join("stat")) else {
            continue;
        };
        // The command name may contain spaces, so split after its closing paren.
        let Some((_, rest)) = stat.rsplit_once(')') else {
            continue;
        };
        let mut fields = rest.split_whitespace();
        let state = fields.next();
        let ppid = fields.next().and_then(|p| p.parse::<u32>().ok());
        if state == Some("Z") && ppid == Some(parent) {
            zombies.push(pid);
        }
    }
    zombies
}

#[test]
fn test_background_children_are_reaped() {
    let mut shell = Command::new(env!("CARGO_BIN_EXE_lssh"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("spawn lssh");
    let shell_pid = shell.id();
    let mut stdin = shell.stdin.take().unwrap();
    let mut stdout = shell.stdout.take().unwrap();

    let mut script = "true &\n".repeat(5);
    script.push_str("sleep 1\ntrue\n");
    stdin.write_all(script.as_bytes()).unwrap();
    stdin.flush().unwrap();

    // One prompt per processed line plus the one now waiting for input.
    wait_for_prompts(&mut stdout, 8);
    let zombies = zombie_children(shell_pid);

    drop(stdin);
    let status = shell.wait().unwrap();
    assert!(status.success());
    assert!(zombies.is_empty(), "unreaped children: {zombies:?}");
}
