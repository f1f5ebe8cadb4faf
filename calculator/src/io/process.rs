//! Helpers for running child processes with timeouts and bounded output.

use std::io::{Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

/// Captured child process output.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub stdout_truncated: usize,
    pub stderr_truncated: usize,
    pub timed_out: bool,
}

impl CommandOutput {
    /// Stderr as trimmed text, with a notice when bytes were dropped.
    pub fn stderr_text(&self) -> String {
        let mut text = String::from_utf8_lossy(&self.stderr).trim().to_string();
        if self.stderr_truncated > 0 {
            text.push_str(&format!(" [stderr truncated {} bytes]", self.stderr_truncated));
        }
        text
    }
}

/// Run a command with a timeout and capture stdout/stderr without risking pipe deadlocks.
///
/// Stdin is fed and output is read concurrently while the child runs, so a child that never
/// reads its input cannot stall the caller past the deadline. On timeout the child is killed
/// and reaped, and every helper thread is joined before returning, also when waiting on or
/// killing the child fails. `output_limit_bytes` bounds the amount of stdout/stderr stored in
/// memory (bytes beyond this are discarded while still draining the pipe).
#[instrument(skip_all, fields(timeout_ms = timeout.as_millis(), output_limit_bytes))]
pub fn run_command_with_timeout(
    mut cmd: Command,
    stdin: Option<&[u8]>,
    timeout: Duration,
    output_limit_bytes: usize,
) -> Result<CommandOutput> {
    if stdin.is_some() {
        cmd.stdin(Stdio::piped());
    } else {
        cmd.stdin(Stdio::null());
    }
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

    debug!("spawning child process");
    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            error!(err = %e, "failed to spawn command");
            return Err(e).context("spawn command");
        }
    };

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;

    let stdout_handle = thread::spawn(move || read_stream_limited(stdout, output_limit_bytes));
    let stderr_handle = thread::spawn(move || read_stream_limited(stderr, output_limit_bytes));

    let stdin_handle = match stdin {
        Some(input) => {
            let mut child_stdin = child
                .stdin
                .take()
                .ok_or_else(|| anyhow!("stdin was not piped"))?;
            let input = input.to_vec();
            // Dropping the handle at the end of the thread closes the pipe.
            Some(thread::spawn(move || child_stdin.write_all(&input)))
        }
        None => None,
    };

    let mut timed_out = false;
    let waited = match child.wait_timeout(timeout).context("wait for command") {
        Ok(Some(status)) => Ok(status),
        Ok(None) => {
            warn!(timeout_ms = timeout.as_millis(), "command timed out, killing");
            timed_out = true;
            child
                .kill()
                .context("kill command")
                .and_then(|()| child.wait().context("wait command after kill"))
        }
        Err(e) => Err(e),
    };
    let status = match waited {
        Ok(status) => status,
        Err(e) => {
            error!(err = %e, "waiting on command failed, abandoning it");
            abandon(&mut child, stdin_handle, stdout_handle, stderr_handle);
            return Err(e);
        }
    };

    join_input(stdin_handle)?;
    let (stdout, stdout_truncated) = join_output(stdout_handle).context("join stdout")?;
    let (stderr, stderr_truncated) = join_output(stderr_handle).context("join stderr")?;

    if stdout_truncated > 0 || stderr_truncated > 0 {
        warn!(stdout_truncated, stderr_truncated, "output truncated");
    }

    debug!(exit_code = ?status.code(), timed_out, "command finished");
    Ok(CommandOutput {
        status,
        stdout,
        stderr,
        stdout_truncated,
        stderr_truncated,
        timed_out,
    })
}

type OutputHandle = thread::JoinHandle<Result<(Vec<u8>, usize)>>;

/// Best-effort kill and reap, then join the helper threads. The pipes only
/// close once the child is gone, so the joins cannot start earlier.
fn abandon(
    child: &mut Child,
    stdin_handle: Option<thread::JoinHandle<std::io::Result<()>>>,
    stdout_handle: OutputHandle,
    stderr_handle: OutputHandle,
) {
    if let Err(e) = child.kill() {
        debug!(err = %e, "kill failed");
    }
    if let Err(e) = child.wait() {
        debug!(err = %e, "reap failed");
    }
    let _ = join_input(stdin_handle);
    let _ = join_output(stdout_handle);
    let _ = join_output(stderr_handle);
}

fn join_input(handle: Option<thread::JoinHandle<std::io::Result<()>>>) -> Result<()> {
    let Some(handle) = handle else {
        return Ok(());
    };
    match handle.join() {
        Ok(Ok(())) => Ok(()),
        // A child that exits or is killed before reading all input closes the pipe.
        Ok(Err(e)) => {
            debug!(err = %e, "stdin not fully written");
            Ok(())
        }
        Err(_) => Err(anyhow!("stdin writer thread panicked")),
    }
}

fn join_output(handle: OutputHandle) -> Result<(Vec<u8>, usize)> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("output reader thread panicked")),
    }
}

fn read_stream_limited<R: Read>(mut reader: R, limit: usize) -> Result<(Vec<u8>, usize)> {
    let mut buf = Vec::new();
    let mut truncated = 0usize;
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader.read(&mut chunk).context("read output")?;
        if n == 0 {
            break;
        }
        let remaining = limit.saturating_sub(buf.len());
        if remaining > 0 {
            let keep = n.min(remaining);
            buf.extend_from_slice(&chunk[..keep]);
            truncated += n.saturating_sub(keep);
        } else {
            truncated += n;
        }
    }

    Ok((buf, truncated))
}
