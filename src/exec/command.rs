// src/exec/command.rs

use std::collections::VecDeque;
use std::process::Stdio;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, bail};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tracing::debug;

/// How many trailing stderr lines are attached to a failure.
const STDERR_TAIL_LINES: usize = 20;

/// Run a shell command to completion.
///
/// The child's stdout and stderr are forwarded line by line to our own
/// stdout and stderr as raw bytes; output need not be UTF-8. Resolves when the process exits with status 0; any
/// other exit fails with the status and the tail of stderr as context.
pub async fn exec(command: &str) -> Result<()> {
    debug!(cmd = %command, "spawning command");

    let mut child = shell(command)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("spawning `{command}`"))?;

    let stderr_tail = Arc::new(Mutex::new(VecDeque::with_capacity(STDERR_TAIL_LINES)));

    let stdout_pump = child
        .stdout
        .take()
        .map(|out| tokio::spawn(forward_lines(out, Stream::Stdout, None)));
    let stderr_pump = child.stderr.take().map(|err| {
        tokio::spawn(forward_lines(
            err,
            Stream::Stderr,
            Some(Arc::clone(&stderr_tail)),
        ))
    });

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for `{command}`"))?;

    // Drain the pipes before deciding so the tail is complete.
    for pump in [stdout_pump, stderr_pump].into_iter().flatten() {
        let _ = pump.await;
    }

    debug!(cmd = %command, exit_code = ?status.code(), "command exited");

    if status.success() {
        return Ok(());
    }

    let code = status
        .code()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "signal".to_string());
    let tail: Vec<String> = stderr_tail
        .lock()
        .map(|lines| lines.iter().cloned().collect())
        .unwrap_or_default();

    if tail.is_empty() {
        bail!("command `{command}` exited with status {code}");
    }
    bail!(
        "command `{command}` exited with status {code}\n{}",
        tail.join("\n")
    )
}

/// Build a shell command appropriate for the platform.
fn shell(command: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

async fn forward_lines<R>(
    reader: R,
    stream: Stream,
    tail: Option<Arc<Mutex<VecDeque<String>>>>,
) where
    R: AsyncRead + Unpin,
{
    let mut segments = BufReader::new(reader).split(b'\n');
    let mut stdout = tokio::io::stdout();
    let mut stderr = tokio::io::stderr();

    loop {
        let mut line = match segments.next_segment().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                debug!(?stream, "reading child output failed: {e}");
                break;
            }
        };

        if let Some(tail) = &tail {
            if let Ok(mut tail) = tail.lock() {
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(String::from_utf8_lossy(&line).into_owned());
            }
        }

        // Keep draining even when our own stream is gone.
        line.push(b'\n');
        let written = match stream {
            Stream::Stdout => stdout.write_all(&line).await,
            Stream::Stderr => stderr.write_all(&line).await,
        };
        if let Err(e) = written {
            debug!(?stream, "forwarding child output failed: {e}");
        }
    }

    let _ = stdout.flush().await;
    let _ = stderr.flush().await;
}
