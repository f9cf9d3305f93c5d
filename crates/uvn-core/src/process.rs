use std::{
    io::{self, Read, Write},
    process::{Command, Stdio},
    thread,
};

use anyhow::{Context, Result};

const DEFAULT_MAX_CAPTURE_BYTES: usize = 1024 * 1024;

fn max_capture_bytes() -> usize {
    std::env::var("UVN_MAX_CAPTURE_BYTES")
        .ok()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_MAX_CAPTURE_BYTES)
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// How the child's output streams are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Collect stdout and stderr without echoing them.
    Capture,
    /// Echo stdout and stderr to the parent while collecting them.
    Stream,
}

/// A fully described external command.
#[derive(Debug, Clone)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn argv(&self) -> &[String] {
        &self.args
    }

    /// Run the command to completion.
    ///
    /// Stdout is kept whole since callers parse it. Stderr only feeds
    /// diagnostics and keeps its last `UVN_MAX_CAPTURE_BYTES`.
    ///
    /// # Errors
    ///
    /// Returns an error when the program cannot be spawned or its output
    /// streams cannot be read entirely.
    pub fn run(&self, mode: OutputMode) -> Result<RunOutput> {
        tracing::debug!(program = %self.program, args = ?self.args, ?mode, "spawning");
        let echo = mode == OutputMode::Stream;
        let program = &self.program;
        let mut command = Command::new(program);
        command.args(&self.args);
        for (key, value) in &self.envs {
            command.env(key, value);
        }
        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());

        let mut child = command
            .spawn()
            .with_context(|| format!("failed to start {program}"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow::anyhow!("stdout missing for {program}"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow::anyhow!("stderr missing for {program}"))?;

        let limit = max_capture_bytes();
        let stdout_handle = thread::spawn(move || {
            let sink: Box<dyn Write + Send> = if echo {
                Box::new(io::stdout())
            } else {
                Box::new(io::sink())
            };
            collect(stdout, sink, None)
        });
        let stderr_handle = thread::spawn(move || {
            let sink: Box<dyn Write + Send> = if echo {
                Box::new(io::stderr())
            } else {
                Box::new(io::sink())
            };
            collect(stderr, sink, Some(limit))
        });

        let status = child
            .wait()
            .with_context(|| format!("failed to wait for {program}"))?;
        let stdout = stdout_handle
            .join()
            .map_err(|_| anyhow::anyhow!("stdout thread panicked"))??;
        let stderr = stderr_handle
            .join()
            .map_err(|_| anyhow::anyhow!("stderr thread panicked"))??;
        Ok(RunOutput {
            code: status.code().unwrap_or(-1),
            stdout,
            stderr,
        })
    }
}

fn collect(mut reader: impl Read, mut sink: impl Write, limit: Option<usize>) -> Result<String> {
    let mut buffer = Vec::new();
    let mut truncated = false;
    let mut chunk = [0u8; 8192];
    loop {
        let read = reader.read(&mut chunk)?;
        if read == 0 {
            break;
        }
        sink.write_all(&chunk[..read])?;
        match limit {
            Some(limit) => append_limited(&mut buffer, &chunk[..read], limit, &mut truncated),
            None => buffer.extend_from_slice(&chunk[..read]),
        }
    }
    sink.flush().ok();
    let mut text = String::from_utf8_lossy(&buffer).to_string();
    if truncated {
        text.insert_str(0, "[...truncated...]\n");
    }
    Ok(text)
}

// Keeps the tail of the stream; diagnostics usually end with the failure.
fn append_limited(buffer: &mut Vec<u8>, chunk: &[u8], limit: usize, truncated: &mut bool) {
    if buffer.len().saturating_add(chunk.len()) <= limit {
        buffer.extend_from_slice(chunk);
        return;
    }
    *truncated = true;
    let old_len = buffer.len();
    let excess = old_len.saturating_add(chunk.len()).saturating_sub(limit);
    if excess >= old_len {
        buffer.clear();
        let drop_from_chunk = excess.saturating_sub(old_len).min(chunk.len());
        buffer.extend_from_slice(&chunk[drop_from_chunk..]);
    } else {
        buffer.drain(0..excess);
        buffer.extend_from_slice(chunk);
    }
}
