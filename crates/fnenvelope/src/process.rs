use std::io;
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};

use fnenvelope_protocol::{JsonProtocol, ProtocolConfig};

/// A protocol over a function process's stdin/stdout.
pub type FunctionProtocol = JsonProtocol<ChildStdin, ChildStdout>;

/// A running function process with a protocol over its stdio.
///
/// The function's stderr is inherited. [`shutdown`](Self::shutdown) closes the
/// function's stdin and waits for it to exit; dropping the process does the
/// same, so a function that keeps running after stdin closes blocks the drop.
pub struct FunctionProcess {
    child: Child,
    protocol: Option<FunctionProtocol>,
}

impl FunctionProcess {
    /// Spawn `command` with piped stdin/stdout.
    pub fn spawn(command: &mut Command, config: ProtocolConfig) -> io::Result<Self> {
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let (Some(stdin), Some(stdout)) = (stdin, stdout) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(io::Error::other("function stdio was not piped"));
        };

        tracing::debug!(
            pid = child.id(),
            program = %command.get_program().to_string_lossy(),
            "function started"
        );
        Ok(Self {
            child,
            protocol: Some(JsonProtocol::with_config(stdin, stdout, config)),
        })
    }

    /// OS process id of the function.
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// The protocol over the function's stdio, or `None` after shutdown.
    pub fn protocol_mut(&mut self) -> Option<&mut FunctionProtocol> {
        self.protocol.as_mut()
    }

    /// Close the function's stdin and wait for it to exit.
    ///
    /// Calling this again returns the same exit status.
    pub fn shutdown(&mut self) -> io::Result<ExitStatus> {
        // Closing stdin tells the function there are no more requests.
        self.protocol.take();
        let status = self.child.wait()?;
        tracing::debug!(pid = self.child.id(), %status, "function exited");
        Ok(status)
    }
}

impl Drop for FunctionProcess {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            tracing::warn!(error = %err, "failed waiting for function");
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::path::PathBuf;

    use fnenvelope_protocol::{BufferedResponse, Sink};
    use http::{Request, StatusCode};

    use super::*;

    fn marker_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("fnenvelope-{name}-{}", std::process::id()))
    }

    #[test]
    fn cat_reflects_request_envelope_as_response() {
        // `cat` writes the request envelope back; its `body` field doubles as
        // the response body.
        let mut function =
            FunctionProcess::spawn(&mut Command::new("cat"), ProtocolConfig::default()).unwrap();

        for body in ["first", "second"] {
            let mut response = BufferedResponse::new();
            function
                .protocol_mut()
                .unwrap()
                .dispatch(
                    Sink::http(&mut response),
                    Request::new(Some(body.as_bytes())),
                )
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.body(), body.as_bytes());
        }

        // `cat` only exits once its stdin is closed.
        assert!(function.shutdown().unwrap().success());
        assert!(function.protocol_mut().is_none());
        assert!(function.shutdown().unwrap().success());
    }

    #[test]
    fn shutdown_reports_exit_status() {
        let mut function = FunctionProcess::spawn(
            Command::new("sh").args(["-c", "cat >/dev/null; exit 3"]),
            ProtocolConfig::default(),
        )
        .unwrap();

        assert_eq!(function.shutdown().unwrap().code(), Some(3));
    }

    #[test]
    fn drop_closes_stdin_and_reaps() {
        let marker = marker_path("drop-reaps");
        let _ = std::fs::remove_file(&marker);

        let function = FunctionProcess::spawn(
            Command::new("sh").args([
                "-c",
                "cat >/dev/null; sleep 0.2; touch \"$1\"",
                "sh",
                marker.to_str().unwrap(),
            ]),
            ProtocolConfig::default(),
        )
        .unwrap();
        assert!(!marker.exists());

        drop(function);

        assert!(marker.exists(), "drop returned before the function exited");
        std::fs::remove_file(&marker).unwrap();
    }

    #[test]
    fn missing_program_is_an_error() {
        let err = FunctionProcess::spawn(
            &mut Command::new("/nonexistent/fnenvelope-function"),
            ProtocolConfig::default(),
        )
        .err()
        .unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
