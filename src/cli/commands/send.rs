//! Send command - submit one command line to a running daemon
//!
//! Fire-and-forget: the daemon never answers, so success only means the
//! datagram reached the socket.

use crate::cli::args::SendArgs;
use crate::config::Config;
use crate::error::{JobsError, JobsResult};
use crate::intake::BUFFER_SIZE;
use console::style;
use tokio::net::UnixDatagram;
use tracing::debug;

/// Execute the send command
pub async fn execute(args: SendArgs, config: &Config) -> JobsResult<()> {
    let socket_path = args.socket.as_ref().unwrap_or(&config.socket);
    let line = command_line(&args.command)?;

    if line.len() > BUFFER_SIZE {
        return Err(JobsError::User(format!(
            "Command line is {} bytes, the daemon reads at most {}",
            line.len(),
            BUFFER_SIZE
        )));
    }

    let socket = UnixDatagram::unbound().map_err(|e| JobsError::io("creating socket", e))?;
    debug!("Sending to {}: {}", socket_path.display(), line);
    socket
        .send_to(line.as_bytes(), socket_path)
        .await
        .map_err(|source| JobsError::Send {
            path: socket_path.clone(),
            source,
        })?;

    println!(
        "{} Sent {}",
        style("✓").green(),
        style(&line).cyan()
    );
    Ok(())
}

/// A single word is sent as-is; several words are shell-quoted so
/// argument boundaries survive the round trip.
fn command_line(words: &[String]) -> JobsResult<String> {
    match words {
        [single] => Ok(single.clone()),
        _ => shlex::try_join(words.iter().map(String::as_str))
            .map_err(|e| JobsError::User(format!("Cannot quote command: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn single_word_sent_verbatim() {
        assert_eq!(command_line(&words(&["sleep 10"])).unwrap(), "sleep 10");
    }

    #[test]
    fn several_words_are_quoted() {
        assert_eq!(
            command_line(&words(&["echo", "a b", "c"])).unwrap(),
            "echo 'a b' c"
        );
    }

    #[tokio::test]
    async fn delivers_datagram() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jobs.sock");
        let listener = UnixDatagram::bind(&path).unwrap();

        let args = SendArgs {
            socket: Some(path),
            command: words(&["echo", "hello"]),
        };
        execute(args, &Config::default()).await.unwrap();

        let mut buf = [0u8; BUFFER_SIZE];
        let n = listener.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"echo hello");
    }

    #[tokio::test]
    async fn missing_daemon_is_send_error() {
        let temp = TempDir::new().unwrap();
        let args = SendArgs {
            socket: Some(temp.path().join("nobody.sock")),
            command: words(&["echo"]),
        };

        let err = execute(args, &Config::default()).await.unwrap_err();
        assert!(matches!(err, JobsError::Send { .. }));
        assert!(err.hint().is_some());
    }
}
