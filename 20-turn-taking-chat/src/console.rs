use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::{
    error::{ChatError, Result},
    message::{Handle, Message, QUIT},
};

const LINE_ENDINGS: &[char] = &['\n', '\r'];

/// What the local operator typed when it was their turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalInput {
    Send(Message),
    Quit,
    /// Console input reached end of file.
    Closed,
}

pub async fn write_line<W>(out: &mut W, line: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut bytes = Vec::with_capacity(line.len() + 1);
    bytes.extend_from_slice(line.as_bytes());
    bytes.push(b'\n');
    write_flushed(out, &bytes).await
}

async fn write_prompt<W>(out: &mut W, prompt: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    write_flushed(out, prompt.as_bytes()).await
}

async fn write_flushed<W>(out: &mut W, bytes: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    out.write_all(bytes).await.map_err(ChatError::Console)?;
    out.flush().await.map_err(ChatError::Console)
}

async fn read_line<R>(input: &mut R) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let read = input.read_line(&mut line).await.map_err(ChatError::Console)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(LINE_ENDINGS).to_string()))
}

/// Prompts with `<handle>> ` until the operator enters something sendable,
/// the quit literal, or input runs out. Empty and overlong lines are
/// silently re-prompted.
pub async fn acquire_input<R, W>(input: &mut R, out: &mut W, handle: &Handle) -> Result<LocalInput>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let prompt = format!("{handle}> ");
    loop {
        write_prompt(out, &prompt).await?;
        let Some(line) = read_line(input).await? else {
            return Ok(LocalInput::Closed);
        };
        if line == QUIT {
            return Ok(LocalInput::Quit);
        }
        match Message::new(line) {
            Ok(message) => return Ok(LocalInput::Send(message)),
            Err(reason) => debug!(%reason, "re-prompting for input"),
        }
    }
}

/// Interactive handle selection. Returns `None` if input ends first.
pub async fn prompt_handle<R, W>(input: &mut R, out: &mut W) -> Result<Option<Handle>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        write_prompt(out, "Please enter a user name of 10 characters or less: ").await?;
        let Some(line) = read_line(input).await? else {
            return Ok(None);
        };
        match Handle::new(line) {
            Ok(handle) => return Ok(Some(handle)),
            Err(reason) => debug!(%reason, "re-prompting for handle"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MAX_LEN;

    #[tokio::test]
    async fn reprompts_until_input_fits() {
        let long = "y".repeat(MAX_LEN + 1);
        let script = format!("\n{long}\nhi there\n");
        let mut input = script.as_bytes();
        let mut out = Vec::new();
        let handle = Handle::new("srv").unwrap();

        let got = acquire_input(&mut input, &mut out, &handle).await.unwrap();

        assert_eq!(got, LocalInput::Send(Message::new("hi there").unwrap()));
        assert_eq!(String::from_utf8(out).unwrap(), "srv> srv> srv> ");
    }

    #[tokio::test]
    async fn quit_literal_is_recognised() {
        let mut input: &[u8] = b"\\quit\r\n";
        let mut out = Vec::new();
        let handle = Handle::new("srv").unwrap();

        let got = acquire_input(&mut input, &mut out, &handle).await.unwrap();
        assert_eq!(got, LocalInput::Quit);
    }

    #[tokio::test]
    async fn quit_must_match_exactly() {
        let mut input: &[u8] = b"\\quit now\n";
        let mut out = Vec::new();
        let handle = Handle::new("srv").unwrap();

        let got = acquire_input(&mut input, &mut out, &handle).await.unwrap();
        assert_eq!(got, LocalInput::Send(Message::new("\\quit now").unwrap()));
    }

    #[tokio::test]
    async fn exhausted_input_is_reported() {
        let mut input: &[u8] = b"\n";
        let mut out = Vec::new();
        let handle = Handle::new("srv").unwrap();

        let got = acquire_input(&mut input, &mut out, &handle).await.unwrap();
        assert_eq!(got, LocalInput::Closed);
    }

    #[tokio::test]
    async fn handle_prompt_rejects_bad_names() {
        let mut input: &[u8] = b"\nfar-too-long-name\nsrv\n";
        let mut out = Vec::new();

        let handle = prompt_handle(&mut input, &mut out).await.unwrap();
        assert_eq!(handle, Some(Handle::new("srv").unwrap()));
    }
}
