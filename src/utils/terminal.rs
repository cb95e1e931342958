use std::io::{self, Write};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, sleep};

use crate::error::{Result, ResultError};

pub const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];
pub const SPINNER_INTERVAL: Duration = Duration::from_millis(150);
const WAITING: &str = "Waiting to fetch the result";

// Writes `text` one character at a time, pausing `delay` after each.
pub async fn type_text<W: Write>(out: &mut W, text: &str, delay: Duration) -> io::Result<()> {
    for ch in text.chars() {
        write!(out, "{ch}")?;
        out.flush()?;
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }
    Ok(())
}

/// Redraws a spinner every `every` until `task` completes, then joins it.
///
/// Nothing is drawn when the task has already finished.
pub async fn wait_with_spinner<T, W: Write>(mut task: JoinHandle<T>, out: &mut W, every: Duration) -> Result<T> {
    if task.is_finished() {
        return Ok(task.await?);
    }

    let mut ticker = interval(every);
    let mut frame = 0;
    let output = loop {
        tokio::select! {
            joined = &mut task => break joined?,
            _ = ticker.tick() => {
                draw_frame(out, SPINNER_FRAMES[frame % SPINNER_FRAMES.len()]).map_err(ResultError::Output)?;
                frame += 1;
            }
        }
    };

    clear_line(out).map_err(ResultError::Output)?;
    Ok(output)
}

fn draw_frame<W: Write>(out: &mut W, frame: char) -> io::Result<()> {
    write!(out, "\r{WAITING} {frame}...")?;
    out.flush()
}

fn clear_line<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "\r{}\r\n\n", " ".repeat(WAITING.len() + 4))?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn typed_text_is_written_in_full() {
        let mut out = Vec::new();
        type_text(&mut out, "SSC Examination Result\n", Duration::ZERO).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "SSC Examination Result\n");
    }

    #[tokio::test]
    async fn finished_task_skips_spinner() {
        let task = tokio::spawn(async { 7 });
        while !task.is_finished() {
            tokio::task::yield_now().await;
        }
        let mut out = Vec::new();
        assert_eq!(wait_with_spinner(task, &mut out, Duration::from_millis(5)).await.unwrap(), 7);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn spinner_runs_until_task_completes() {
        let task = tokio::spawn(async {
            sleep(Duration::from_millis(60)).await;
            "done"
        });
        let mut out = Vec::new();
        let value = wait_with_spinner(task, &mut out, Duration::from_millis(5)).await.unwrap();
        assert_eq!(value, "done");

        let drawn = String::from_utf8(out).unwrap();
        assert!(drawn.contains("\rWaiting to fetch the result |..."), "{drawn:?}");
        assert!(drawn.contains("\rWaiting to fetch the result /..."), "{drawn:?}");
        assert!(drawn.ends_with("\r\n\n"), "{drawn:?}");
    }

    #[tokio::test]
    async fn panicking_task_is_an_error() {
        let task: JoinHandle<()> = tokio::spawn(async {
            sleep(Duration::from_millis(10)).await;
            panic!("boom");
        });
        let mut out = Vec::new();
        let err = wait_with_spinner(task, &mut out, Duration::from_millis(5)).await.unwrap_err();
        assert!(matches!(err, ResultError::Task(_)));
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn spinner_write_failure_is_an_output_error() {
        let task = tokio::spawn(async {
            sleep(Duration::from_millis(50)).await;
        });
        let err = wait_with_spinner(task, &mut ClosedPipe, Duration::from_millis(5)).await.unwrap_err();
        assert!(matches!(err, ResultError::Output(_)));
    }
}
