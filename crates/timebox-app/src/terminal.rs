use std::{
    fmt,
    io::{self, Stdout, Write},
    sync::{Mutex, MutexGuard, PoisonError},
};

use timebox_proto::ports::display::{DisplayError, DisplayTarget};

#[derive(Debug)]
struct LineState<W> {
    writer: W,
    width: usize,
    attached: bool,
}

/// Display target that keeps rewriting one terminal line.
#[derive(Debug)]
pub struct TerminalElement<W> {
    line: Mutex<LineState<W>>,
}

impl TerminalElement<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalElement<W> {
    pub fn new(writer: W) -> Self {
        Self {
            line: Mutex::new(LineState {
                writer,
                width: 0,
                attached: true,
            }),
        }
    }

    fn line(&self) -> MutexGuard<'_, LineState<W>> {
        self.line.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move past the clock line and stop accepting writes.
    pub fn finish(&self) -> io::Result<()> {
        let mut line = self.line();

        if !line.attached {
            return Ok(());
        }

        line.attached = false;
        if line.width > 0 {
            line.writer.write_all(b"\n")?;
        }
        line.writer.flush()
    }

    #[cfg(test)]
    fn into_writer(self) -> W {
        self.line
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .writer
    }
}

impl<W> DisplayTarget for TerminalElement<W>
where
    W: Write + Send + fmt::Debug,
{
    fn set_text(&self, text: &str) -> Result<(), DisplayError> {
        let mut line = self.line();

        if !line.attached {
            return Err(DisplayError::Detached);
        }

        let width = text.chars().count();
        let padding = line.width.saturating_sub(width);

        write!(line.writer, "\r{text}{:padding$}", "")?;
        line.writer.flush()?;
        line.width = width;

        Ok(())
    }

    fn detach(&self) {
        self.line().attached = false;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use timebox_core::{
        clock::{ClockOptions, ClockWidget},
        document::Document,
        test_utils::{ScriptedClock, local},
    };

    use super::*;

    fn output(element: TerminalElement<Vec<u8>>) -> String {
        String::from_utf8(element.into_writer()).expect("utf-8 output")
    }

    #[test]
    fn rewrites_the_same_line() {
        let element = TerminalElement::new(Vec::new());

        element.set_text("Fri, Mar 15, 12:59:59 PM").expect("write succeeds");
        element.set_text("Fri, Mar 15, 1:00:00 PM").expect("write succeeds");

        assert_eq!(
            output(element),
            "\rFri, Mar 15, 12:59:59 PM\rFri, Mar 15, 1:00:00 PM "
        );
    }

    #[test]
    fn finish_ends_the_line_and_detaches() {
        let element = TerminalElement::new(Vec::new());

        element.set_text("tick").expect("write succeeds");
        element.finish().expect("finish succeeds");
        element.finish().expect("second finish is a no-op");

        assert_eq!(element.set_text("late"), Err(DisplayError::Detached));
        assert_eq!(output(element), "\rtick\n");
    }

    #[derive(Debug, Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn mounted_clock_writes_to_terminal_line() {
        let buffer = SharedBuffer::default();
        let element = Arc::new(TerminalElement::new(buffer.clone()));
        let document = Document::new().with_element("time-box", element.clone());
        let clock = Arc::new(ScriptedClock::fixed(local(2024, 3, 15, 13, 4, 5)));

        let mut handle = ClockWidget::mount(
            &document,
            &ClockOptions::default(),
            clock,
            &tokio::runtime::Handle::current(),
        )
        .expect("target present");

        tokio::time::advance(std::time::Duration::from_millis(100)).await;
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        handle.stop();
        element.finish().expect("finish succeeds");

        let written = buffer.0.lock().unwrap_or_else(PoisonError::into_inner).clone();
        assert_eq!(
            String::from_utf8(written).expect("utf-8 output"),
            "\rFri, Mar 15, 1:04:05 PM\rFri, Mar 15, 1:04:05 PM\n"
        );
        assert_eq!(handle.render_count(), 2);
    }
}
