//! Scripted in-memory stream for protocol tests: replies are preloaded,
//! writes are captured through a shared handle, and half-closes are
//! observable.

use std::io::{Cursor, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::transport::Stream;

pub(crate) struct ScriptedStream {
    input: Cursor<Vec<u8>>,
    written: Arc<Mutex<Vec<u8>>>,
    write_closed: Arc<AtomicBool>,
}

/// Keeps the captured side of a [`ScriptedStream`] reachable after the
/// transport has taken ownership of it.
#[derive(Clone)]
pub(crate) struct Capture {
    written: Arc<Mutex<Vec<u8>>>,
    write_closed: Arc<AtomicBool>,
}

impl Capture {
    pub(crate) fn bytes(&self) -> Vec<u8> {
        self.written.lock().unwrap().clone()
    }

    pub(crate) fn write_closed(&self) -> bool {
        self.write_closed.load(Ordering::SeqCst)
    }
}

impl ScriptedStream {
    /// A stream whose read side replays `script` and then reports EOF.
    pub(crate) fn replying(script: &[u8]) -> Self {
        Self {
            input: Cursor::new(script.to_vec()),
            written: Arc::new(Mutex::new(Vec::new())),
            write_closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn with_capture(script: &[u8]) -> (Self, Capture) {
        let stream = Self::replying(script);
        let capture = Capture {
            written: Arc::clone(&stream.written),
            write_closed: Arc::clone(&stream.write_closed),
        };
        (stream, capture)
    }
}

impl Read for ScriptedStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.input.read(buf)
    }
}

impl Write for ScriptedStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.write_closed.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "write side closed",
            ));
        }
        self.written.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Stream for ScriptedStream {
    fn shutdown_write(&mut self) -> std::io::Result<()> {
        self.write_closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn shutdown_both(&mut self) -> std::io::Result<()> {
        self.write_closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// `env_logger` hook for tests that want protocol traces; safe to call
/// repeatedly.
#[allow(dead_code)]
pub(crate) fn init_test_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Trace)
        .format_timestamp_millis()
        .is_test(true)
        .try_init();
}
