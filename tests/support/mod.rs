//! Shared test utilities.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt;

/// Writer collecting formatted log lines into a shared buffer.
#[derive(Clone)]
pub struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.0.lock().unwrap();
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Installs a capturing subscriber on the current thread and returns the
/// buffer plus the default-guard keeping it active.
pub fn install_capture(
    max_level: tracing::Level,
) -> (Arc<Mutex<Vec<u8>>>, tracing::subscriber::DefaultGuard) {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let writer_buffer = Arc::clone(&buffer);
    let subscriber = fmt()
        .with_max_level(max_level)
        .without_time()
        .with_writer(move || CaptureWriter(writer_buffer.clone()))
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}

/// Renders the captured buffer as a string.
pub fn captured(buffer: &Arc<Mutex<Vec<u8>>>) -> String {
    String::from_utf8(buffer.lock().unwrap().clone()).unwrap()
}
