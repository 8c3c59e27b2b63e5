//! `tracing` setup for the worker.
//!
//! The fmt subscriber formats each event into a line; `ConsoleWriter` hands
//! that line to `console.log` on wasm32 and to stderr on native targets
//! (tests, tooling). Timestamps are disabled because `SystemTime` is not
//! available on `wasm32-unknown-unknown`.

use std::io::{self, Write};
use tracing_subscriber::fmt::MakeWriter;

/// Install the global subscriber. Calling it again is harmless.
pub fn init(level: tracing::Level) {
    let installed = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_writer(MakeConsoleWriter)
        .try_init();
    if installed.is_err() {
        tracing::debug!("logger already installed");
    }
}

/// Buffers one formatted event and emits it as a single console line.
#[derive(Debug, Default)]
pub struct ConsoleWriter {
    buf: Vec<u8>,
}

impl ConsoleWriter {
    fn emit(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.buf);
        let line = line.trim_end();
        #[cfg(target_arch = "wasm32")]
        web_sys::console::log_1(&wasm_bindgen::JsValue::from_str(line));
        #[cfg(not(target_arch = "wasm32"))]
        eprintln!("{line}");
        self.buf.clear();
    }
}

impl Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit();
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        self.emit();
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MakeConsoleWriter;

impl<'a> MakeWriter<'a> for MakeConsoleWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::default()
    }
}
