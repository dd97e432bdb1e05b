//! Byte-sinks the encoders write into

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::rotation::RotatingFile;

/// Standard output, the default console byte-sink
pub fn stdout() -> BoxMakeWriter {
    BoxMakeWriter::new(io::stdout)
}

/// Standard error
pub fn stderr() -> BoxMakeWriter {
    BoxMakeWriter::new(io::stderr)
}

/// Byte-sink backed by a shared [`RotatingFile`]
pub fn rotating(file: Arc<RotatingFile>) -> BoxMakeWriter {
    BoxMakeWriter::new(FileWriter(file))
}

#[derive(Debug, Clone)]
struct FileWriter(Arc<RotatingFile>);

impl<'a> MakeWriter<'a> for FileWriter {
    type Writer = &'a RotatingFile;

    fn make_writer(&'a self) -> Self::Writer {
        self.0.as_ref()
    }
}

/// In-memory byte-sink that keeps everything written to it
///
/// Clones share the same buffer, so one clone can be handed to a logger and
/// another kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct CaptureWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl CaptureWriter {
    /// Create an empty capture buffer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }

    /// Written lines, without their newlines
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    /// Discard everything captured so far
    pub fn clear(&self) {
        self.buf.lock().clear();
    }

    /// Box this capture as a logger byte-sink
    #[must_use]
    pub fn boxed(&self) -> BoxMakeWriter {
        BoxMakeWriter::new(self.clone())
    }
}

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CaptureWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotation::RotationPolicy;
    use std::io::Write;

    #[test]
    fn capture_clones_share_a_buffer() {
        let capture = CaptureWriter::new();
        let boxed = capture.boxed();

        boxed.make_writer().write_all(b"one\ntwo\n").unwrap();
        assert_eq!(capture.lines(), ["one", "two"]);

        capture.clear();
        assert_eq!(capture.contents(), "");
    }

    #[test]
    fn rotating_writer_appends_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let file = Arc::new(
            RotatingFile::open(
                &path,
                RotationPolicy {
                    max_size_mb: 0,
                    max_backups: 0,
                    max_age_days: 0,
                    compress: false,
                },
            )
            .unwrap(),
        );

        let writer = rotating(Arc::clone(&file));
        writer.make_writer().write_all(b"hello\n").unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello\n");
        assert_eq!(file.size(), 6);
    }
}
