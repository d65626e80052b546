//! Output sinks for response text.
//!
//! The engine never touches a transport directly. Whatever a command prints
//! goes through an [`OutputSink`] owned by the context manager.

use std::cell::RefCell;
use std::rc::Rc;

/// Destination for response bytes (UART TX, BLE notify, stdout).
///
/// The returned count is transport-defined; the engine ignores it.
pub trait OutputSink {
    fn write(&mut self, data: &[u8]) -> usize;
}

/// Any `FnMut(&[u8]) -> usize` is a sink.
impl<F> OutputSink for F
where
    F: FnMut(&[u8]) -> usize,
{
    fn write(&mut self, data: &[u8]) -> usize {
        self(data)
    }
}

/// Discards everything. Used when no sink is supplied.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn write(&mut self, _data: &[u8]) -> usize {
        0
    }
}

/// Collects output into a shared buffer.
///
/// Clones share the same buffer, so a host can hand one clone to the
/// context manager and read back through another.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.borrow()).into_owned()
    }

    /// Drain the buffer, returning what it held.
    pub fn take(&self) -> String {
        let bytes = std::mem::take(&mut *self.buf.borrow_mut());
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.borrow().is_empty()
    }
}

impl OutputSink for MemorySink {
    fn write(&mut self, data: &[u8]) -> usize {
        self.buf.borrow_mut().extend_from_slice(data);
        data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_sink_accepts_anything() {
        let mut sink = NullSink;
        assert_eq!(sink.write(b"hello"), 0);
    }

    #[test]
    fn memory_sink_clones_share_buffer() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();
        writer.write(b"Mount ");
        writer.write(b"success\n");
        assert_eq!(sink.contents(), "Mount success\n");
    }

    #[test]
    fn memory_sink_take_drains() {
        let mut sink = MemorySink::new();
        sink.write(b"abc");
        assert_eq!(sink.take(), "abc");
        assert!(sink.is_empty());
    }

    #[test]
    fn closure_is_a_sink() {
        let mut count = 0usize;
        {
            let mut sink = |data: &[u8]| {
                count += data.len();
                data.len()
            };
            OutputSink::write(&mut sink, b"1234");
        }
        assert_eq!(count, 4);
    }
}
