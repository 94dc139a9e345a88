use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};

/// Most lines held while the TUI owns the terminal; older ones are dropped.
pub const MAX_BUFFERED_LINES: usize = 1000;

static BUFFER: Mutex<Option<Pending>> = Mutex::new(None);

/// Bounded queue of held-back lines plus a count of the ones evicted.
#[derive(Debug)]
struct Pending {
    lines: VecDeque<String>,
    dropped: usize,
    capacity: usize,
}

impl Pending {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            dropped: 0,
            capacity,
        }
    }

    fn push(&mut self, msg: String) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
            self.dropped += 1;
        }
        self.lines.push_back(msg);
    }

    fn into_lines(self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.lines.len() + 1);
        if self.dropped > 0 {
            out.push(format!("({} earlier messages dropped)", self.dropped));
        }
        out.extend(self.lines);
        out
    }
}

fn lock() -> MutexGuard<'static, Option<Pending>> {
    BUFFER.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Activate buffering. While active, `warn()` calls store messages
/// instead of printing to stderr.
pub fn activate() {
    *lock() = Some(Pending::with_capacity(MAX_BUFFERED_LINES));
}

/// Deactivate buffering and return all collected messages.
pub fn drain() -> Vec<String> {
    lock().take().map(Pending::into_lines).unwrap_or_default()
}

/// Write a warning message. If buffering is active the message is stored;
/// otherwise it is printed to stderr immediately.
pub fn warn(msg: String) {
    let mut guard = lock();
    if let Some(buf) = guard.as_mut() {
        buf.push(msg);
    } else {
        drop(guard);
        eprintln!("{}", msg);
    }
}

/// `io::Write` sink for the log subscriber. Collects one formatted event and
/// hands it to `warn()` when dropped.
#[derive(Debug, Default)]
pub struct BufferedWriter {
    bytes: Vec<u8>,
}

impl BufferedWriter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Write for BufferedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for BufferedWriter {
    fn drop(&mut self) {
        if self.bytes.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(&self.bytes);
        warn(text.trim_end_matches('\n').to_string());
    }
}
