//! Test double for the transport capability
//!
//! Real serial and network transports live outside this crate, so its own
//! tests (and those of downstream codec crates) drive devices through
//! [`MockTransport`]: a scriptable in-memory transport that records every
//! byte written and replays bytes queued by the test.
//!
//! Clones share state, which lets a test keep inspecting traffic after the
//! transport itself has been moved into a [`Grid`](crate::Grid).

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use crate::transport::Transport;

#[derive(Debug, Default)]
struct Shared {
    incoming: VecDeque<u8>,
    written: Vec<u8>,
    write_limit: Option<usize>,
    read_limit: Option<usize>,
}

/// In-memory [`Transport`] for tests.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    serial: Option<String>,
    shared: Rc<RefCell<Shared>>,
}

impl MockTransport {
    /// A transport with no probed serial, as a network endpoint would be.
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose serial probe yielded `serial`.
    pub fn with_serial(serial: &str) -> Self {
        Self {
            serial: Some(serial.to_owned()),
            ..Self::default()
        }
    }

    /// Queue bytes the device "sends"; subsequent reads consume them.
    pub fn queue_incoming(&self, bytes: &[u8]) {
        self.shared.borrow_mut().incoming.extend(bytes);
    }

    /// Everything written to the transport so far, oldest byte first.
    pub fn written(&self) -> Vec<u8> {
        self.shared.borrow().written.clone()
    }

    /// Forget recorded writes, keeping queued input.
    pub fn clear_written(&self) {
        self.shared.borrow_mut().written.clear();
    }

    /// Cap every subsequent write at `limit` bytes, simulating a transport
    /// that truncates frames.
    pub fn limit_writes(&self, limit: usize) {
        self.shared.borrow_mut().write_limit = Some(limit);
    }

    /// Cap every subsequent read at `limit` bytes, simulating a transport
    /// that delivers torn frames instead of withholding partial ones.
    pub fn limit_reads(&self, limit: usize) {
        self.shared.borrow_mut().read_limit = Some(limit);
    }
}

impl Transport for MockTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut shared = self.shared.borrow_mut();
        let count = match shared.read_limit {
            Some(limit) => limit.min(buf.len()).min(shared.incoming.len()),
            None => {
                if shared.incoming.len() < buf.len() {
                    return Ok(0);
                }
                buf.len()
            }
        };
        for slot in buf.iter_mut().take(count) {
            if let Some(byte) = shared.incoming.pop_front() {
                *slot = byte;
            }
        }
        Ok(count)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut shared = self.shared.borrow_mut();
        let count = match shared.write_limit {
            Some(limit) => buf.len().min(limit),
            None => buf.len(),
        };
        shared.written.extend_from_slice(&buf[..count]);
        Ok(count)
    }

    fn wait_readable(&mut self) -> io::Result<()> {
        // A real transport would suspend here; the mock can only fail, which
        // doubles as the way tests break out of the blocking event loop.
        if self.shared.borrow().incoming.is_empty() {
            Err(io::Error::new(
                io::ErrorKind::WouldBlock,
                "mock transport has no queued input",
            ))
        } else {
            Ok(())
        }
    }

    fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }
}
