//! Byte-transport capability consumed by the protocol codecs
//!
//! Concrete serial and network transports live outside this crate; the core
//! only needs the small read/write/wait surface below. A transport is opened
//! by the caller and handed to [`Grid::open`](crate::Grid::open), which takes
//! exclusive ownership of it for the handle's lifetime.

use std::io;

/// Byte-level access to an open grid device.
///
/// Implementations are frame-oriented on the read side: the wire protocols
/// served by this crate exchange fixed-size frames, and a partial frame is a
/// transport-level fault rather than something the codecs reassemble.
pub trait Transport {
    /// Non-blocking read of up to `buf.len()` bytes.
    ///
    /// Returns `Ok(0)` when fewer than `buf.len()` bytes are currently
    /// available; a non-zero count smaller than `buf.len()` means the frame
    /// was truncated and is reported by the codec as an i/o failure.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write `buf`, returning the number of bytes actually transmitted.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Block until at least one byte can be read.
    ///
    /// This is the only suspension point the core ever drives. There is no
    /// internal timeout or cancellation; callers needing either must wrap or
    /// interrupt the wait externally (for instance with a signal).
    fn wait_readable(&mut self) -> io::Result<()>;

    /// Serial identifier probed while opening the transport, when the
    /// underlying device exposes one. Network transports return `None`.
    fn serial(&self) -> Option<&str> {
        None
    }

    /// Release the underlying resource. Called once by [`Grid::close`]
    /// (dropping the handle releases the resource implicitly).
    ///
    /// [`Grid::close`]: crate::Grid::close
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}
