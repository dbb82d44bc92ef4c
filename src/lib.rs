//! Vendor-neutral driver layer for button-and-LED grid controllers
//!
//! This crate speaks the wire protocols of monome-style grid devices and
//! presents them behind one device-independent surface: canonical `(x, y)`
//! coordinates with the origin at the top-left, regardless of which edge the
//! cable leaves the hardware from. Applications set LEDs and receive button
//! events without knowing the model, the protocol family, or the physical
//! orientation of the device on the desk.
//!
//! The moving parts:
//!
//! - [`Grid`] is the handle to one open device. It owns the transport, the
//!   resolved codec, and the table of event handlers.
//! - [`Transport`] abstracts the byte pipe to the hardware. This crate ships
//!   no real serial or network transport; callers supply one, and tests use
//!   [`testing::MockTransport`].
//! - [`protocol::Codec`] is the per-family wire format. The 40h family is
//!   built in; others plug in through a [`protocol::CodecRegistry`].
//! - [`Orientation`] selects the rotation applied to every coordinate and
//!   frame crossing the wire boundary.
//!
//! # Example
//!
//! ```
//! use opengrid::testing::MockTransport;
//! use opengrid::{EventType, Grid};
//!
//! let io = MockTransport::with_serial("m40h0001");
//! let mut grid = Grid::open("/dev/ttyUSB0", io.clone())?;
//!
//! grid.register_handler(EventType::ButtonDown, |event| {
//!     println!("press at ({}, {})", event.x, event.y);
//! });
//!
//! grid.led_on(3, 5)?;
//! assert_eq!(io.written(), vec![0x20, 0x35]);
//! # Ok::<(), opengrid::Error>(())
//! ```

pub mod device;
pub mod error;
pub mod grid;
pub mod protocol;
pub mod rotation;
pub mod testing;
pub mod transport;
pub mod types;

pub use error::{Error, Result};
pub use grid::Grid;
pub use protocol::{Codec, CodecRegistry};
pub use transport::Transport;
pub use types::{ClearStatus, Event, EventType, Geometry, GridMode, Orientation};
