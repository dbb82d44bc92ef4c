//! The grid device handle
//!
//! A [`Grid`] binds together everything one open device needs: its fixed
//! dimensions, the active cable orientation, the codec resolved for its
//! protocol family, the exclusively owned transport, and the table of
//! registered event callbacks. All public operations are direct calls into
//! the bound codec; the codec is selected once at open time and never
//! swapped.

use tracing::debug;

use crate::device;
use crate::error::{Error, Result};
use crate::protocol::{Codec, CodecRegistry};
use crate::transport::Transport;
use crate::types::{
    ClearStatus, Event, EventType, Geometry, GridMode, Orientation, EVENT_TYPE_COUNT,
};

/// Fallback dimensions when resolution cannot supply any: the default
/// protocol family drives an 8x8 device, and network devices negotiate their
/// real size out of band.
const DEFAULT_DIMENSIONS: (u8, u8) = (8, 8);

type Handler = Box<dyn FnMut(&Event)>;

/// Handle to one open grid device.
///
/// The handle assumes a single logical consumer: one thread alternates
/// between LED calls and event pumping. Nothing here is safe to share
/// between threads, and the compiler enforces as much.
pub struct Grid {
    rows: u8,
    cols: u8,
    orientation: Orientation,
    serial: Option<String>,
    devpath: String,
    handlers: [Option<Handler>; EVENT_TYPE_COUNT],
    codec: Box<dyn Codec>,
    transport: Box<dyn Transport>,
}

impl Grid {
    /// Open the device at `path` over an already-opened transport, using the
    /// built-in codec registry.
    ///
    /// Paths beginning with `/` are treated as serial devices: the
    /// transport's probed serial picks the protocol family and dimensions
    /// from the device map. Anything else is treated as a network URL and
    /// resolves to the OSC family unconditionally.
    pub fn open(path: &str, transport: impl Transport + 'static) -> Result<Self> {
        Self::open_with(&CodecRegistry::default(), path, transport)
    }

    /// Open with a caller-supplied registry, allowing externally provided
    /// protocol families.
    pub fn open_with(
        registry: &CodecRegistry,
        path: &str,
        transport: impl Transport + 'static,
    ) -> Result<Self> {
        if path.is_empty() {
            return Err(Error::InvalidArgument("device path is empty"));
        }

        let mut transport: Box<dyn Transport> = Box::new(transport);

        let (family, serial, (rows, cols)) = if path.starts_with('/') {
            let serial = match transport.serial() {
                Some(serial) => serial.to_owned(),
                None => {
                    return Err(Error::TransportOpen(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "transport reported no serial identifier",
                    )))
                }
            };

            match device::lookup_serial(&serial) {
                Some(entry) => {
                    debug!(serial, model = entry.name, family = entry.family, "resolved device");
                    (entry.family, Some(serial), (entry.rows, entry.cols))
                }
                None => {
                    debug!(serial, family = device::DEFAULT_FAMILY, "unrecognized serial, using default family");
                    (device::DEFAULT_FAMILY, Some(serial), DEFAULT_DIMENSIONS)
                }
            }
        } else {
            debug!(path, family = device::OSC_FAMILY, "network address, skipping probe");
            (device::OSC_FAMILY, None, DEFAULT_DIMENSIONS)
        };

        let mut codec = registry.resolve(family)?;

        let geom = Geometry {
            rows,
            cols,
            orientation: Orientation::default(),
        };
        // Failure here drops the codec and the transport before returning,
        // so nothing stays half-acquired.
        codec.open(&geom, transport.as_mut(), path)?;

        Ok(Self {
            rows,
            cols,
            orientation: geom.orientation,
            serial,
            devpath: path.to_owned(),
            handlers: [None, None, None],
            codec,
            transport,
        })
    }

    /// Tear the device down, surfacing any codec or transport close error.
    ///
    /// Dropping the handle releases the transport resource implicitly; this
    /// exists for callers who care about teardown failures.
    pub fn close(mut self) -> Result<()> {
        debug!(devpath = %self.devpath, "closing device");
        let geom = self.geometry();
        self.codec.close(&geom, self.transport.as_mut())?;
        self.transport.close().map_err(Error::TransportIo)
    }

    /// Row count as the caller sees it: swapped with the column count when
    /// the active orientation exchanges the two axes.
    pub fn rows(&self) -> u8 {
        if self.orientation.flags().swap_rows_cols {
            self.cols
        } else {
            self.rows
        }
    }

    /// Column count as the caller sees it; see [`rows`](Self::rows).
    pub fn cols(&self) -> u8 {
        if self.orientation.flags().swap_rows_cols {
            self.rows
        } else {
            self.cols
        }
    }

    /// The active cable orientation.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Change the cable orientation. Affects every subsequent LED call and
    /// decoded event; nothing is retransmitted.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    /// Serial identifier probed at open time, for serial-transport devices.
    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    /// The path or URL this device was opened with.
    pub fn devpath(&self) -> &str {
        &self.devpath
    }

    /// Register `handler` for one kind of event, replacing any previous
    /// handler for that kind.
    ///
    /// Raw ordinals coming from outside the type system are validated at the
    /// [`EventType::from_ordinal`] boundary.
    pub fn register_handler(&mut self, event_type: EventType, handler: impl FnMut(&Event) + 'static) {
        self.handlers[event_type as usize] = Some(Box::new(handler));
    }

    /// Remove the handler for one kind of event. Events of that kind are
    /// dropped silently afterwards.
    pub fn unregister_handler(&mut self, event_type: EventType) {
        self.handlers[event_type as usize] = None;
    }

    /// Decode at most one pending event without dispatching it.
    ///
    /// Returns `Ok(None)` immediately when the transport has no complete
    /// frame queued; never blocks.
    pub fn poll_event(&mut self) -> Result<Option<Event>> {
        let geom = self.geometry();
        self.codec.next_event(&geom, self.transport.as_mut())
    }

    /// Decode and dispatch at most one pending event.
    ///
    /// Returns whether an event was decoded. An event whose slot has no
    /// handler still counts as handled; it is dropped silently.
    pub fn handle_next(&mut self) -> Result<bool> {
        match self.poll_event()? {
            Some(event) => {
                self.dispatch(&event);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Block forever, dispatching events as the transport produces them.
    ///
    /// This is the core's only suspension point. There is no internal
    /// cancellation or timeout: interrupting the wait is the surrounding
    /// process's business (typically a signal), and any error from the
    /// readiness wait or from decoding terminates the loop.
    pub fn run_event_loop(&mut self) -> Result<()> {
        loop {
            self.transport.wait_readable().map_err(Error::TransportIo)?;
            if let Some(event) = self.poll_event()? {
                self.dispatch(&event);
            }
        }
    }

    /// Drive every LED to one state.
    pub fn clear(&mut self, status: ClearStatus) -> Result<()> {
        let geom = self.geometry();
        self.codec.clear(&geom, self.transport.as_mut(), status)
    }

    /// Set global LED brightness (0-15 for the 40h family).
    pub fn intensity(&mut self, level: u8) -> Result<()> {
        let geom = self.geometry();
        self.codec.intensity(&geom, self.transport.as_mut(), level)
    }

    /// Switch the device operating mode.
    pub fn mode(&mut self, mode: GridMode) -> Result<()> {
        let geom = self.geometry();
        self.codec.mode(&geom, self.transport.as_mut(), mode)
    }

    /// Light the LED at canonical `(x, y)`.
    pub fn led_on(&mut self, x: u8, y: u8) -> Result<()> {
        let geom = self.geometry();
        self.codec.led_on(&geom, self.transport.as_mut(), x, y)
    }

    /// Unlight the LED at canonical `(x, y)`.
    pub fn led_off(&mut self, x: u8, y: u8) -> Result<()> {
        let geom = self.geometry();
        self.codec.led_off(&geom, self.transport.as_mut(), x, y)
    }

    /// Set a whole canonical row from an 8-bit mask (bit 0 is x = 0).
    pub fn led_row(&mut self, row: u8, bits: u8) -> Result<()> {
        let geom = self.geometry();
        self.codec.led_row(&geom, self.transport.as_mut(), row, bits)
    }

    /// Set a whole canonical column from an 8-bit mask (bit 0 is y = 0).
    pub fn led_col(&mut self, col: u8, bits: u8) -> Result<()> {
        let geom = self.geometry();
        self.codec.led_col(&geom, self.transport.as_mut(), col, bits)
    }

    /// Set one 8x8 quadrant from a row-major frame, one byte per row.
    pub fn led_frame(&mut self, quadrant: u8, frame: &[u8; 8]) -> Result<()> {
        let geom = self.geometry();
        self.codec
            .led_frame(&geom, self.transport.as_mut(), quadrant, frame)
    }

    fn geometry(&self) -> Geometry {
        Geometry {
            rows: self.rows,
            cols: self.cols,
            orientation: self.orientation,
        }
    }

    fn dispatch(&mut self, event: &Event) {
        // An empty slot means "drop the event silently". A handler that
        // panics is not caught here; that is the caller's policy call.
        if let Some(handler) = self.handlers[event.event_type as usize].as_mut() {
            handler(event);
        }
    }
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("orientation", &self.orientation)
            .field("serial", &self.serial)
            .field("devpath", &self.devpath)
            .field("family", &self.codec.family())
            .finish()
    }
}
