//! Protocol codec abstraction layer
//!
//! Every wire format a grid device can speak is packaged as a [`Codec`]: the
//! capability set the device handle is driven through. Codecs are looked up
//! once, at open time, in a [`CodecRegistry`] keyed by protocol-family name;
//! after that every public operation on the handle is a direct call into the
//! bound codec. New protocol families plug in through the registry without
//! touching the handle or event code.

pub mod forty_h;

use crate::error::{Error, Result};
use crate::transport::Transport;
use crate::types::{ClearStatus, Event, Geometry, GridMode};

/// Wire-format implementation for one protocol family.
///
/// Methods receive the handle's [`Geometry`] and its transport explicitly so
/// the handle can lend out its fields without aliasing itself. Coordinates
/// arriving here are canonical; rotation into physical space happens inside
/// the codec's encode and decode paths and is never visible to callers.
pub trait Codec {
    /// Protocol family identifier this codec serves.
    fn family(&self) -> &'static str;

    /// Protocol-level session setup after the transport has been opened.
    fn open(&mut self, geom: &Geometry, io: &mut dyn Transport, path: &str) -> Result<()>;

    /// Protocol-level session teardown before the transport is closed.
    fn close(&mut self, geom: &Geometry, io: &mut dyn Transport) -> Result<()>;

    /// Drive every LED to the given state.
    fn clear(&mut self, geom: &Geometry, io: &mut dyn Transport, status: ClearStatus)
        -> Result<()>;

    /// Set global LED brightness.
    fn intensity(&mut self, geom: &Geometry, io: &mut dyn Transport, level: u8) -> Result<()>;

    /// Switch the device operating mode.
    fn mode(&mut self, geom: &Geometry, io: &mut dyn Transport, mode: GridMode) -> Result<()>;

    /// Light a single LED at canonical `(x, y)`.
    fn led_on(&mut self, geom: &Geometry, io: &mut dyn Transport, x: u8, y: u8) -> Result<()>;

    /// Unlight a single LED at canonical `(x, y)`.
    fn led_off(&mut self, geom: &Geometry, io: &mut dyn Transport, x: u8, y: u8) -> Result<()>;

    /// Set a whole canonical row from an 8-bit mask.
    fn led_row(&mut self, geom: &Geometry, io: &mut dyn Transport, row: u8, bits: u8)
        -> Result<()>;

    /// Set a whole canonical column from an 8-bit mask.
    fn led_col(&mut self, geom: &Geometry, io: &mut dyn Transport, col: u8, bits: u8)
        -> Result<()>;

    /// Set an 8x8 quadrant from a row-major frame.
    fn led_frame(
        &mut self,
        geom: &Geometry,
        io: &mut dyn Transport,
        quadrant: u8,
        frame: &[u8; 8],
    ) -> Result<()>;

    /// Decode at most one pending event. Returns `Ok(None)` without blocking
    /// when the transport has no complete frame queued.
    fn next_event(&mut self, geom: &Geometry, io: &mut dyn Transport) -> Result<Option<Event>>;
}

/// Constructor for a codec instance, stored in the registry.
pub type CodecConstructor = fn() -> Box<dyn Codec>;

/// Registry mapping protocol-family names to codec constructors.
///
/// The default registry knows the families implemented by this crate; crates
/// providing additional families (the OSC network family, for instance)
/// register their constructors before opening devices.
pub struct CodecRegistry {
    entries: Vec<(&'static str, CodecConstructor)>,
}

impl CodecRegistry {
    /// An empty registry with no families at all.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a family. A later registration for the same name shadows the
    /// earlier one.
    pub fn register(&mut self, family: &'static str, constructor: CodecConstructor) {
        self.entries.insert(0, (family, constructor));
    }

    /// Construct a codec for `family`, or fail with
    /// [`Error::UnsupportedProtocol`] if the family is unknown.
    pub fn resolve(&self, family: &str) -> Result<Box<dyn Codec>> {
        self.entries
            .iter()
            .find(|(name, _)| *name == family)
            .map(|(_, constructor)| constructor())
            .ok_or_else(|| Error::UnsupportedProtocol(family.to_owned()))
    }
}

impl Default for CodecRegistry {
    /// Registry preloaded with the codecs built into this crate.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("40h", forty_h::FortyH::boxed);
        registry
    }
}
