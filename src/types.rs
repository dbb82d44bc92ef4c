//! Common types shared across the opengrid crate
//!
//! This module contains the coordinate, orientation, and event types that are
//! used by the device handle, the orientation engine, and the protocol codecs.

use crate::error::Error;

/// Number of event-type ordinals the callback table accommodates.
pub const EVENT_TYPE_COUNT: usize = 3;

/// Cable orientation of the device: which physical edge the connector is on,
/// and therefore how canonical coordinates relate to physical ones.
///
/// `Left` is the straight (identity) orientation and the default for newly
/// opened devices. The other three variants correspond to the device being
/// cabled with its connector rotated by 90, 180, or 270 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Connector on the left edge - the identity orientation.
    #[default]
    Left,
    /// Connector on the bottom edge (90 degrees).
    Bottom,
    /// Connector on the right edge (180 degrees).
    Right,
    /// Connector on the top edge (270 degrees).
    Top,
}

/// Kind of input event a grid device can produce.
///
/// The ordinal values match the wire-level event numbering and index the
/// handle's callback table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EventType {
    /// A button was pressed.
    ButtonDown = 0,
    /// A button was released.
    ButtonUp = 1,
    /// Auxiliary input (tilt/ADC). Reserved: no codec currently produces it.
    Aux = 2,
}

impl EventType {
    /// Validate a raw event-type ordinal.
    ///
    /// Ordinals above the highest defined event kind are rejected with
    /// [`Error::InvalidEventType`].
    pub fn from_ordinal(ordinal: u8) -> Result<Self, Error> {
        match ordinal {
            0 => Ok(EventType::ButtonDown),
            1 => Ok(EventType::ButtonUp),
            2 => Ok(EventType::Aux),
            other => Err(Error::InvalidEventType(other)),
        }
    }
}

impl TryFrom<u8> for EventType {
    type Error = Error;

    fn try_from(ordinal: u8) -> Result<Self, Error> {
        EventType::from_ordinal(ordinal)
    }
}

/// A decoded input event in canonical coordinates.
///
/// Events are produced by a codec's decode path and consumed immediately by
/// dispatch; they are not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    /// What happened.
    pub event_type: EventType,
    /// Canonical x coordinate.
    pub x: u8,
    /// Canonical y coordinate.
    pub y: u8,
}

/// Target state for a whole-device clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearStatus {
    /// All LEDs off.
    Off,
    /// All LEDs on.
    On,
}

/// Device operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridMode {
    /// Normal operation.
    Normal,
    /// All-LED test pattern.
    Test,
    /// Low-power shutdown.
    Shutdown,
}

/// Geometry of an open device as the codecs see it: fixed dimensions plus the
/// currently active cable orientation.
///
/// Coordinates crossing the codec boundary are canonical; the codec uses this
/// record to rotate them into physical space (and back) on the wire paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Physical row count, fixed for the handle's lifetime.
    pub rows: u8,
    /// Physical column count, fixed for the handle's lifetime.
    pub cols: u8,
    /// Active cable orientation.
    pub orientation: Orientation,
}
