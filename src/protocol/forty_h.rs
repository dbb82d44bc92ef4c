//! 40h protocol codec
//!
//! The 40h family (monome 40h and arduinome clones) is the simplest wire
//! format in the crate: every command and every event is a fixed 2-byte
//! frame. Byte 0 carries a 4-bit opcode in the high nibble and, for row and
//! column writes, a 3-bit address in the low nibble; byte 1 carries the data
//! payload (a packed coordinate pair, a line mask, or a brightness level).

use tracing::{trace, warn};

use super::Codec;
use crate::error::{Error, Result};
use crate::transport::Transport;
use crate::types::{ClearStatus, Event, EventType, Geometry, GridMode};

/// Length of every 40h wire frame, in either direction.
const FRAME_LEN: usize = 2;

// Opcodes, pre-shifted into the high nibble of byte 0.
const OP_BUTTON_DOWN: u8 = 0x00;
const OP_BUTTON_UP: u8 = 0x10;
const OP_LED_ON: u8 = 0x20;
const OP_LED_OFF: u8 = 0x30;
const OP_LED_ROW: u8 = 0x40;
const OP_LED_COL: u8 = 0x50;
const OP_INTENSITY: u8 = 0x60;
const OP_AUX_INPUT: u8 = 0xE0;

/// Which axis a line write logically addresses before orientation is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Row,
    Col,
}

/// Codec for the 40h protocol family.
#[derive(Debug, Default)]
pub struct FortyH;

impl FortyH {
    pub fn new() -> Self {
        Self
    }

    /// Registry constructor.
    pub fn boxed() -> Box<dyn Codec> {
        Box::new(Self::new())
    }

    /// Transmit one wire frame, treating a short write as an i/o failure.
    fn write_frame(io: &mut dyn Transport, frame: [u8; FRAME_LEN]) -> Result<()> {
        trace!(frame = ?frame, "40h tx");
        let written = io.write(&frame).map_err(Error::TransportIo)?;
        if written != frame.len() {
            return Err(Error::short_transfer(frame.len(), written));
        }
        Ok(())
    }

    /// Shared encode path for single LED on/off commands.
    fn led_state(
        geom: &Geometry,
        io: &mut dyn Transport,
        opcode: u8,
        x: u8,
        y: u8,
    ) -> Result<()> {
        let (x, y) = geom.orientation.rotate_out(geom, x, y);
        Self::write_frame(io, [opcode, ((x & 0x7) << 4) | (y & 0x7)])
    }

    /// Shared encode path for row and column writes.
    ///
    /// The line index is rotated as a coordinate pair and the row or column
    /// component of the result is used as the wire address. Orientations
    /// whose flags request it get the mask bit-reversed and the row/column
    /// opcodes exchanged, because a rotated "set a row" reaches the hardware
    /// as "set a column".
    fn led_line(
        geom: &Geometry,
        io: &mut dyn Transport,
        kind: LineKind,
        index: u8,
        bits: u8,
    ) -> Result<()> {
        let flags = geom.orientation.flags();
        let (rotated_x, rotated_y) = geom.orientation.rotate_out(geom, index, index);

        let (mut opcode, address, data) = match kind {
            LineKind::Row => {
                let data = if flags.reverse_row_bits {
                    bits.reverse_bits()
                } else {
                    bits
                };
                (OP_LED_ROW, rotated_x, data)
            }
            LineKind::Col => {
                let data = if flags.reverse_col_bits {
                    bits.reverse_bits()
                } else {
                    bits
                };
                (OP_LED_COL, rotated_y, data)
            }
        };

        if flags.swap_rows_cols {
            opcode = if opcode == OP_LED_ROW {
                OP_LED_COL
            } else {
                OP_LED_ROW
            };
        }

        Self::write_frame(io, [opcode | (address & 0x7), data])
    }
}

impl Codec for FortyH {
    fn family(&self) -> &'static str {
        "40h"
    }

    fn open(&mut self, _geom: &Geometry, _io: &mut dyn Transport, _path: &str) -> Result<()> {
        // The 40h needs no session handshake beyond the open transport.
        Ok(())
    }

    fn close(&mut self, _geom: &Geometry, _io: &mut dyn Transport) -> Result<()> {
        Ok(())
    }

    fn clear(
        &mut self,
        _geom: &Geometry,
        io: &mut dyn Transport,
        status: ClearStatus,
    ) -> Result<()> {
        let fill = match status {
            ClearStatus::Off => 0x00,
            ClearStatus::On => 0xFF,
        };

        // A clear is orientation-independent, so the eight row writes go out
        // raw instead of through the rotating line path.
        for row in 0..8 {
            Self::write_frame(io, [OP_LED_ROW | row, fill])?;
        }
        Ok(())
    }

    fn intensity(&mut self, _geom: &Geometry, io: &mut dyn Transport, level: u8) -> Result<()> {
        Self::write_frame(io, [OP_INTENSITY, level & 0x0F])
    }

    fn mode(&mut self, _geom: &Geometry, _io: &mut dyn Transport, _mode: GridMode) -> Result<()> {
        // The 40h splits mode switching across two commands and needs extra
        // per-handle state to track them; not wired up yet.
        Ok(())
    }

    fn led_on(&mut self, geom: &Geometry, io: &mut dyn Transport, x: u8, y: u8) -> Result<()> {
        Self::led_state(geom, io, OP_LED_ON, x, y)
    }

    fn led_off(&mut self, geom: &Geometry, io: &mut dyn Transport, x: u8, y: u8) -> Result<()> {
        Self::led_state(geom, io, OP_LED_OFF, x, y)
    }

    fn led_row(
        &mut self,
        geom: &Geometry,
        io: &mut dyn Transport,
        row: u8,
        bits: u8,
    ) -> Result<()> {
        Self::led_line(geom, io, LineKind::Row, row, bits)
    }

    fn led_col(
        &mut self,
        geom: &Geometry,
        io: &mut dyn Transport,
        col: u8,
        bits: u8,
    ) -> Result<()> {
        Self::led_line(geom, io, LineKind::Col, col, bits)
    }

    fn led_frame(
        &mut self,
        geom: &Geometry,
        io: &mut dyn Transport,
        quadrant: u8,
        frame: &[u8; 8],
    ) -> Result<()> {
        let mut rotated = *frame;
        let _quadrant = geom.orientation.rotate_frame(quadrant, &mut rotated);

        // The 40h is a single-quadrant device, so the remapped quadrant index
        // never alters addressing; the frame decomposes into eight row writes
        // through the regular orientation-aware line path.
        for (row, bits) in rotated.iter().enumerate() {
            Self::led_line(geom, io, LineKind::Row, row as u8, *bits)?;
        }
        Ok(())
    }

    fn next_event(&mut self, geom: &Geometry, io: &mut dyn Transport) -> Result<Option<Event>> {
        let mut frame = [0u8; FRAME_LEN];
        let read = io.read(&mut frame).map_err(Error::TransportIo)?;

        if read == 0 {
            return Ok(None);
        }
        if read < frame.len() {
            return Err(Error::short_transfer(frame.len(), read));
        }

        match frame[0] & 0xF0 {
            opcode @ (OP_BUTTON_DOWN | OP_BUTTON_UP) => {
                let event_type = if opcode == OP_BUTTON_DOWN {
                    EventType::ButtonDown
                } else {
                    EventType::ButtonUp
                };

                let (x, y) = geom
                    .orientation
                    .rotate_in(geom, frame[1] >> 4, frame[1] & 0xF);

                trace!(?event_type, x, y, "40h rx");
                Ok(Some(Event { event_type, x, y }))
            }
            OP_AUX_INPUT => {
                // Reserved event kind: recognized but never surfaced.
                trace!("40h aux input frame dropped");
                Ok(None)
            }
            opcode => {
                warn!(opcode = opcode >> 4, "40h rx: unrecognized frame dropped");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;
    use crate::types::Orientation;

    fn geom(orientation: Orientation) -> Geometry {
        Geometry {
            rows: 8,
            cols: 8,
            orientation,
        }
    }

    #[test]
    fn led_on_packs_coordinates_into_nibbles() {
        let mut codec = FortyH::new();
        let mut io = MockTransport::new();

        codec.led_on(&geom(Orientation::Left), &mut io, 1, 2).unwrap();
        assert_eq!(io.written(), vec![OP_LED_ON, 0x12]);

        io.clear_written();
        codec.led_off(&geom(Orientation::Left), &mut io, 7, 0).unwrap();
        assert_eq!(io.written(), vec![OP_LED_OFF, 0x70]);
    }

    #[test]
    fn led_on_rotates_before_encoding() {
        let mut codec = FortyH::new();
        let mut io = MockTransport::new();

        // Top orientation: (x, y) -> (y, rows-1-x).
        codec.led_on(&geom(Orientation::Top), &mut io, 1, 2).unwrap();
        assert_eq!(io.written(), vec![OP_LED_ON, 0x26]);
    }

    #[test]
    fn straight_row_write_is_unmodified() {
        let mut codec = FortyH::new();
        let mut io = MockTransport::new();

        codec
            .led_row(&geom(Orientation::Left), &mut io, 0, 0b1000_0001)
            .unwrap();
        assert_eq!(io.written(), vec![OP_LED_ROW, 0b1000_0001]);
    }

    #[test]
    fn bottom_column_write_reverses_the_mask() {
        let mut codec = FortyH::new();
        let mut io = MockTransport::new();

        // Bottom carries the column-bit-reversal flag; a non-palindromic mask
        // shows the reversal. Row/col swap turns the command into a row write.
        codec
            .led_col(&geom(Orientation::Bottom), &mut io, 0, 0b0000_0011)
            .unwrap();
        let written = io.written();
        assert_eq!(written[1], 0b1100_0000);
        assert_eq!(written[0] & 0xF0, OP_LED_ROW);
    }

    #[test]
    fn bottom_row_write_becomes_a_column_write() {
        let mut codec = FortyH::new();
        let mut io = MockTransport::new();

        // Row 2 under Bottom lands at wire column 5 (cols-1-2); Bottom does
        // not reverse row masks.
        codec
            .led_row(&geom(Orientation::Bottom), &mut io, 2, 0b0000_0011)
            .unwrap();
        assert_eq!(io.written(), vec![OP_LED_COL | 5, 0b0000_0011]);
    }

    #[test]
    fn intensity_masks_to_a_nibble() {
        let mut codec = FortyH::new();
        let mut io = MockTransport::new();

        codec.intensity(&geom(Orientation::Left), &mut io, 0x1F).unwrap();
        assert_eq!(io.written(), vec![OP_INTENSITY, 0x0F]);
    }

    #[test]
    fn clear_fills_all_eight_rows() {
        let mut codec = FortyH::new();
        let mut io = MockTransport::new();

        codec
            .clear(&geom(Orientation::Left), &mut io, ClearStatus::On)
            .unwrap();
        let written = io.written();
        assert_eq!(written.len(), 16);
        for row in 0..8 {
            assert_eq!(written[row * 2], OP_LED_ROW | row as u8);
            assert_eq!(written[row * 2 + 1], 0xFF);
        }
    }

    #[test]
    fn straight_frame_decomposes_into_row_writes() {
        let mut codec = FortyH::new();
        let mut io = MockTransport::new();
        let frame = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80];

        codec
            .led_frame(&geom(Orientation::Left), &mut io, 0, &frame)
            .unwrap();
        let written = io.written();
        assert_eq!(written.len(), 16);
        for row in 0..8 {
            assert_eq!(written[row * 2], OP_LED_ROW | row as u8);
            assert_eq!(written[row * 2 + 1], frame[row]);
        }
    }

    #[test]
    fn rotated_frame_still_emits_eight_line_writes() {
        let mut codec = FortyH::new();
        let mut io = MockTransport::new();

        codec
            .led_frame(&geom(Orientation::Bottom), &mut io, 0, &[0xAA; 8])
            .unwrap();
        assert_eq!(io.written().len(), 16);
    }

    #[test]
    fn button_frames_decode_to_canonical_events() {
        let mut codec = FortyH::new();
        let mut io = MockTransport::new();

        io.queue_incoming(&[OP_BUTTON_DOWN, 0x34]);
        let event = codec
            .next_event(&geom(Orientation::Left), &mut io)
            .unwrap()
            .expect("a queued frame should decode");
        assert_eq!(
            event,
            Event {
                event_type: EventType::ButtonDown,
                x: 3,
                y: 4
            }
        );

        // Bottom inbound: (x, y) -> (y, cols-1-x).
        io.queue_incoming(&[OP_BUTTON_UP, 0x34]);
        let event = codec
            .next_event(&geom(Orientation::Bottom), &mut io)
            .unwrap()
            .unwrap();
        assert_eq!(
            event,
            Event {
                event_type: EventType::ButtonUp,
                x: 4,
                y: 4
            }
        );
    }

    #[test]
    fn decode_and_encode_pack_nibbles_independently() {
        // led_on(3, 4) transmits (x<<4)|y; a button frame carrying the same
        // payload decodes back to (3, 4). The two paths share nothing beyond
        // the packing convention, so both directions are pinned separately.
        let mut codec = FortyH::new();
        let mut io = MockTransport::new();

        codec.led_on(&geom(Orientation::Left), &mut io, 3, 4).unwrap();
        assert_eq!(io.written(), vec![OP_LED_ON, 0x34]);

        io.queue_incoming(&[OP_BUTTON_DOWN, 0x34]);
        let event = codec
            .next_event(&geom(Orientation::Left), &mut io)
            .unwrap()
            .unwrap();
        assert_eq!((event.x, event.y), (3, 4));
    }

    #[test]
    fn aux_and_unknown_frames_are_dropped() {
        let mut codec = FortyH::new();
        let mut io = MockTransport::new();

        io.queue_incoming(&[OP_AUX_INPUT, 0x00]);
        assert!(codec
            .next_event(&geom(Orientation::Left), &mut io)
            .unwrap()
            .is_none());

        io.queue_incoming(&[0x90, 0x12]);
        assert!(codec
            .next_event(&geom(Orientation::Left), &mut io)
            .unwrap()
            .is_none());
    }

    #[test]
    fn empty_transport_yields_no_event() {
        let mut codec = FortyH::new();
        let mut io = MockTransport::new();

        assert!(codec
            .next_event(&geom(Orientation::Left), &mut io)
            .unwrap()
            .is_none());

        // A single queued byte is less than a frame: still no event, and
        // the byte stays queued until its partner arrives.
        io.queue_incoming(&[OP_BUTTON_DOWN]);
        assert!(codec
            .next_event(&geom(Orientation::Left), &mut io)
            .unwrap()
            .is_none());
    }

    #[test]
    fn torn_reads_surface_as_io_failures() {
        let mut codec = FortyH::new();
        let mut io = MockTransport::new();

        // A transport that hands over one byte of a two-byte frame has torn
        // the frame; that is a fault, not a "try again later".
        io.queue_incoming(&[OP_BUTTON_DOWN, 0x12]);
        io.limit_reads(1);
        let err = codec
            .next_event(&geom(Orientation::Left), &mut io)
            .unwrap_err();
        assert!(matches!(err, Error::TransportIo(_)));
    }

    #[test]
    fn short_writes_surface_as_io_failures() {
        let mut codec = FortyH::new();
        let mut io = MockTransport::new();
        io.limit_writes(1);

        let err = codec
            .led_on(&geom(Orientation::Left), &mut io, 0, 0)
            .unwrap_err();
        assert!(matches!(err, Error::TransportIo(_)));
    }
}
