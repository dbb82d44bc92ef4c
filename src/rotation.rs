//! Orientation engine: coordinate and bit-matrix rotation
//!
//! Grid devices can be cabled with their connector on any of four edges, so
//! the same physical cell has four possible canonical addresses. This module
//! rotates single coordinates between canonical and physical space and
//! rotates whole 8x8 LED frames, packed row-major into 64 bits, using
//! branch-free butterfly networks of masked XOR-swaps (see Hacker's Delight,
//! section 7-3, "Transposing a Bit Matrix").

use crate::types::{Geometry, Orientation};

/// How single-row and single-column writes must be reordered for an
/// orientation before they reach the wire.
///
/// Some orientations turn "set a row" into "set a column" at the wire level,
/// and some additionally need the 8-bit line mask reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientationFlags {
    /// Row and column addressing swap roles on the wire.
    pub swap_rows_cols: bool,
    /// Row masks must be bit-reversed.
    pub reverse_row_bits: bool,
    /// Column masks must be bit-reversed.
    pub reverse_col_bits: bool,
}

const LEFT_FLAGS: OrientationFlags = OrientationFlags {
    swap_rows_cols: false,
    reverse_row_bits: false,
    reverse_col_bits: false,
};

const BOTTOM_FLAGS: OrientationFlags = OrientationFlags {
    swap_rows_cols: true,
    reverse_row_bits: false,
    reverse_col_bits: true,
};

const RIGHT_FLAGS: OrientationFlags = OrientationFlags {
    swap_rows_cols: false,
    reverse_row_bits: true,
    reverse_col_bits: true,
};

const TOP_FLAGS: OrientationFlags = OrientationFlags {
    swap_rows_cols: true,
    reverse_row_bits: true,
    reverse_col_bits: false,
};

/// Physical quadrant a logical quadrant lands in, per orientation.
const BOTTOM_QUAD_MAP: [u8; 4] = [1, 3, 0, 2];
const TOP_QUAD_MAP: [u8; 4] = [2, 0, 3, 1];

/// Wraparound-safe modulo: reduces a possibly-negative intermediate into
/// `0..modulus`.
///
/// Canonical coordinates can exceed the configured dimensions when a larger
/// device is deliberately addressed through a smaller logical space; plain
/// unsigned subtraction would wrap around into huge values there. Keeping the
/// arithmetic signed and reducing with `rem_euclid` makes that case merely
/// produce an in-range coordinate instead.
#[inline]
fn wrap_coord(value: i16, modulus: i16) -> u8 {
    value.rem_euclid(modulus) as u8
}

/// One masked XOR-swap stage of a butterfly network: swaps the bit pairs
/// `(p, p - shift)` for every bit position `p` set in `mask`.
#[inline]
fn delta_swap(x: u64, shift: u32, mask: u64) -> u64 {
    let t = (x ^ (x << shift)) & mask;
    x ^ t ^ (t >> shift)
}

impl Orientation {
    /// Line-write reordering flags for this orientation.
    pub fn flags(self) -> OrientationFlags {
        match self {
            Orientation::Left => LEFT_FLAGS,
            Orientation::Bottom => BOTTOM_FLAGS,
            Orientation::Right => RIGHT_FLAGS,
            Orientation::Top => TOP_FLAGS,
        }
    }

    /// Canonical to physical coordinate transform, applied before an LED
    /// command is encoded.
    pub fn rotate_out(self, geom: &Geometry, x: u8, y: u8) -> (u8, u8) {
        let (rows, cols) = (i16::from(geom.rows), i16::from(geom.cols));
        let (x, y) = (i16::from(x), i16::from(y));

        match self {
            Orientation::Left => (x as u8, y as u8),
            Orientation::Bottom => (wrap_coord(cols - 1 - y, cols), x as u8),
            Orientation::Right => {
                (wrap_coord(rows - 1 - x, rows), wrap_coord(cols - 1 - y, cols))
            }
            Orientation::Top => (y as u8, wrap_coord(rows - 1 - x, rows)),
        }
    }

    /// Physical to canonical coordinate transform, applied after a button
    /// event is decoded. Exact inverse of [`rotate_out`](Self::rotate_out)
    /// over the configured dimensions.
    pub fn rotate_in(self, geom: &Geometry, x: u8, y: u8) -> (u8, u8) {
        let (rows, cols) = (i16::from(geom.rows), i16::from(geom.cols));
        let (x, y) = (i16::from(x), i16::from(y));

        match self {
            Orientation::Left => (x as u8, y as u8),
            Orientation::Bottom => (y as u8, wrap_coord(cols - 1 - x, cols)),
            Orientation::Right => {
                (wrap_coord(rows - 1 - x, rows), wrap_coord(cols - 1 - y, cols))
            }
            Orientation::Top => (wrap_coord(rows - 1 - y, rows), x as u8),
        }
    }

    /// Rotate a row-major 8x8 frame in place and remap its quadrant index.
    ///
    /// Byte `i` of `frame` is row `i`; bit `j` within a byte is column `j`.
    /// The non-identity transforms run in six (or, for the 180 degree case,
    /// one) constant-time steps over the 64-bit representation instead of
    /// looping over 64 cells, and each equals the corresponding cell-by-cell
    /// rotation. Applying the same orientation's transform four times yields
    /// the original frame.
    pub fn rotate_frame(self, quadrant: u8, frame: &mut [u8; 8]) -> u8 {
        let quadrant = quadrant & 0x3;

        match self {
            Orientation::Left => quadrant,
            Orientation::Bottom => {
                // 90 degree clockwise rotation: transpose stages at bit,
                // 2-bit-block, and 4-bit-block granularity.
                let mut x = u64::from_le_bytes(*frame);
                x = delta_swap(x, 8, 0xFF00_FF00_FF00_FF00);
                x = delta_swap(x, 7, 0x5500_5500_5500_5500);
                x = delta_swap(x, 16, 0xFFFF_0000_FFFF_0000);
                x = delta_swap(x, 14, 0x3333_0000_3333_0000);
                x = delta_swap(x, 32, 0xFFFF_FFFF_0000_0000);
                x = delta_swap(x, 28, 0x0F0F_0F0F_0000_0000);
                *frame = x.to_le_bytes();

                BOTTOM_QUAD_MAP[quadrant as usize]
            }
            Orientation::Right => {
                // 180 degrees is a whole-integer bit reversal.
                let x = u64::from_le_bytes(*frame).reverse_bits();
                *frame = x.to_le_bytes();

                (3 - quadrant) & 0x3
            }
            Orientation::Top => {
                // 90 degree counter-clockwise rotation.
                let mut x = u64::from_le_bytes(*frame);
                x = delta_swap(x, 8, 0xFF00_FF00_FF00_FF00);
                x = delta_swap(x, 9, 0xAA00_AA00_AA00_AA00);
                x = delta_swap(x, 16, 0xFFFF_0000_FFFF_0000);
                x = delta_swap(x, 18, 0xCCCC_0000_CCCC_0000);
                x = delta_swap(x, 32, 0xFFFF_FFFF_0000_0000);
                x = delta_swap(x, 36, 0xF0F0_F0F0_0000_0000);
                *frame = x.to_le_bytes();

                TOP_QUAD_MAP[quadrant as usize]
            }
        }
    }
}
