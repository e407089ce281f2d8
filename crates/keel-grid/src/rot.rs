//! Discrete 24-orientation rotation codec.
//!
//! One byte holds four 2-bit fields: quarter-turn amounts around X, Y
//! and Z (bits 0-1, 2-3, 4-5) and a facing selector naming the forward
//! axis (bits 6-7). Only codes built by [`Rotation::from_facing_and_variant`]
//! are canonical; arbitrary bytes are still accepted by the rotation
//! functions as intermediate values.

use keel_geom::Vec3;

use crate::face::{Face, FaceSet};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Rotation(u8);

impl Rotation {
    pub const ZERO: Rotation = Rotation(0);

    #[inline]
    pub const fn from_byte(byte: u8) -> Rotation {
        Rotation(byte)
    }

    #[inline]
    pub const fn to_byte(self) -> u8 {
        self.0
    }

    /// Canonical constructor: which face points forward, plus extra spin
    /// around that facing axis. `variant` wraps modulo 4, so UIs may feed
    /// a running scroll counter straight in.
    ///
    /// The Back case stores `(variant + 1) % 4` in the Z field; together
    /// with the inverted Z spin in [`rotate_faces`] this reproduces the
    /// reference orientations exactly.
    pub fn from_facing_and_variant(facing: Face, variant: i32) -> Rotation {
        let v = variant.rem_euclid(4) as u8;
        let (x, y, z, sel) = match facing {
            Face::Right => (v, 1, 0, 0),
            Face::Left => (v, 3, 0, 0),
            Face::Top => (1, v, 0, 1),
            Face::Bottom => (3, v, 0, 1),
            Face::Front => (0, 0, v, 2),
            Face::Back => (0, 2, (v + 1) & 3, 2),
        };
        Rotation(x | y << 2 | z << 4 | sel << 6)
    }

    /// Quarter-turn amount for axis 0..=2; axis 3 is the facing selector.
    #[inline]
    pub const fn amount(self, axis: u8) -> u8 {
        (self.0 >> (axis * 2)) & 3
    }

    /// Decodes the forward face of a canonical code. The selector picks
    /// the axis; the high bit of the perpendicular amount picks which of
    /// the two faces on it. Selector 3 means the byte was corrupted.
    pub fn facing_face(self) -> Face {
        let sel = self.amount(3);
        let neg = match sel {
            0 | 2 => self.amount(1) >> 1,
            1 => self.amount(0) >> 1,
            _ => panic!("corrupt rotation code {:#04x}: facing selector 3", self.0),
        };
        match Face::from_ordinal(sel * 2 + neg) {
            Some(face) => face,
            None => unreachable!(),
        }
    }

    /// Spin around the facing axis, inverse of `from_facing_and_variant`.
    /// Meaningful for canonical codes only.
    pub fn variant(self) -> u8 {
        match self.facing_face() {
            Face::Right | Face::Left => self.amount(0),
            Face::Top | Face::Bottom => self.amount(1),
            Face::Front => self.amount(2),
            Face::Back => (self.amount(2) + 3) & 3,
        }
    }

    /// Euler export for the render/physics sink, in degrees per axis.
    pub fn euler_degrees(self) -> Vec3 {
        Vec3::new(
            f32::from(self.amount(0)) * 90.0,
            f32::from(self.amount(1)) * 90.0,
            f32::from(self.amount(2)) * 90.0,
        )
    }
}

/// Quarter-turn face cycles per axis. Faces on the rotation axis itself
/// are untouched by that axis' step.
const CYCLES: [[Face; 4]; 3] = [
    [Face::Top, Face::Front, Face::Bottom, Face::Back],
    [Face::Front, Face::Right, Face::Back, Face::Left],
    [Face::Right, Face::Top, Face::Left, Face::Bottom],
];

fn cycle_faces(faces: FaceSet, axis: u8, turns: u8) -> FaceSet {
    let cycle = &CYCLES[axis as usize];
    let mut out = faces;
    for (i, &from) in cycle.iter().enumerate() {
        let to = cycle[(i + turns as usize) % 4];
        if faces.contains(from) {
            out.insert(to);
        } else {
            out.remove(to);
        }
    }
    out
}

#[inline]
fn rotate_axis_once(axis: u8, (x, y, z): (i32, i32, i32)) -> (i32, i32, i32) {
    match axis {
        0 => (x, -z, y),
        1 => (z, y, -x),
        _ => (-y, x, z),
    }
}

/// Runs the rotation's permutation steps in codec order: the two
/// non-facing axes first, then the spin around the facing axis. A
/// Z-facing spin turns the inverse way; see `from_facing_and_variant`.
/// Faces and integer offsets are driven through the same sequence so
/// rotated cells and rotated connect-faces can never disagree.
fn apply_steps<T>(code: Rotation, state: T, mut step: impl FnMut(T, u8, u8) -> T) -> T {
    let sel = code.amount(3);
    let mut s = state;
    for axis in 0..3u8 {
        if axis == sel {
            continue;
        }
        let amt = code.amount(axis);
        if amt != 0 {
            s = step(s, axis, amt);
        }
    }
    if sel < 3 {
        let amt = code.amount(sel);
        let turns = if sel == 2 { (4 - amt) & 3 } else { amt };
        if turns != 0 {
            s = step(s, sel, turns);
        }
    }
    s
}

/// Permutes a face set by a rotation code. Code zero, the empty set and
/// the full set are rotation-invariant and short-circuit.
pub fn rotate_faces(faces: FaceSet, code: Rotation) -> FaceSet {
    if code.to_byte() == 0 || faces == FaceSet::NONE || faces == FaceSet::ALL {
        return faces;
    }
    apply_steps(code, faces, cycle_faces)
}

/// Rotates a local integer cell offset through the same step sequence
/// as [`rotate_faces`].
pub fn rotate_offset(offset: (i32, i32, i32), code: Rotation) -> (i32, i32, i32) {
    apply_steps(code, offset, |mut o, axis, turns| {
        for _ in 0..turns {
            o = rotate_axis_once(axis, o);
        }
        o
    })
}
