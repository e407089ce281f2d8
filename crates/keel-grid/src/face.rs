use core::ops::{BitOr, BitOrAssign};

use keel_geom::Vec3;

/// One of the six cube faces. Paired faces differ only in the low bit,
/// so `opposite` is an XOR.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Face {
    Right = 0,
    Left = 1,
    Top = 2,
    Bottom = 3,
    Front = 4,
    Back = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::Right,
        Face::Left,
        Face::Top,
        Face::Bottom,
        Face::Front,
        Face::Back,
    ];

    #[inline]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    pub const fn from_ordinal(ord: u8) -> Option<Face> {
        match ord {
            0 => Some(Face::Right),
            1 => Some(Face::Left),
            2 => Some(Face::Top),
            3 => Some(Face::Bottom),
            4 => Some(Face::Front),
            5 => Some(Face::Back),
            _ => None,
        }
    }

    #[inline]
    pub const fn bit(self) -> u8 {
        1 << self as u8
    }

    #[inline]
    pub const fn opposite(self) -> Face {
        match Face::from_ordinal(self as u8 ^ 1) {
            Some(f) => f,
            None => unreachable!(),
        }
    }

    /// Axis index: 0 = X, 1 = Y, 2 = Z.
    #[inline]
    pub const fn axis(self) -> u8 {
        self as u8 >> 1
    }

    /// Unit grid step out of this face.
    #[inline]
    pub const fn dir(self) -> (i32, i32, i32) {
        match self {
            Face::Right => (1, 0, 0),
            Face::Left => (-1, 0, 0),
            Face::Top => (0, 1, 0),
            Face::Bottom => (0, -1, 0),
            Face::Front => (0, 0, 1),
            Face::Back => (0, 0, -1),
        }
    }

    /// Rounds a direction vector to the nearest integer step and maps a
    /// single dominant axis to its face. Anything that does not round to
    /// exactly one unit step is `None`.
    pub fn from_dir(v: Vec3) -> Option<Face> {
        let x = v.x.round() as i32;
        let y = v.y.round() as i32;
        let z = v.z.round() as i32;
        match (x, y, z) {
            (1, 0, 0) => Some(Face::Right),
            (-1, 0, 0) => Some(Face::Left),
            (0, 1, 0) => Some(Face::Top),
            (0, -1, 0) => Some(Face::Bottom),
            (0, 0, 1) => Some(Face::Front),
            (0, 0, -1) => Some(Face::Back),
            _ => None,
        }
    }
}

/// Bit set over the six faces, bits 0..=5 in `Face` ordinal order.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct FaceSet(u8);

impl FaceSet {
    pub const NONE: FaceSet = FaceSet(0);
    pub const X: FaceSet = FaceSet(Face::Right.bit() | Face::Left.bit());
    pub const Y: FaceSet = FaceSet(Face::Top.bit() | Face::Bottom.bit());
    pub const Z: FaceSet = FaceSet(Face::Front.bit() | Face::Back.bit());
    pub const ALL: FaceSet = FaceSet(0b11_1111);

    #[inline]
    pub const fn from_bits(bits: u8) -> FaceSet {
        FaceSet(bits & Self::ALL.0)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn contains(self, face: Face) -> bool {
        self.0 & face.bit() != 0
    }

    #[inline]
    pub fn insert(&mut self, face: Face) {
        self.0 |= face.bit();
    }

    #[inline]
    pub fn remove(&mut self, face: Face) {
        self.0 &= !face.bit();
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// The face, if exactly one bit is set; multi-bit sets have no ordinal.
    pub const fn single_face(self) -> Option<Face> {
        if self.0.count_ones() == 1 {
            Face::from_ordinal(self.0.trailing_zeros() as u8)
        } else {
            None
        }
    }

    pub fn iter(self) -> impl Iterator<Item = Face> {
        Face::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

impl From<Face> for FaceSet {
    #[inline]
    fn from(face: Face) -> FaceSet {
        FaceSet(face.bit())
    }
}

impl BitOr for FaceSet {
    type Output = FaceSet;
    #[inline]
    fn bitor(self, rhs: FaceSet) -> FaceSet {
        FaceSet(self.0 | rhs.0)
    }
}

impl BitOrAssign for FaceSet {
    #[inline]
    fn bitor_assign(&mut self, rhs: FaceSet) {
        self.0 |= rhs.0;
    }
}

impl BitOr<Face> for FaceSet {
    type Output = FaceSet;
    #[inline]
    fn bitor(self, rhs: Face) -> FaceSet {
        FaceSet(self.0 | rhs.bit())
    }
}
