//! Binary structure codecs.
//!
//! Two encodings exist and are not interchangeable. The record format
//! (one 64-bit word per real block) is the canonical peer-exchange
//! encoding; the compact format (38 bits per real block behind a count
//! header) is the on-disk file encoding. Both emit real blocks only:
//! part cells are re-derived from their parent's shape on load, and any
//! decode error aborts the whole load.
#![forbid(unsafe_code)]

use thiserror::Error;

use keel_blocks::{BlockId, BlockRegistry};
use keel_grid::{Face, GridPos, Rotation};
use keel_structure::{CompleteStructure, EditableStructure, Pose, StructureGraph};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("block ordinal {0} is not in the catalog")]
    UnknownBlock(u32),
    #[error(transparent)]
    OutOfBounds(#[from] keel_grid::BoundsError),
    #[error("cell {0} decoded twice")]
    Collision(GridPos),
    #[error("payload truncated")]
    Truncated,
    #[error("rotation field {0} is not a canonical orientation")]
    BadRotation(u8),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("block id {0} does not fit in 12 bits")]
    BlockIdTooWide(BlockId),
    #[error("rotation code {0:#04x} is not canonical")]
    NonCanonicalRotation(u8),
}

/// Bits per compact record: 12 id + 3x7 position + 5 rotation.
const COMPACT_RECORD_BITS: usize = 38;

/// Real blocks in deterministic (coordinate) order, the shared walk for
/// both encoders.
fn sorted_real_blocks(graph: &StructureGraph) -> Vec<(GridPos, BlockId, Rotation)> {
    let mut blocks: Vec<_> = graph
        .real_blocks()
        .map(|(pos, real)| (pos, real.block, real.rot))
        .collect();
    blocks.sort_by_key(|(pos, _, _)| *pos);
    blocks
}

/// Encodes the record format: per real block one little-endian `u64`,
/// low 32 bits = x | y<<8 | z<<16 | rotation<<24, high 32 bits = block
/// ordinal.
pub fn encode_records(graph: &StructureGraph) -> Vec<u8> {
    let blocks = sorted_real_blocks(graph);
    let mut out = Vec::with_capacity(blocks.len() * 8);
    for (pos, block, rot) in blocks {
        let low = u32::from(pos.x)
            | u32::from(pos.y) << 8
            | u32::from(pos.z) << 16
            | u32::from(rot.to_byte()) << 24;
        let word = u64::from(low) | u64::from(block) << 32;
        out.extend_from_slice(&word.to_le_bytes());
    }
    out
}

pub fn decode_records(reg: &BlockRegistry, bytes: &[u8]) -> Result<StructureGraph, DecodeError> {
    if bytes.len() % 8 != 0 {
        return Err(DecodeError::Truncated);
    }
    let mut graph = StructureGraph::new();
    for chunk in bytes.chunks_exact(8) {
        let word = u64::from_le_bytes(chunk.try_into().expect("chunks_exact yields 8 bytes"));
        let low = word as u32;
        let ordinal = (word >> 32) as u32;
        let rot = Rotation::from_byte((low >> 24) as u8);
        replay(
            reg,
            &mut graph,
            ordinal,
            (low & 0xFF) as i32,
            (low >> 8 & 0xFF) as i32,
            (low >> 16 & 0xFF) as i32,
            rot,
        )?;
    }
    log::debug!("decoded {} block record(s)", graph.real_len());
    Ok(graph)
}

/// Encodes the compact file format: `u32` LE real-block count, then
/// bit-packed 38-bit records (id 12, x/y/z 7 each, facing 3 + variant
/// 2), zero-padded to a byte boundary.
pub fn encode_compact(graph: &StructureGraph) -> Result<Vec<u8>, EncodeError> {
    let blocks = sorted_real_blocks(graph);
    let mut w = BitWriter::with_capacity(4 + blocks.len() * COMPACT_RECORD_BITS / 8 + 1);
    w.bytes(&(blocks.len() as u32).to_le_bytes());
    for (pos, block, rot) in blocks {
        if block >= 1 << 12 {
            return Err(EncodeError::BlockIdTooWide(block));
        }
        let byte = rot.to_byte();
        if Rotation::from_byte(byte).amount(3) == 3 {
            return Err(EncodeError::NonCanonicalRotation(byte));
        }
        let facing = rot.facing_face();
        let variant = rot.variant();
        if Rotation::from_facing_and_variant(facing, i32::from(variant)) != rot {
            return Err(EncodeError::NonCanonicalRotation(byte));
        }
        w.bits(u32::from(block), 12);
        w.bits(u32::from(pos.x), 7);
        w.bits(u32::from(pos.y), 7);
        w.bits(u32::from(pos.z), 7);
        w.bits(u32::from(facing.ordinal()), 3);
        w.bits(u32::from(variant), 2);
    }
    Ok(w.finish())
}

pub fn decode_compact(reg: &BlockRegistry, bytes: &[u8]) -> Result<StructureGraph, DecodeError> {
    let Some(header) = bytes.get(..4) else {
        return Err(DecodeError::Truncated);
    };
    let count = u32::from_le_bytes(header.try_into().expect("4-byte header"));
    let mut r = BitReader::new(&bytes[4..]);
    let mut graph = StructureGraph::new();
    for _ in 0..count {
        let ordinal = r.bits(12)?;
        let x = r.bits(7)? as i32;
        let y = r.bits(7)? as i32;
        let z = r.bits(7)? as i32;
        let facing = r.bits(3)?;
        let variant = r.bits(2)?;
        let Some(face) = Face::from_ordinal(facing as u8) else {
            return Err(DecodeError::BadRotation(facing as u8));
        };
        let rot = Rotation::from_facing_and_variant(face, variant as i32);
        replay(reg, &mut graph, ordinal, x, y, z, rot)?;
    }
    log::debug!("decoded {count} compact block record(s)");
    Ok(graph)
}

/// Replays one decoded block placement into the graph, surfacing every
/// structural failure the format defines.
fn replay(
    reg: &BlockRegistry,
    graph: &mut StructureGraph,
    ordinal: u32,
    x: i32,
    y: i32,
    z: i32,
    rot: Rotation,
) -> Result<(), DecodeError> {
    let id = BlockId::try_from(ordinal)
        .ok()
        .filter(|id| reg.get(*id).is_some())
        .ok_or(DecodeError::UnknownBlock(ordinal))?;
    let ty = reg.require(id);
    let pos = GridPos::new(x, y, z)?;
    let cells = ty.rotated_cells(pos, rot)?;
    for (cell, _) in &cells {
        if graph.is_occupied(*cell) {
            return Err(DecodeError::Collision(*cell));
        }
    }
    graph.insert_placement(id, rot, &cells);
    Ok(())
}

/// Decodes a record payload into a build-mode structure.
pub fn load_editable(reg: &BlockRegistry, bytes: &[u8]) -> Result<EditableStructure, DecodeError> {
    Ok(EditableStructure::from_graph(reg, decode_records(reg, bytes)?))
}

/// Decodes a record payload into a combat-ready structure.
pub fn load_complete(
    reg: &BlockRegistry,
    bytes: &[u8],
    pose: Pose,
) -> Result<CompleteStructure, DecodeError> {
    Ok(CompleteStructure::new(reg, decode_records(reg, bytes)?, pose))
}

struct BitWriter {
    buf: Vec<u8>,
    bit: usize,
}

impl BitWriter {
    fn with_capacity(cap: usize) -> Self {
        Self {
            buf: Vec::with_capacity(cap),
            bit: 0,
        }
    }

    /// Byte-aligned write; only valid before any bit-level writes.
    fn bytes(&mut self, bytes: &[u8]) {
        debug_assert_eq!(self.bit % 8, 0);
        self.buf.extend_from_slice(bytes);
        self.bit += bytes.len() * 8;
    }

    /// LSB-first within each byte.
    fn bits(&mut self, value: u32, width: usize) {
        debug_assert!(width == 32 || value < 1 << width);
        for i in 0..width {
            if self.bit % 8 == 0 {
                self.buf.push(0);
            }
            if value >> i & 1 != 0 {
                self.buf[self.bit / 8] |= 1 << (self.bit % 8);
            }
            self.bit += 1;
        }
    }

    fn finish(self) -> Vec<u8> {
        self.buf
    }
}

struct BitReader<'a> {
    bytes: &'a [u8],
    bit: usize,
}

impl<'a> BitReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, bit: 0 }
    }

    fn bits(&mut self, width: usize) -> Result<u32, DecodeError> {
        if self.bit + width > self.bytes.len() * 8 {
            return Err(DecodeError::Truncated);
        }
        let mut value = 0u32;
        for i in 0..width {
            let byte = self.bytes[self.bit / 8];
            if byte >> (self.bit % 8) & 1 != 0 {
                value |= 1 << i;
            }
            self.bit += 1;
        }
        Ok(value)
    }
}
