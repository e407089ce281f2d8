//! Flood-fill connectivity over mutually-matching connect-faces.

use std::collections::HashSet;

use keel_grid::GridPos;

use crate::graph::{Cell, StructureGraph};

/// All cells attached to the placement at `root`, walking edges where
/// both sides flag the shared face as connectable.
///
/// Traversal nodes are placements (real cells); every cell of a visited
/// placement, parts included, acts as a connection surface and lands in
/// the result set. Termination is guaranteed: a placement enters the
/// visited set once and the grid is finite.
pub fn resolve_connected(graph: &StructureGraph, root: GridPos) -> HashSet<GridPos> {
    let mut connected = HashSet::new();
    let Some((root_origin, _)) = graph.real_at(root) else {
        return connected;
    };
    let mut visited: HashSet<GridPos> = HashSet::new();
    let mut stack = vec![root_origin];
    visited.insert(root_origin);

    while let Some(origin) = stack.pop() {
        let Some(Cell::Real(real)) = graph.cell(origin) else {
            continue;
        };
        let mut surfaces = vec![(origin, real.connects)];
        for &part in &real.parts {
            if let Some(cell) = graph.cell(part) {
                surfaces.push((part, cell.connects()));
            }
        }
        for (pos, connects) in surfaces {
            connected.insert(pos);
            for face in connects.iter() {
                let Ok(neighbor) = pos.offset_by_face(face) else {
                    continue;
                };
                let Some(cell) = graph.cell(neighbor) else {
                    continue;
                };
                if !cell.connects().contains(face.opposite()) {
                    continue;
                }
                if let Some((next_origin, _)) = graph.real_at(neighbor) {
                    if visited.insert(next_origin) {
                        stack.push(next_origin);
                    }
                }
            }
        }
    }
    connected
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_grid::{Face, FaceSet, Rotation};

    fn pos(x: i32, y: i32, z: i32) -> GridPos {
        GridPos::new(x, y, z).unwrap()
    }

    fn put(graph: &mut StructureGraph, p: GridPos, connects: FaceSet) {
        graph.insert_placement(0, Rotation::ZERO, &[(p, connects)]);
    }

    #[test]
    fn one_sided_faces_do_not_connect() {
        let mut graph = StructureGraph::new();
        put(&mut graph, pos(0, 0, 0), FaceSet::ALL);
        // Neighbor exists but refuses the shared face.
        put(&mut graph, pos(1, 0, 0), FaceSet::from(Face::Right));
        let connected = resolve_connected(&graph, pos(0, 0, 0));
        assert!(connected.contains(&pos(0, 0, 0)));
        assert!(!connected.contains(&pos(1, 0, 0)));
    }

    #[test]
    fn chains_are_followed_transitively() {
        let mut graph = StructureGraph::new();
        for z in 0..5 {
            put(&mut graph, pos(3, 3, z), FaceSet::Z);
        }
        let connected = resolve_connected(&graph, pos(3, 3, 0));
        assert_eq!(connected.len(), 5);
    }

    #[test]
    fn parts_connect_on_behalf_of_their_parent() {
        let mut graph = StructureGraph::new();
        // Two-cell block whose tail is the only connectable surface.
        graph.insert_placement(
            1,
            Rotation::ZERO,
            &[
                (pos(10, 0, 0), FaceSet::NONE),
                (pos(10, 0, 1), FaceSet::from(Face::Front)),
            ],
        );
        put(&mut graph, pos(10, 0, 2), FaceSet::ALL);
        let connected = resolve_connected(&graph, pos(10, 0, 2));
        assert_eq!(connected.len(), 3);
        assert!(connected.contains(&pos(10, 0, 0)));
    }
}
