//! Combat-mode structure: health/mass aggregates, damage, cascades.

use std::collections::HashMap;

use keel_blocks::{BlockRegistry, BlockRole};
use keel_geom::Vec3;
use keel_grid::GridPos;

use crate::connect::resolve_connected;
use crate::graph::StructureGraph;

/// World placement handed to the physics/render sink.
#[derive(Clone, Debug, Default)]
pub struct Pose {
    pub pos: Vec3,
    pub yaw_deg: f32,
}

/// Rotate a vector by yaw degrees (Y axis), preserving Y.
#[inline]
pub fn rotate_yaw(v: Vec3, yaw_deg: f32) -> Vec3 {
    let r = yaw_deg.to_radians();
    let (s, c) = r.sin_cos();
    Vec3 {
        x: v.x * c - v.z * s,
        y: v.y,
        z: v.x * s + v.z * c,
    }
}

/// The combat-ready structure. Aggregate health and mass are maintained
/// incrementally as blocks take damage and placements fall off; once the
/// mainframe dies the whole structure is terminally destroyed.
#[derive(Debug, Clone)]
pub struct CompleteStructure {
    graph: StructureGraph,
    /// Remaining health per real cell.
    hp: HashMap<GridPos, u32>,
    hp_total: u64,
    hp_max: u64,
    mass: f32,
    mass_center: Vec3,
    root: Option<GridPos>,
    destroyed: bool,
    pose: Pose,
}

impl CompleteStructure {
    pub fn new(reg: &BlockRegistry, graph: StructureGraph, pose: Pose) -> Self {
        let mut hp = HashMap::new();
        let mut hp_total = 0u64;
        let mut root = None;
        for (pos, real) in graph.real_blocks() {
            let ty = reg.require(real.block);
            hp.insert(pos, ty.health);
            hp_total += u64::from(ty.health);
            if ty.role == BlockRole::Mainframe {
                root = Some(pos);
            }
        }
        let (mass, mass_center) = mass_distribution(reg, &graph);
        Self {
            graph,
            hp,
            hp_total,
            hp_max: hp_total,
            mass,
            mass_center,
            root,
            destroyed: false,
            pose,
        }
    }

    pub fn graph(&self) -> &StructureGraph {
        &self.graph
    }

    pub fn hp(&self) -> u64 {
        self.hp_total
    }

    pub fn hp_max(&self) -> u64 {
        self.hp_max
    }

    pub fn total_mass(&self) -> f32 {
        self.mass
    }

    pub fn mass_center(&self) -> Vec3 {
        self.mass_center
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn pose_mut(&mut self) -> &mut Pose {
        &mut self.pose
    }

    pub fn root(&self) -> Option<GridPos> {
        self.root
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Real block count.
    pub fn len(&self) -> usize {
        self.hp.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hp.is_empty()
    }

    pub fn block_hp(&self, pos: GridPos) -> Option<u32> {
        let (origin, _) = self.graph.real_at(pos)?;
        self.hp.get(&origin).copied()
    }

    /// Applies damage to the block covering `pos` and returns how much
    /// was actually absorbed. Killing the mainframe destroys the whole
    /// structure; killing any other block removes it and cascades every
    /// placement the removal disconnected from the mainframe.
    ///
    /// Routing damage to an empty cell is a caller contract breach.
    pub fn damage(&mut self, reg: &BlockRegistry, pos: GridPos, amount: u32) -> u32 {
        assert!(!self.destroyed, "structure is already destroyed");
        let Some((origin, real)) = self.graph.real_at(pos) else {
            panic!("damage routed to empty cell {pos}");
        };
        let block = real.block;
        let hp = self
            .hp
            .get_mut(&origin)
            .expect("real cell without a health entry");
        let applied = amount.min(*hp);
        *hp -= applied;
        self.hp_total -= u64::from(applied);
        if *hp > 0 {
            return applied;
        }

        let ty = reg.require(block);
        if ty.role == BlockRole::Mainframe {
            self.destroyed = true;
            log::info!("mainframe at {origin} destroyed, structure lost");
            return applied;
        }
        self.remove_dead(reg, origin);
        self.cascade(reg);
        applied
    }

    /// Recomputes the mass-weighted centroid over all real blocks and
    /// re-bases the body around it. With `keep_world_position` the pose
    /// shifts to compensate so blocks do not move in world space; used at
    /// initial load. After combat damage the visual origin must not
    /// jump, so pass `false`.
    pub fn recenter_mass(&mut self, reg: &BlockRegistry, keep_world_position: bool) {
        let (mass, center) = mass_distribution(reg, &self.graph);
        let delta = center - self.mass_center;
        if keep_world_position {
            self.pose.pos += rotate_yaw(delta, self.pose.yaw_deg);
        }
        self.mass_center = center;
        self.mass = mass;
    }

    fn remove_dead(&mut self, reg: &BlockRegistry, origin: GridPos) {
        let removed = self.graph.remove_placement(origin);
        let ty = reg.require(removed.block);
        let remaining = self.hp.remove(&origin).unwrap_or(0);
        self.hp_total -= u64::from(remaining);
        self.hp_max -= u64::from(ty.health);
        self.mass -= ty.mass;
        log::debug!("block `{}` at {origin} destroyed", ty.name);
    }

    fn cascade(&mut self, reg: &BlockRegistry) {
        let Some(root) = self.root else {
            panic!("destruction cascade without a root anchor");
        };
        let connected = resolve_connected(&self.graph, root);
        let orphaned: Vec<GridPos> = self
            .graph
            .real_blocks()
            .map(|(pos, _)| pos)
            .filter(|pos| !connected.contains(pos))
            .collect();
        if !orphaned.is_empty() {
            log::debug!("cascade sheds {} orphaned block(s)", orphaned.len());
        }
        for origin in orphaned {
            self.remove_dead(reg, origin);
        }
    }
}

/// Total mass and mass-weighted centroid; a multi-cell block spreads its
/// mass evenly over its cells.
fn mass_distribution(reg: &BlockRegistry, graph: &StructureGraph) -> (f32, Vec3) {
    let mut total = 0.0f32;
    let mut weighted = Vec3::ZERO;
    for (pos, real) in graph.real_blocks() {
        let ty = reg.require(real.block);
        let cell_count = 1 + real.parts.len();
        let share = ty.mass / cell_count as f32;
        weighted += pos.center() * share;
        for part in &real.parts {
            weighted += part.center() * share;
        }
        total += ty.mass;
    }
    if total > 0.0 {
        (total, weighted / total)
    } else {
        (0.0, Vec3::ZERO)
    }
}
