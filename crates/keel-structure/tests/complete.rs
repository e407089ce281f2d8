use keel_blocks::BlockRegistry;
use keel_geom::Vec3;
use keel_grid::{GridPos, Rotation};
use keel_structure::{CompleteStructure, EditableStructure, Pose};

const CATALOG: &str = r#"
[[blocks]]
name = "hull"
health = 100
mass = 2.0
connects = ["all"]

[[blocks]]
name = "mainframe"
role = "mainframe"
health = 500
mass = 8.0
connects = ["all"]
"#;

const MULTI_CATALOG: &str = r#"
[[blocks]]
name = "mainframe"
role = "mainframe"
health = 500
mass = 8.0
connects = ["all"]

[[blocks]]
name = "thruster"
health = 90
mass = 3.0

[[blocks.cells]]
offset = [0, 0, 0]
connects = ["all"]

[[blocks.cells]]
offset = [0, 0, 1]
connects = ["back"]
"#;

fn pos(x: i32, y: i32, z: i32) -> GridPos {
    GridPos::new(x, y, z).unwrap()
}

const R0: Rotation = Rotation::ZERO;

fn bridge_structure(reg: &BlockRegistry) -> CompleteStructure {
    // mainframe - A - B - C - D - E, all in a row on +X; B is the sole
    // connector between the root side and the {C, D, E} group.
    let mut build = EditableStructure::new();
    let mainframe = reg.id_by_name("mainframe").unwrap();
    let hull = reg.id_by_name("hull").unwrap();
    assert!(build.try_place(reg, pos(10, 10, 10), mainframe, R0));
    for x in 11..=15 {
        assert!(build.try_place(reg, pos(x, 10, 10), hull, R0));
    }
    CompleteStructure::new(reg, build.into_graph(), Pose::default())
}

#[test]
fn damage_is_clamped_and_tracked_per_block() {
    let reg = BlockRegistry::from_toml_str(CATALOG).expect("catalog");
    let mut s = bridge_structure(&reg);
    let total = s.hp();
    assert_eq!(total, 500 + 5 * 100);
    assert_eq!(s.damage(&reg, pos(11, 10, 10), 30), 30);
    assert_eq!(s.block_hp(pos(11, 10, 10)), Some(70));
    assert_eq!(s.hp(), total - 30);
    // Overkill only absorbs what is left.
    assert_eq!(s.damage(&reg, pos(11, 10, 10), 1000), 70);
}

#[test]
fn severing_the_bridge_sheds_the_whole_group() {
    let reg = BlockRegistry::from_toml_str(CATALOG).expect("catalog");
    let mut s = bridge_structure(&reg);
    let hp_before = s.hp();
    let mass_before = s.total_mass();
    assert_eq!(s.len(), 6);

    // Kill B at x=12: B itself plus the disconnected {13, 14, 15} group
    // must go, exactly 1 + 3 real blocks.
    let applied = s.damage(&reg, pos(12, 10, 10), 100);
    assert_eq!(applied, 100);
    assert_eq!(s.len(), 2);
    assert!(s.graph().cell(pos(13, 10, 10)).is_none());
    assert!(s.graph().cell(pos(15, 10, 10)).is_none());
    // Aggregates drop by the full healths and masses of the four losses.
    assert_eq!(s.hp(), hp_before - 4 * 100);
    assert_eq!(s.hp_max(), (500 + 5 * 100) - 4 * 100);
    let expected_mass = mass_before - 4.0 * 2.0;
    assert!((s.total_mass() - expected_mass).abs() < 1e-4);
    assert!(!s.is_destroyed());
}

#[test]
fn mainframe_death_is_terminal() {
    let reg = BlockRegistry::from_toml_str(CATALOG).expect("catalog");
    let mut s = bridge_structure(&reg);
    let applied = s.damage(&reg, pos(10, 10, 10), 500);
    assert_eq!(applied, 500);
    assert!(s.is_destroyed());
    // The graph is not dismantled; the structure as a whole is lost.
    assert_eq!(s.len(), 6);
}

#[test]
#[should_panic(expected = "already destroyed")]
fn damage_after_destruction_is_a_contract_breach() {
    let reg = BlockRegistry::from_toml_str(CATALOG).expect("catalog");
    let mut s = bridge_structure(&reg);
    s.damage(&reg, pos(10, 10, 10), 500);
    s.damage(&reg, pos(11, 10, 10), 1);
}

#[test]
#[should_panic(expected = "empty cell")]
fn damage_to_an_empty_cell_is_a_contract_breach() {
    let reg = BlockRegistry::from_toml_str(CATALOG).expect("catalog");
    let mut s = bridge_structure(&reg);
    s.damage(&reg, pos(0, 0, 0), 10);
}

#[test]
fn part_cells_route_damage_to_their_parent() {
    let reg = BlockRegistry::from_toml_str(MULTI_CATALOG).expect("catalog");
    let mut build = EditableStructure::new();
    let mainframe = reg.id_by_name("mainframe").unwrap();
    let thruster = reg.id_by_name("thruster").unwrap();
    assert!(build.try_place(&reg, pos(10, 10, 10), mainframe, R0));
    assert!(build.try_place(&reg, pos(10, 10, 11), thruster, R0));
    let mut s = CompleteStructure::new(&reg, build.into_graph(), Pose::default());

    // Hit the tail cell; the parent at (10,10,11) takes it.
    assert_eq!(s.damage(&reg, pos(10, 10, 12), 40), 40);
    assert_eq!(s.block_hp(pos(10, 10, 11)), Some(50));
    // Kill it through the tail: both cells vanish together.
    assert_eq!(s.damage(&reg, pos(10, 10, 12), 50), 50);
    assert!(s.graph().cell(pos(10, 10, 11)).is_none());
    assert!(s.graph().cell(pos(10, 10, 12)).is_none());
    assert_eq!(s.len(), 1);
}

#[test]
fn recenter_mass_moves_centroid_and_optionally_pose() {
    let reg = BlockRegistry::from_toml_str(CATALOG).expect("catalog");
    let mut s = bridge_structure(&reg);
    s.recenter_mass(&reg, false);
    let before = s.mass_center();

    // Shaving the far end pulls the centroid toward the mainframe.
    s.damage(&reg, pos(15, 10, 10), 100);
    s.recenter_mass(&reg, false);
    let after = s.mass_center();
    assert!(after.x < before.x);
    assert_eq!(s.pose().pos, Vec3::ZERO, "origin must not jump after combat");

    // Compensated recenter keeps world placement: the pose shifts by the
    // centroid delta (yaw is zero here).
    s.damage(&reg, pos(14, 10, 10), 100);
    let prev_center = s.mass_center();
    s.recenter_mass(&reg, true);
    let delta = s.mass_center() - prev_center;
    assert!((s.pose().pos.x - delta.x).abs() < 1e-5);
}
