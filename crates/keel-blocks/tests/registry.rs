use keel_blocks::{BlockRegistry, BlockRole, BlockShape};
use keel_grid::{Face, FaceSet, GridPos, Rotation};

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

[[blocks]]
name = "laser"
role = "weapon"
health = 80
mass = 1.5
connects = ["bottom"]

[[blocks]]
name = "thruster"
health = 90
mass = 2.5

[[blocks.cells]]
offset = [0, 0, 1]
connects = ["back"]

[[blocks.cells]]
offset = [0, 0, 0]
connects = ["front", "top", "bottom"]
"#;

#[test]
fn catalog_compiles_with_roles_and_ordinals() {
    let reg = BlockRegistry::from_toml_str(CATALOG).expect("catalog");
    assert_eq!(reg.len(), 4);
    let hull = reg.id_by_name("hull").unwrap();
    let mainframe = reg.id_by_name("mainframe").unwrap();
    let laser = reg.id_by_name("laser").unwrap();
    assert_eq!(reg.require(hull).role, BlockRole::Structural);
    assert_eq!(reg.require(mainframe).role, BlockRole::Mainframe);
    assert_eq!(reg.require(laser).role, BlockRole::Weapon);
    assert_eq!(reg.require(hull).id, hull);
    assert!(reg.get(99).is_none());
}

#[test]
fn multi_cell_origin_is_hoisted_first() {
    let reg = BlockRegistry::from_toml_str(CATALOG).expect("catalog");
    let thruster = reg.require(reg.id_by_name("thruster").unwrap());
    match &thruster.shape {
        BlockShape::Multi { cells } => {
            assert_eq!(cells.len(), 2);
            assert_eq!(cells[0].0, (0, 0, 0));
        }
        other => panic!("expected multi-cell shape, got {other:?}"),
    }
}

#[test]
fn rotated_cells_rotate_offsets_and_faces_together() {
    let reg = BlockRegistry::from_toml_str(CATALOG).expect("catalog");
    let thruster = reg.require(reg.id_by_name("thruster").unwrap());
    let origin = GridPos::new(10, 10, 10).unwrap();

    // Identity facing keeps the tail cell one step toward Front.
    let front = Rotation::from_facing_and_variant(Face::Front, 0);
    let cells = thruster.rotated_cells(origin, front).unwrap();
    assert_eq!(cells[0].0, origin);
    assert_eq!(cells[1].0, GridPos::new(10, 10, 11).unwrap());
    assert!(cells[1].1.contains(Face::Back));

    // Facing Right swings the tail cell onto the +X axis and carries the
    // cell's connect-face with it.
    let right = Rotation::from_facing_and_variant(Face::Right, 0);
    let cells = thruster.rotated_cells(origin, right).unwrap();
    assert_eq!(cells[0].0, origin);
    assert_eq!(cells[1].0, GridPos::new(11, 10, 10).unwrap());
    assert!(cells[1].1.contains(Face::Left));
}

#[test]
fn rotated_cells_fail_whole_at_the_grid_edge() {
    let reg = BlockRegistry::from_toml_str(CATALOG).expect("catalog");
    let thruster = reg.require(reg.id_by_name("thruster").unwrap());
    let edge = GridPos::new(10, 10, 127).unwrap();
    let front = Rotation::from_facing_and_variant(Face::Front, 0);
    assert!(thruster.rotated_cells(edge, front).is_err());
}

#[test]
fn config_validation_rejects_bad_definitions() {
    let zero_health = r#"
[[blocks]]
name = "bad"
health = 0
mass = 1.0
connects = ["all"]
"#;
    assert!(BlockRegistry::from_toml_str(zero_health).is_err());

    let no_origin = r#"
[[blocks]]
name = "bad"
health = 1
mass = 1.0

[[blocks.cells]]
offset = [1, 0, 0]
connects = ["all"]
"#;
    assert!(BlockRegistry::from_toml_str(no_origin).is_err());

    let dup_name = r#"
[[blocks]]
name = "a"
health = 1
mass = 1.0
connects = ["all"]

[[blocks]]
name = "a"
health = 1
mass = 1.0
connects = ["all"]
"#;
    assert!(BlockRegistry::from_toml_str(dup_name).is_err());

    let bad_face = r#"
[[blocks]]
name = "bad"
health = 1
mass = 1.0
connects = ["sideways"]
"#;
    assert!(BlockRegistry::from_toml_str(bad_face).is_err());
}
