//! Level domain: unit tests for the tile grid and level parsing.

use super::*;

#[test]
fn test_legend_maps_to_edges() {
    let map = TileMap::from_rows(&["#=H[]^. "]).expect("legend row parses");
    assert_eq!(map.tile_at(0, 0), TileFlags::SOLID);
    assert_eq!(map.tile_at(1, 0), TileFlags::TOP);
    assert!(map.tile_at(2, 0).is_ladder());
    assert_eq!(map.tile_at(3, 0), TileFlags::LEFT);
    assert_eq!(map.tile_at(4, 0), TileFlags::RIGHT);
    assert_eq!(map.tile_at(5, 0), TileFlags::BOTTOM);
    assert!(map.tile_at(6, 0).is_empty());
    assert!(map.tile_at(7, 0).is_empty());
}

#[test]
fn test_outside_the_grid_is_empty() {
    let map = TileMap::from_rows(&["##", "##"]).expect("block parses");
    assert_eq!(map.tile_at(1, 1), TileFlags::SOLID);
    assert!(map.tile_at(-1, 0).is_empty());
    assert!(map.tile_at(2, 0).is_empty());
    assert!(map.tile_at(0, 2).is_empty());
}

#[test]
fn test_ragged_rows_are_rejected() {
    let err = TileMap::from_rows(&["###", "##"]).unwrap_err();
    assert!(matches!(
        err,
        LevelError::Ragged {
            row: 1,
            expected: 3,
            found: 2
        }
    ));
}

#[test]
fn test_unknown_symbols_are_rejected() {
    let err = TileMap::from_rows(&["#x#"]).unwrap_err();
    assert!(matches!(
        err,
        LevelError::UnknownTile {
            row: 0,
            column: 1,
            symbol: 'x'
        }
    ));
}

#[test]
fn test_empty_level_is_rejected() {
    let rows: [&str; 0] = [];
    assert!(matches!(TileMap::from_rows(&rows), Err(LevelError::Empty)));
}

#[test]
fn test_set_and_iter() {
    let mut map = TileMap::new(4, 3);
    map.set(2, 1, TileFlags::TOP);
    map.set(9, 9, TileFlags::SOLID);
    assert_eq!(map.pixel_width(), 32);
    assert_eq!(map.pixel_height(), 24);
    assert_eq!(map.iter().collect::<Vec<_>>(), vec![(2, 1, TileFlags::TOP)]);
}

#[test]
fn test_fallback_level_is_valid() {
    let def = LevelDef::fallback();
    let map = TileMap::from_def(&def).expect("fallback level parses");
    assert_eq!(map.width(), 20);
    assert_eq!(map.height(), def.rows.len() as i32);
}

#[test]
fn test_parse_level_with_actors_and_triggers() {
    let source = r#####"(
        id: "test",
        name: "Test",
        rows: ["####", "#..#", "####"],
        spawn: (8, 8),
        actors: [
            (id: 1, pos: (8, 0), collision_group: 2, path: (to: (8, 16), speed: 8)),
        ],
        triggers: [
            (pos: (16, 8), script: (bank: 1, addr: 32), needs_interact: true),
        ],
    )"#####;
    let def = parse_level(source, "inline.ron").expect("level parses");
    assert_eq!(def.rows.len(), 3);
    assert_eq!(def.screen_width, None);
    assert_eq!(def.actors[0].collision_group, 2);
    assert_eq!(def.actors[0].bounds, crate::world::Bounds::default());
    assert_eq!(
        def.actors[0].path,
        Some(PathDef {
            to: (8, 16),
            speed: 8
        })
    );
    assert_eq!(def.triggers[0].script, ScriptRef::new(1, 32));
    assert!(TileMap::from_def(&def).is_ok());
}

#[test]
fn test_parse_level_reports_file() {
    let err = parse_level("(id: ", "broken.ron").unwrap_err();
    assert!(err.to_string().contains("broken.ron"));
}

#[test]
fn test_shipped_level_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(LEVEL_PATH);
    let def = load_level(&path).expect("shipped level loads");
    let map = TileMap::from_def(&def).expect("shipped level is rectangular");
    assert_eq!(map.width(), 32);
    assert_eq!(def.actors.len(), 3);
    assert!(def.actors[0].path.is_some());
    assert!(def.triggers.iter().any(|trigger| trigger.needs_interact));
}

#[test]
fn test_optional_fields_accept_bare_and_wrapped_values() {
    let source = |script: &str| {
        format!(
            r###"(id: "t", name: "T", rows: ["##"], spawn: (0, 0),
                actors: [(id: 1, pos: (0, 0), script: {script})])"###
        )
    };
    let bare = parse_level(&source("(bank: 2, addr: 8)"), "bare.ron").expect("bare value parses");
    let wrapped =
        parse_level(&source("Some((bank: 2, addr: 8))"), "wrapped.ron").expect("Some(..) parses");
    assert_eq!(bare.actors[0].script, Some(ScriptRef::new(2, 8)));
    assert_eq!(bare, wrapped);
}

#[test]
fn test_trigger_interact_defaults_to_walk_in() {
    let def = parse_level(
        r###"(id: "t", name: "T", rows: ["##"], spawn: (0, 0),
            triggers: [(pos: (0, 0), script: (bank: 0, addr: 1))])"###,
        "walk.ron",
    )
    .expect("trigger parses");
    assert!(!def.triggers[0].needs_interact);
}
