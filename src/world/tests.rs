//! World domain: unit tests for geometry helpers and tile flags.

use bevy::prelude::*;

use super::{
    ActorId, ActorView, Avatar, Bounds, Facing, SUBPIXEL_SHIFT, TileFlags, find_in_front,
    find_overlapping, tile_of,
};

fn actor_at(x: i32, y: i32) -> ActorView {
    ActorView {
        id: ActorId(1),
        pos: IVec2::new(x << 4, y << 4),
        bounds: Bounds::default(),
        collision_group: 1,
        disabled: false,
        script: None,
    }
}

#[test]
fn test_tile_of_rounds_toward_negative_infinity() {
    assert_eq!(tile_of(0), 0);
    assert_eq!(tile_of(7), 0);
    assert_eq!(tile_of(8), 1);
    assert_eq!(tile_of(-1), -1);
}

#[test]
fn test_solid_contains_every_edge() {
    let solid = TileFlags::SOLID;
    assert!(solid.contains(TileFlags::TOP | TileFlags::BOTTOM));
    assert!(solid.contains(TileFlags::LEFT | TileFlags::RIGHT));
    assert!(!solid.is_ladder());
    assert!(TileFlags::TOP.blocks_any());
    assert!(!TileFlags::LADDER.blocks_any());
}

#[test]
fn test_bounds_tile_span() {
    let bounds = Bounds::default();
    // Anchor at pixel (16, 20): box covers x 16..=31, y 12..=27.
    let pos = IVec2::new(16 << 4, 20 << 4);
    assert_eq!(bounds.tile_columns(pos.x), 2..4);
    assert_eq!(bounds.tile_rows(pos.y), 1..4);
    assert_eq!(bounds.width(), 15);
}

#[test]
fn test_overlap_is_inclusive() {
    let avatar = Avatar::at_pixel(0, 0, Bounds::default());
    // Right edge at pixel 15 touches an actor whose left edge is pixel 15.
    assert!(avatar.overlaps(&actor_at(15, 0)));
    assert!(!avatar.overlaps(&actor_at(16, 0)));
    assert!(avatar.overlaps(&actor_at(0, 15)));
    assert!(!avatar.overlaps(&actor_at(0, 16)));
}

#[test]
fn test_actor_edges_in_subpixels() {
    let actor = actor_at(10, 40);
    assert_eq!(actor.top(), (40 - 8) << 4);
    assert_eq!(actor.bottom(), (40 + 7) << 4);

    let mut ledge = actor_at(10, 40);
    ledge.bounds = Bounds {
        left: 0,
        right: 23,
        top: -4,
        bottom: 3,
    };
    assert_eq!(ledge.top(), (40 << SUBPIXEL_SHIFT) - (4 << SUBPIXEL_SHIFT));
    assert_eq!(ledge.bottom(), 43 << SUBPIXEL_SHIFT);
}

#[test]
fn test_avatar_defaults() {
    let avatar = Avatar::at_pixel(3, 5, Bounds::default());
    assert_eq!(avatar.pixel_pos(), IVec2::new(3, 5));
    assert_eq!(avatar.facing, Facing::Right);
    assert_eq!(Facing::Left.sign(), -1);
}

// ---------------------------------------------------------------------------
// Actor lookup helpers

#[test]
fn test_find_overlapping_skips_disabled_actors() {
    let mut hidden = actor_at(4, 0);
    hidden.disabled = true;
    let mut visible = actor_at(8, 0);
    visible.id = ActorId(2);
    let actors = [hidden, visible];

    let hit = find_overlapping(&actors, IVec2::ZERO, &Bounds::default());
    assert_eq!(hit.map(|actor| actor.id), Some(ActorId(2)));
}

#[test]
fn test_find_in_front_looks_along_facing() {
    let actors = [actor_at(20, 0)];
    let bounds = Bounds::default();
    assert!(find_overlapping(&actors, IVec2::ZERO, &bounds).is_none());
    assert!(find_in_front(&actors, IVec2::ZERO, &bounds, Facing::Right, 8).is_some());
    assert!(find_in_front(&actors, IVec2::ZERO, &bounds, Facing::Left, 8).is_none());
}

#[test]
fn test_translation_flips_y() {
    let bounds = Bounds::default();
    let translation = bounds.translation(IVec2::new(16 << 4, 20 << 4), 1.0);
    assert_eq!(translation, Vec3::new(24.0, -20.0, 1.0));
}
