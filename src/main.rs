use bevy::prelude::*;

use tilerunner::controller::ControllerPlugin;
use tilerunner::level::{ActorBody, LevelPlugin, TileMap, TriggerZone};
use tilerunner::world::{Avatar, Bounds, TILE_SHIFT, TileFlags};

fn main() {
    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "tilerunner".to_string(),
            resolution: (960, 720).into(),
            resizable: true,
            ..default()
        }),
        ..default()
    }))
    .add_plugins((LevelPlugin, ControllerPlugin))
    .add_systems(PostStartup, (spawn_camera, spawn_level_sprites));

    #[cfg(feature = "dev-tools")]
    app.add_plugins(tilerunner::dev::DevPlugin);

    app.run();
}

fn spawn_camera(mut commands: Commands, tile_map: Res<TileMap>) {
    let centre = Vec2::new(
        tile_map.pixel_width() as f32 / 2.0,
        -(tile_map.pixel_height() as f32) / 2.0,
    );
    commands.spawn((
        Camera2d,
        Transform::from_xyz(centre.x, centre.y, 100.0).with_scale(Vec3::splat(0.25)),
    ));
}

fn tile_color(flags: TileFlags) -> Color {
    if flags.is_ladder() {
        Color::srgb(0.8, 0.65, 0.2)
    } else if flags == TileFlags::SOLID {
        Color::srgb(0.35, 0.35, 0.4)
    } else if flags == TileFlags::TOP {
        Color::srgb(0.55, 0.4, 0.25)
    } else {
        Color::srgb(0.5, 0.3, 0.3)
    }
}

fn box_sprite(color: Color, bounds: &Bounds) -> Sprite {
    Sprite {
        color,
        custom_size: Some(Vec2::new(
            (bounds.width() + 1) as f32,
            (bounds.bottom - bounds.top + 1) as f32,
        )),
        ..default()
    }
}

fn spawn_level_sprites(
    mut commands: Commands,
    tile_map: Res<TileMap>,
    avatars: Query<(Entity, &Avatar)>,
    actors: Query<(Entity, &ActorBody)>,
    triggers: Query<&TriggerZone>,
) {
    let size = (1 << TILE_SHIFT) as f32;
    for (x, y, flags) in tile_map.iter() {
        commands.spawn((
            Sprite {
                color: tile_color(flags),
                custom_size: Some(Vec2::splat(size)),
                ..default()
            },
            Transform::from_xyz(
                (x as f32 + 0.5) * size,
                -(y as f32 + 0.5) * size,
                0.0,
            ),
        ));
    }

    for (entity, avatar) in &avatars {
        commands
            .entity(entity)
            .insert(box_sprite(Color::srgb(0.9, 0.9, 0.9), &avatar.bounds));
    }
    for (entity, body) in &actors {
        commands
            .entity(entity)
            .insert(box_sprite(Color::srgb(0.3, 0.6, 0.9), &body.bounds));
    }
    for zone in &triggers {
        commands.spawn((
            box_sprite(Color::srgba(0.9, 0.2, 0.6, 0.3), &zone.bounds),
            Transform::from_translation(zone.bounds.translation(zone.pos, 0.2)),
        ));
    }
}
