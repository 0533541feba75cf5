//! Level domain: the tile grid, level data, and the entities a level spawns.

mod data;
mod loader;

#[cfg(test)]
mod tests;

pub use data::{ActorDef, LevelDef, PathDef, TriggerDef};
pub use loader::{LevelError, load_level, parse_level};
pub(crate) use loader::ron_options;

use bevy::prelude::*;
use std::path::Path;

use crate::controller::ControllerTick;
use crate::world::{
    ActorId, Avatar, Bounds, SUBPIXEL_SHIFT, ScriptRef, TILE_SHIFT, TileFlags, TileQuery, Viewport,
};

const LEVEL_PATH: &str = "assets/data/level.ron";

/// Tile flags for one legend character.
pub fn tile_for(symbol: char) -> Option<TileFlags> {
    match symbol {
        '#' => Some(TileFlags::SOLID),
        '=' => Some(TileFlags::TOP),
        'H' => Some(TileFlags::LADDER),
        '[' => Some(TileFlags::LEFT),
        ']' => Some(TileFlags::RIGHT),
        '^' => Some(TileFlags::BOTTOM),
        '.' | ' ' => Some(TileFlags::empty()),
        _ => None,
    }
}

/// Collision grid for the active level. Anything outside it is empty.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct TileMap {
    width: i32,
    height: i32,
    tiles: Vec<TileFlags>,
}

impl TileMap {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            tiles: vec![TileFlags::empty(); (width * height) as usize],
        }
    }

    /// Parse legend rows. Rows must all be the same width.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, LevelError> {
        let expected = rows.first().ok_or(LevelError::Empty)?.as_ref().chars().count();
        if expected == 0 {
            return Err(LevelError::Empty);
        }

        let mut tiles = Vec::with_capacity(expected * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != expected {
                return Err(LevelError::Ragged {
                    row,
                    expected,
                    found,
                });
            }
            for (column, symbol) in line.chars().enumerate() {
                let flags = tile_for(symbol).ok_or(LevelError::UnknownTile {
                    row,
                    column,
                    symbol,
                })?;
                tiles.push(flags);
            }
        }

        Ok(Self {
            width: expected as i32,
            height: rows.len() as i32,
            tiles,
        })
    }

    pub fn from_def(def: &LevelDef) -> Result<Self, LevelError> {
        Self::from_rows(&def.rows)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn pixel_width(&self) -> i32 {
        self.width << TILE_SHIFT
    }

    pub fn pixel_height(&self) -> i32 {
        self.height << TILE_SHIFT
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        ((0..self.width).contains(&x) && (0..self.height).contains(&y))
            .then(|| (y * self.width + x) as usize)
    }

    /// Overwrite one tile. Out-of-grid writes are ignored.
    pub fn set(&mut self, x: i32, y: i32, flags: TileFlags) {
        if let Some(index) = self.index(x, y) {
            self.tiles[index] = flags;
        }
    }

    /// Occupied tiles with their grid coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, TileFlags)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, flags)| !flags.is_empty())
            .map(|(index, flags)| {
                let index = index as i32;
                (index % self.width, index / self.width, *flags)
            })
    }
}

impl TileQuery for TileMap {
    fn tile_at(&self, x: i32, y: i32) -> TileFlags {
        self.index(x, y)
            .map_or(TileFlags::empty(), |index| self.tiles[index])
    }
}

// ---------------------------------------------------------------------------
// Level entities

/// A level actor the controller can collide with, ride, or interact with.
#[derive(Component, Debug, Clone)]
pub struct ActorBody {
    /// Position in sub-pixel units.
    pub pos: IVec2,
    pub bounds: Bounds,
    pub collision_group: u8,
    pub disabled: bool,
    pub script: Option<ScriptRef>,
}

/// Ping-pong path for a moving actor, in sub-pixels.
#[derive(Component, Debug, Clone)]
pub struct PlatformPath {
    pub from: IVec2,
    pub to: IVec2,
    pub speed: i32,
    pub outbound: bool,
}

/// A trigger zone that fires its script when the avatar walks into it.
#[derive(Component, Debug, Clone)]
pub struct TriggerZone {
    /// Position in sub-pixel units.
    pub pos: IVec2,
    pub bounds: Bounds,
    pub script: ScriptRef,
    pub needs_interact: bool,
}

fn subpixel((x, y): (i32, i32)) -> IVec2 {
    IVec2::new(x << SUBPIXEL_SHIFT, y << SUBPIXEL_SHIFT)
}

pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TileMap>()
            .init_resource::<Viewport>()
            .add_systems(Startup, setup_level)
            .add_systems(FixedUpdate, move_platforms.before(ControllerTick))
            .add_systems(Update, sync_actor_transforms);
    }
}

fn read_level(path: &Path) -> Result<(LevelDef, TileMap), LevelError> {
    let def = load_level(path)?;
    let tile_map = TileMap::from_def(&def)?;
    Ok((def, tile_map))
}

/// Load the level file, falling back to the built-in room on failure.
fn setup_level(mut commands: Commands) {
    let (def, tile_map) = match read_level(Path::new(LEVEL_PATH)) {
        Ok(level) => level,
        Err(e) => {
            warn!("{}; using the built-in level", e);
            let def = LevelDef::fallback();
            match TileMap::from_def(&def) {
                Ok(tile_map) => (def, tile_map),
                Err(e) => {
                    error!("built-in level is invalid: {}", e);
                    return;
                }
            }
        }
    };
    info!(
        "loaded level {} ({}x{} tiles)",
        def.name,
        tile_map.width(),
        tile_map.height()
    );
    insert_level(&mut commands, &def, tile_map);
}

fn insert_level(commands: &mut Commands, def: &LevelDef, tile_map: TileMap) {
    let level_width = tile_map.pixel_width();
    let screen_width = def.screen_width.unwrap_or(level_width);
    commands.insert_resource(Viewport::fixed(level_width, screen_width));

    let (sx, sy) = def.spawn;
    commands.spawn((Avatar::at_pixel(sx, sy, Bounds::default()), Transform::default()));

    for actor in &def.actors {
        let pos = subpixel(actor.pos);
        let mut entity = commands.spawn((
            ActorId(actor.id),
            Transform::default(),
            ActorBody {
                pos,
                bounds: actor.bounds,
                collision_group: actor.collision_group,
                disabled: false,
                script: actor.script,
            },
        ));
        if let Some(path) = actor.path {
            entity.insert(PlatformPath {
                from: pos,
                to: subpixel(path.to),
                speed: path.speed,
                outbound: true,
            });
        }
    }

    for trigger in &def.triggers {
        commands.spawn(TriggerZone {
            pos: subpixel(trigger.pos),
            bounds: trigger.bounds,
            script: trigger.script,
            needs_interact: trigger.needs_interact,
        });
    }

    commands.insert_resource(tile_map);
}

/// Step moving actors before the controller samples them.
fn move_platforms(mut platforms: Query<(&mut ActorBody, &mut PlatformPath)>) {
    for (mut body, mut path) in &mut platforms {
        let target = if path.outbound { path.to } else { path.from };
        let offset = target - body.pos;
        let step = offset.clamp(IVec2::splat(-path.speed), IVec2::splat(path.speed));
        body.pos += step;
        if body.pos == target {
            path.outbound = !path.outbound;
        }
    }
}

fn sync_actor_transforms(mut actors: Query<(&ActorBody, &mut Transform), Changed<ActorBody>>) {
    for (body, mut transform) in &mut actors {
        transform.translation = body.bounds.translation(body.pos, 0.5);
    }
}
