use serde::{Deserialize, Serialize};

use crate::world::{Bounds, ScriptRef};

/// A level as authored in RON. Rows are read top to bottom, one character per
/// 8x8 tile.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LevelDef {
    pub id: String,
    pub name: String,
    pub rows: Vec<String>,
    /// Avatar anchor in pixels.
    pub spawn: (i32, i32),
    /// Visible window width in pixels; defaults to the level width.
    #[serde(default)]
    pub screen_width: Option<i32>,
    #[serde(default)]
    pub actors: Vec<ActorDef>,
    #[serde(default)]
    pub triggers: Vec<TriggerDef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ActorDef {
    pub id: u32,
    /// Anchor in pixels.
    pub pos: (i32, i32),
    #[serde(default)]
    pub bounds: Bounds,
    #[serde(default)]
    pub collision_group: u8,
    #[serde(default)]
    pub script: Option<ScriptRef>,
    #[serde(default)]
    pub path: Option<PathDef>,
}

/// Back-and-forth motion between the spawn point and `to`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PathDef {
    /// Far end in pixels.
    pub to: (i32, i32),
    /// Sub-pixels per tick.
    pub speed: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TriggerDef {
    /// Anchor in pixels.
    pub pos: (i32, i32),
    #[serde(default)]
    pub bounds: Bounds,
    pub script: ScriptRef,
    /// Only fires when up is pressed inside the zone.
    #[serde(default)]
    pub needs_interact: bool,
}

impl LevelDef {
    /// Built-in room used when no level file can be loaded.
    pub fn fallback() -> Self {
        let rows = [
            "####################",
            "#..................#",
            "#..................#",
            "#.........====.....#",
            "#..................#",
            "#...H..............#",
            "#...H.....^^^^.....#",
            "#...H..............#",
            "#...H...........####",
            "#...H..........[...#",
            "#...H..........[...#",
            "#====..............#",
            "#..................#",
            "#..................#",
            "#..................#",
            "#..................#",
            "#..................#",
            "####################",
        ];
        Self {
            id: "fallback".to_string(),
            name: "Fallback Room".to_string(),
            rows: rows.iter().map(|row| row.to_string()).collect(),
            spawn: (24, 120),
            screen_width: None,
            actors: Vec::new(),
            triggers: Vec::new(),
        }
    }
}
