//! World domain: tile edge-solidity flags.

use bitflags::bitflags;

/// Pixels per tile, as a shift (8 px tiles).
pub const TILE_SHIFT: i32 = 3;

bitflags! {
    /// Per-tile collision and property bits.
    ///
    /// Edge bits name the side of the tile that is solid: `TOP` stops an
    /// avatar falling onto the tile, `LEFT` stops one walking into it from the
    /// left, and so on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TileFlags: u8 {
        const TOP    = 1 << 0;
        const BOTTOM = 1 << 1;
        const LEFT   = 1 << 2;
        const RIGHT  = 1 << 3;
        const LADDER = 1 << 4;

        const SOLID = Self::TOP.bits() | Self::BOTTOM.bits() | Self::LEFT.bits() | Self::RIGHT.bits();
    }
}

impl TileFlags {
    pub fn is_ladder(self) -> bool {
        self.contains(TileFlags::LADDER)
    }

    /// Any edge solidity at all, ignoring property bits.
    pub fn blocks_any(self) -> bool {
        self.intersects(TileFlags::SOLID)
    }
}

/// Tile index containing the given pixel coordinate.
pub fn tile_of(pixel: i32) -> i32 {
    pixel >> TILE_SHIFT
}
