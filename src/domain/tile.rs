/// Tile kinds and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Empty,
    Solid,
    /// The player's own cell, overlaid on the generator output.
    Player,
    StreetLight,
    Wave,
    /// Bounds movement and the visible region, but is never drawn.
    InvisibleBlock,
}

impl Tile {
    /// Is this tile drawn, and does the visibility fill expand through it?
    pub fn is_visible(self) -> bool {
        !matches!(self, Tile::Empty | Tile::InvisibleBlock)
    }

    /// Does this tile push the player out during collision resolution?
    pub fn is_solid(self) -> bool {
        matches!(self, Tile::Solid | Tile::InvisibleBlock)
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Empty
    }
}
