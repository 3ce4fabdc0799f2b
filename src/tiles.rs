use serde::{Deserialize, Serialize};

/// Base tile of a grid cell. Entities sit on top of tiles.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tile {
    #[default]
    Floor,
    Wall,
    Hole,
    Exit,
    Spikes,
    Grile,
    PressurePlate,
    HoleSpikes,
    SlimPathFloor,
    SlimPathHole,
    FragileWall,
}

pub const TILE_COUNT: usize = 11;

pub const ALL_TILES: [Tile; TILE_COUNT] = [
    Tile::Floor,
    Tile::Wall,
    Tile::Hole,
    Tile::Exit,
    Tile::Spikes,
    Tile::Grile,
    Tile::PressurePlate,
    Tile::HoleSpikes,
    Tile::SlimPathFloor,
    Tile::SlimPathHole,
    Tile::FragileWall,
];

/// Capability flags of a tile type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileTraits {
    pub wall_for_player: bool,
    pub wall_for_box: bool,
    pub hole_for_player: bool,
    pub hole_for_box: bool,
    pub fragile: bool,
    /// Flight stops before entering this tile.
    pub not_fly: bool,
    /// Flight ends on this tile.
    pub stick_on_fly: bool,
    pub end: bool,
    pub requires_box: bool,
}

const NONE: TileTraits = TileTraits {
    wall_for_player: false,
    wall_for_box: false,
    hole_for_player: false,
    hole_for_box: false,
    fragile: false,
    not_fly: false,
    stick_on_fly: false,
    end: false,
    requires_box: false,
};

const TRAITS: [TileTraits; TILE_COUNT] = [
    // Floor
    NONE,
    // Wall
    TileTraits {
        wall_for_player: true,
        wall_for_box: true,
        not_fly: true,
        ..NONE
    },
    // Hole
    TileTraits {
        hole_for_player: true,
        hole_for_box: true,
        ..NONE
    },
    // Exit
    TileTraits { end: true, ..NONE },
    // Spikes
    TileTraits {
        wall_for_box: true,
        stick_on_fly: true,
        ..NONE
    },
    // Grile
    TileTraits {
        hole_for_player: true,
        ..NONE
    },
    // PressurePlate
    TileTraits {
        requires_box: true,
        ..NONE
    },
    // HoleSpikes
    TileTraits {
        wall_for_box: true,
        stick_on_fly: true,
        hole_for_player: true,
        ..NONE
    },
    // SlimPathFloor
    TileTraits {
        wall_for_box: true,
        ..NONE
    },
    // SlimPathHole
    TileTraits {
        wall_for_box: true,
        hole_for_player: true,
        ..NONE
    },
    // FragileWall
    TileTraits {
        wall_for_player: true,
        wall_for_box: true,
        fragile: true,
        ..NONE
    },
];

impl Tile {
    pub fn index(self) -> usize {
        match self {
            Tile::Floor => 0,
            Tile::Wall => 1,
            Tile::Hole => 2,
            Tile::Exit => 3,
            Tile::Spikes => 4,
            Tile::Grile => 5,
            Tile::PressurePlate => 6,
            Tile::HoleSpikes => 7,
            Tile::SlimPathFloor => 8,
            Tile::SlimPathHole => 9,
            Tile::FragileWall => 10,
        }
    }

    pub fn traits(self) -> &'static TileTraits {
        &TRAITS[self.index()]
    }

    /// Name used by the JSON level format.
    pub fn name(self) -> &'static str {
        match self {
            Tile::Floor => "floor",
            Tile::Wall => "wall",
            Tile::Hole => "hole",
            Tile::Exit => "exit",
            Tile::Spikes => "spikes",
            Tile::Grile => "grile",
            Tile::PressurePlate => "pressurePlate",
            Tile::HoleSpikes => "holeSpikes",
            Tile::SlimPathFloor => "slimPathFloor",
            Tile::SlimPathHole => "slimPathHole",
            Tile::FragileWall => "fragileWall",
        }
    }

    pub fn from_name(name: &str) -> Option<Tile> {
        ALL_TILES.into_iter().find(|tile| tile.name() == name)
    }

    pub fn is_wall_for_player(self) -> bool {
        self.traits().wall_for_player
    }

    pub fn is_wall_for_box(self) -> bool {
        self.traits().wall_for_box
    }

    pub fn is_hole_for_player(self) -> bool {
        self.traits().hole_for_player
    }

    pub fn is_hole_for_box(self) -> bool {
        self.traits().hole_for_box
    }

    pub fn is_fragile(self) -> bool {
        self.traits().fragile
    }

    pub fn is_not_fly(self) -> bool {
        self.traits().not_fly
    }

    pub fn is_stick_on_fly(self) -> bool {
        self.traits().stick_on_fly
    }

    pub fn is_end(self) -> bool {
        self.traits().end
    }

    pub fn requires_box(self) -> bool {
        self.traits().requires_box
    }
}
