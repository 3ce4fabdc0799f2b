use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::tiles::Tile;

pub const MAX_SIZE: usize = 64;

/// Grid coordinates as (x, y), with y growing downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position(pub u8, pub u8);

impl Position {
    pub fn x(self) -> u8 {
        self.0
    }

    pub fn y(self) -> u8 {
        self.1
    }

    pub fn manhattan(self, other: Position) -> u8 {
        self.0.abs_diff(other.0) + self.1.abs_diff(other.1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Directions in the order the solver expands them.
pub const ALL_DIRECTIONS: [Direction; 4] = [
    Direction::Right,
    Direction::Left,
    Direction::Up,
    Direction::Down,
];

impl Direction {
    pub fn delta(self) -> (i8, i8) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn from_delta(dx: i32, dy: i32) -> Option<Direction> {
        match (dx, dy) {
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    /// Single character used in move strings (`wasd` layout).
    pub fn code(self) -> char {
        match self {
            Direction::Up => 'w',
            Direction::Down => 's',
            Direction::Left => 'a',
            Direction::Right => 'd',
        }
    }

    pub fn from_code(code: char) -> Option<Direction> {
        match code {
            'w' => Some(Direction::Up),
            's' => Some(Direction::Down),
            'a' => Some(Direction::Left),
            'd' => Some(Direction::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "Up"),
            Direction::Down => write!(f, "Down"),
            Direction::Left => write!(f, "Left"),
            Direction::Right => write!(f, "Right"),
        }
    }
}

/// Orientation of a triangular box, naming the two sides with short legs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    NE,
    NW,
    SE,
    SW,
}

impl Orientation {
    pub fn index(self) -> usize {
        match self {
            Orientation::NE => 0,
            Orientation::NW => 1,
            Orientation::SE => 2,
            Orientation::SW => 3,
        }
    }

    /// Directions of travel that hit the sloped (long) side.
    pub fn long_side_directions(self) -> [Direction; 2] {
        match self {
            Orientation::NE => [Direction::Down, Direction::Left],
            Orientation::NW => [Direction::Right, Direction::Down],
            Orientation::SE => [Direction::Up, Direction::Left],
            Orientation::SW => [Direction::Up, Direction::Right],
        }
    }

    fn to_char(self) -> char {
        match self {
            Orientation::NE => '1',
            Orientation::NW => '2',
            Orientation::SE => '3',
            Orientation::SW => '4',
        }
    }

    fn to_riding_char(self) -> char {
        match self {
            Orientation::NE => '5',
            Orientation::NW => '6',
            Orientation::SE => '7',
            Orientation::SW => '8',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerMode {
    Free,
    /// Riding the pushable under the player. `entry` is `None` when neutral.
    InBox { entry: Option<Direction> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Player {
    pub pos: Position,
    pub mode: PlayerMode,
}

impl Player {
    pub fn free(pos: Position) -> Self {
        Player {
            pos,
            mode: PlayerMode::Free,
        }
    }

    pub fn is_free(&self) -> bool {
        self.mode == PlayerMode::Free
    }

    /// Ride direction, `None` in free mode or when neutral.
    pub fn entry(&self) -> Option<Direction> {
        match self.mode {
            PlayerMode::Free => None,
            PlayerMode::InBox { entry } => entry,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Box,
    HeavyBox,
    TriBox(Orientation),
    /// Breakable overlay. `under` is the tile revealed when it breaks.
    FragileWall { under: Option<Tile> },
}

impl EntityKind {
    pub fn is_pushable(self) -> bool {
        matches!(
            self,
            EntityKind::Box | EntityKind::HeavyBox | EntityKind::TriBox(_)
        )
    }

    pub fn is_solid(self) -> bool {
        true
    }

    pub fn is_fragile(self) -> bool {
        matches!(self, EntityKind::FragileWall { .. })
    }

    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Box => "box",
            EntityKind::HeavyBox => "heavyBox",
            EntityKind::TriBox(_) => "triBox",
            EntityKind::FragileWall { .. } => "fragileWall",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity {
    pub kind: EntityKind,
    pub pos: Position,
}

/// A world state: tile grid, the player and the remaining entities.
///
/// The grid is shared between states derived from one another and only
/// copied when a tile actually changes, so cloning a state costs one
/// entity vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    width: u8,
    height: u8,
    tiles: Arc<Vec<Tile>>,
    player: Option<Player>,
    entities: Vec<Entity>,
}

impl State {
    /// Create a state of the given size filled with floor.
    pub fn new(width: usize, height: usize) -> Result<Self, String> {
        if width == 0 || height == 0 {
            return Err("Board must not be empty".to_string());
        }
        if width > MAX_SIZE {
            return Err(format!(
                "Board width {} exceeds maximum size {}",
                width, MAX_SIZE
            ));
        }
        if height > MAX_SIZE {
            return Err(format!(
                "Board height {} exceeds maximum size {}",
                height, MAX_SIZE
            ));
        }
        Ok(State {
            width: width as u8,
            height: height as u8,
            tiles: Arc::new(vec![Tile::Floor; width * height]),
            player: None,
            entities: Vec::new(),
        })
    }

    /// Parse a board from text format.
    ///
    /// Tiles:
    /// - `#` = Wall, ` ` = Floor, `o` = Hole, `E` = Exit, `^` = Spikes
    /// - `=` = Grile, `_` = Pressure plate, `v` = Hole spikes
    /// - `:` = Slim path floor, `~` = Slim path hole, `%` = Fragile wall tile
    ///
    /// Entities (on floor unless noted):
    /// - `@` = Player, `+` = Player on exit
    /// - `$` = Box, `*` = Box on pressure plate, `H` = Heavy box
    /// - `1`..`4` = Triangular box facing NE, NW, SE, SW
    /// - `&`, `h`, `5`..`8` = Player riding a box, heavy box or triangular box
    /// - `F` = Fragile wall entity
    ///
    /// A ridden box always parses with a neutral entry direction, so
    /// printing a mid-ride state and parsing it back loses the ride axis.
    pub fn from_text(text: &str) -> Result<Self, String> {
        let lines: Vec<&str> = text.lines().collect();

        if lines.is_empty() {
            return Err("Empty board".to_string());
        }

        let height = lines.len();
        let width = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);

        let mut state = State::new(width, height)?;

        for (y, line) in lines.iter().enumerate() {
            for (x, ch) in line.chars().enumerate() {
                let pos = Position(x as u8, y as u8);
                let (tile, entity, player) = match ch {
                    ' ' => (Tile::Floor, None, None),
                    '#' => (Tile::Wall, None, None),
                    'o' => (Tile::Hole, None, None),
                    'E' => (Tile::Exit, None, None),
                    '^' => (Tile::Spikes, None, None),
                    '=' => (Tile::Grile, None, None),
                    '_' => (Tile::PressurePlate, None, None),
                    'v' => (Tile::HoleSpikes, None, None),
                    ':' => (Tile::SlimPathFloor, None, None),
                    '~' => (Tile::SlimPathHole, None, None),
                    '%' => (Tile::FragileWall, None, None),
                    '@' => (Tile::Floor, None, Some(PlayerMode::Free)),
                    '+' => (Tile::Exit, None, Some(PlayerMode::Free)),
                    '&' => (
                        Tile::Floor,
                        Some(EntityKind::Box),
                        Some(PlayerMode::InBox { entry: None }),
                    ),
                    'h' => (
                        Tile::Floor,
                        Some(EntityKind::HeavyBox),
                        Some(PlayerMode::InBox { entry: None }),
                    ),
                    '5'..='8' => {
                        let orient = match ch {
                            '5' => Orientation::NE,
                            '6' => Orientation::NW,
                            '7' => Orientation::SE,
                            _ => Orientation::SW,
                        };
                        (
                            Tile::Floor,
                            Some(EntityKind::TriBox(orient)),
                            Some(PlayerMode::InBox { entry: None }),
                        )
                    }
                    '$' => (Tile::Floor, Some(EntityKind::Box), None),
                    '*' => (Tile::PressurePlate, Some(EntityKind::Box), None),
                    'H' => (Tile::Floor, Some(EntityKind::HeavyBox), None),
                    '1' => (Tile::Floor, Some(EntityKind::TriBox(Orientation::NE)), None),
                    '2' => (Tile::Floor, Some(EntityKind::TriBox(Orientation::NW)), None),
                    '3' => (Tile::Floor, Some(EntityKind::TriBox(Orientation::SE)), None),
                    '4' => (Tile::Floor, Some(EntityKind::TriBox(Orientation::SW)), None),
                    'F' => (
                        Tile::Floor,
                        Some(EntityKind::FragileWall { under: None }),
                        None,
                    ),
                    _ => {
                        return Err(format!(
                            "Invalid character '{}' at position ({}, {})",
                            ch, x, y
                        ));
                    }
                };

                state.set_tile(pos, tile);
                if let Some(kind) = entity {
                    state.add_entity(kind, pos)?;
                }
                if let Some(mode) = player {
                    if state.player.is_some() {
                        return Err("Multiple players found".to_string());
                    }
                    state.player = Some(Player { pos, mode });
                }
            }
        }

        Ok(state)
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32
    }

    /// Move from a position in the given direction.
    /// Returns `None` if the new position falls outside the board.
    pub fn move_position(&self, pos: Position, dir: Direction) -> Option<Position> {
        let (dx, dy) = dir.delta();
        let new_x = pos.0 as i32 + dx as i32;
        let new_y = pos.1 as i32 + dy as i32;
        if self.in_bounds(new_x, new_y) {
            Some(Position(new_x as u8, new_y as u8))
        } else {
            None
        }
    }

    pub fn get_tile(&self, pos: Position) -> Tile {
        self.tiles[pos.1 as usize * self.width as usize + pos.0 as usize]
    }

    /// Change a tile, copying the shared grid first if another state uses it.
    pub fn set_tile(&mut self, pos: Position, tile: Tile) {
        let index = pos.1 as usize * self.width as usize + pos.0 as usize;
        if self.tiles[index] != tile {
            Arc::make_mut(&mut self.tiles)[index] = tile;
        }
    }

    /// Iterate over all cells in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = (Position, Tile)> + '_ {
        let width = self.width as usize;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, &tile)| (Position((i % width) as u8, (i / width) as u8), tile))
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn set_player(&mut self, player: Option<Player>) {
        self.player = player;
    }

    pub(crate) fn player_mut(&mut self) -> Option<&mut Player> {
        self.player.as_mut()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Place an entity, keeping at most one entity per cell.
    pub fn add_entity(&mut self, kind: EntityKind, pos: Position) -> Result<(), String> {
        if pos.0 >= self.width || pos.1 >= self.height {
            return Err(format!("Entity {} at {} is out of bounds", kind.name(), pos));
        }
        if let Some(other) = self.entity_at(pos) {
            return Err(format!(
                "Cannot place {} at {}: occupied by {}",
                kind.name(),
                pos,
                other.kind.name()
            ));
        }
        self.entities.push(Entity { kind, pos });
        Ok(())
    }

    pub fn entity_at(&self, pos: Position) -> Option<&Entity> {
        self.entities.iter().find(|e| e.pos == pos)
    }

    pub fn pushable_at(&self, pos: Position) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| e.pos == pos && e.kind.is_pushable())
    }

    pub fn solid_at(&self, pos: Position) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| e.pos == pos && e.kind.is_solid())
    }

    pub fn has_pushable_at(&self, pos: Position) -> bool {
        self.pushable_at(pos).is_some()
    }

    /// A solid entity that cannot be pushed (e.g. a fragile wall) occupies `pos`.
    pub fn has_fixed_solid_at(&self, pos: Position) -> bool {
        self.solid_at(pos).is_some() && !self.has_pushable_at(pos)
    }

    /// Move the entity at `from` matching `pred` to `to`. Returns the moved entity.
    pub(crate) fn move_entity_where(
        &mut self,
        from: Position,
        to: Position,
        pred: impl Fn(&Entity) -> bool,
    ) -> Option<Entity> {
        let entity = self
            .entities
            .iter_mut()
            .find(|e| e.pos == from && pred(e))?;
        entity.pos = to;
        Some(*entity)
    }

    /// Remove the first entity at `pos` matching `pred`, preserving the order of the rest.
    pub(crate) fn remove_entity_where(
        &mut self,
        pos: Position,
        pred: impl Fn(&Entity) -> bool,
    ) -> Option<Entity> {
        let index = self
            .entities
            .iter()
            .position(|e| e.pos == pos && pred(e))?;
        Some(self.entities.remove(index))
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            let mut line = String::new();
            for x in 0..self.width {
                let pos = Position(x, y);
                let tile = self.get_tile(pos);
                let player = self.player.filter(|p| p.pos == pos);
                let entity = self.entity_at(pos);

                let ch = if let Some(player) = player {
                    match (player.mode, tile) {
                        (PlayerMode::InBox { .. }, _) => match self.pushable_at(pos) {
                            Some(ridden) => match ridden.kind {
                                EntityKind::HeavyBox => 'h',
                                EntityKind::TriBox(orient) => orient.to_riding_char(),
                                _ => '&',
                            },
                            None => '&',
                        },
                        (PlayerMode::Free, Tile::Exit) => '+',
                        (PlayerMode::Free, _) => '@',
                    }
                } else if let Some(entity) = entity {
                    match entity.kind {
                        EntityKind::Box if tile == Tile::PressurePlate => '*',
                        EntityKind::Box => '$',
                        EntityKind::HeavyBox => 'H',
                        EntityKind::TriBox(orient) => orient.to_char(),
                        EntityKind::FragileWall { .. } => 'F',
                    }
                } else {
                    match tile {
                        Tile::Floor => ' ',
                        Tile::Wall => '#',
                        Tile::Hole => 'o',
                        Tile::Exit => 'E',
                        Tile::Spikes => '^',
                        Tile::Grile => '=',
                        Tile::PressurePlate => '_',
                        Tile::HoleSpikes => 'v',
                        Tile::SlimPathFloor => ':',
                        Tile::SlimPathHole => '~',
                        Tile::FragileWall => '%',
                    }
                };
                line.push(ch);
            }
            // Trailing floor is left implicit, as in the input format
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}
