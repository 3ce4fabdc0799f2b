use crate::{
    game::{Direction, EntityKind, Position},
    tiles::Tile,
};

/// What moved in an [`Effect::EntityMoved`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Player,
    Entity(EntityKind),
}

/// Observable events produced by a transition, in the order they happened.
///
/// Effects describe a transition for presentation; the resulting state is
/// the only authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    EntityMoved {
        actor: Actor,
        from: Position,
        to: Position,
    },
    TileChanged {
        pos: Position,
        from: Tile,
        to: Tile,
    },
    /// A pushable dropped into a box-hole at `pos`.
    BoxFell {
        pos: Position,
        kind: EntityKind,
        player_inside: bool,
    },
    PlayerLaunched {
        from: Position,
        to: Position,
        direction: Direction,
        distance: u8,
    },
    PlayerEnteredBox {
        kind: EntityKind,
        pos: Position,
        entry: Direction,
    },
    PlayerExitedBox {
        kind: EntityKind,
        pos: Position,
        exit: Direction,
    },
    /// A heavy box lost (`neutral = true`) or gained its ride axis.
    HeavyNeutral {
        pos: Position,
        neutral: bool,
    },
    Bump {
        pos: Position,
        direction: Direction,
    },
}
