use crate::{
    effects::Effect,
    game::{Direction, EntityKind, PlayerMode, Position, State},
    tiles::Tile,
};

/// Where a flight ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Landing {
    pub pos: Position,
    pub mode: PlayerMode,
    /// Tile changes caused by breaking fragile walls on the way.
    pub effects: Vec<Effect>,
}

impl Landing {
    fn free(pos: Position, effects: Vec<Effect>) -> Self {
        Landing {
            pos,
            mode: PlayerMode::Free,
            effects,
        }
    }

    fn in_box(pos: Position, dir: Direction, effects: Vec<Effect>) -> Self {
        Landing {
            pos,
            mode: PlayerMode::InBox { entry: Some(dir) },
            effects,
        }
    }
}

/// Remove a fragile wall entity at `pos`, revealing its recorded tile if it has one.
fn break_fragile_entity(state: &mut State, pos: Position, effects: &mut Vec<Effect>) {
    let Some(fragile) = state.remove_entity_where(pos, |e| e.kind.is_fragile()) else {
        return;
    };
    if let EntityKind::FragileWall { under: Some(under) } = fragile.kind {
        let from = state.get_tile(pos);
        if under != from {
            effects.push(Effect::TileChanged {
                pos,
                from,
                to: under,
            });
        }
        state.set_tile(pos, under);
    }
}

fn break_fragile_tile(state: &mut State, pos: Position, effects: &mut Vec<Effect>) {
    let from = state.get_tile(pos);
    if !from.is_fragile() {
        return;
    }
    state.set_tile(pos, Tile::Floor);
    effects.push(Effect::TileChanged {
        pos,
        from,
        to: Tile::Floor,
    });
}

/// Glide from `from` in `dir` until something stops the flight.
///
/// A fragile wall in the way is broken and the flight stops in front of it.
/// Tiles that stop flight halt it one cell early; sticky tiles and pushables
/// catch the player on their cell, riding the pushable if there is one.
pub fn resolve_flight(state: &mut State, from: Position, dir: Direction) -> Landing {
    let mut effects = Vec::new();
    let mut pos = from;

    loop {
        let Some(next) = state.move_position(pos, dir) else {
            return Landing::free(pos, effects);
        };

        let fragile_entity = state.entity_at(next).is_some_and(|e| e.kind.is_fragile());
        if fragile_entity || state.get_tile(next).is_fragile() {
            break_fragile_entity(state, next, &mut effects);
            break_fragile_tile(state, next, &mut effects);
            return Landing::free(pos, effects);
        }

        let tile = state.get_tile(next);
        if tile.is_not_fly() {
            return Landing::free(pos, effects);
        }

        let box_front = state.has_pushable_at(next);
        if tile.is_stick_on_fly() {
            return if box_front {
                Landing::in_box(next, dir, effects)
            } else {
                Landing::free(next, effects)
            };
        }
        if box_front {
            return Landing::in_box(next, dir, effects);
        }

        pos = next;
    }
}
