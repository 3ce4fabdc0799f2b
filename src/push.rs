use arrayvec::ArrayVec;

use crate::{
    effects::{Actor, Effect},
    game::{Direction, Entity, MAX_SIZE, Position, State},
};

/// A line of adjacent pushables that can all move one step together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushPlan {
    /// Positions of the pushed entities, head (nearest the pusher) first.
    pub chain: ArrayVec<Position, MAX_SIZE>,
    /// Cell the tail of the chain moves into.
    pub end: Position,
    pub end_is_hole: bool,
}

fn is_pushable(entity: &Entity) -> bool {
    entity.kind.is_pushable()
}

/// Collect the pushables starting at `start` that would move when shoved in
/// `dir`. Returns `None` if the chain runs off the board, into a wall for
/// boxes, or into a solid entity that cannot be pushed.
pub fn plan_push_chain(state: &State, start: Position, dir: Direction) -> Option<PushPlan> {
    let mut chain = ArrayVec::new();
    let mut pos = start;

    while state.has_pushable_at(pos) {
        chain.push(pos);
        let next = state.move_position(pos, dir)?;
        if state.get_tile(next).is_wall_for_box() || state.has_fixed_solid_at(next) {
            return None;
        }
        pos = next;
    }

    Some(PushPlan {
        chain,
        end: pos,
        end_is_hole: state.get_tile(pos).is_hole_for_box(),
    })
}

/// Move every entity in the plan one step, tail first so no entity lands on
/// another mid-move. If the tail's destination is a box-hole the tail is
/// removed instead.
pub fn apply_push_chain(
    state: &mut State,
    plan: &PushPlan,
    dir: Direction,
    effects: &mut Vec<Effect>,
) {
    for (i, &from) in plan.chain.iter().enumerate().rev() {
        let is_tail = i + 1 == plan.chain.len();
        let Some(to) = state.move_position(from, dir) else {
            continue;
        };

        if is_tail && plan.end_is_hole {
            if let Some(fallen) = state.remove_entity_where(from, is_pushable) {
                effects.push(Effect::BoxFell {
                    pos: to,
                    kind: fallen.kind,
                    player_inside: false,
                });
            }
        } else if let Some(moved) = state.move_entity_where(from, to, is_pushable) {
            effects.push(Effect::EntityMoved {
                actor: Actor::Entity(moved.kind),
                from,
                to,
            });
        }
    }
}
