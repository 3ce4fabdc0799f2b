use log::warn;

use crate::{
    effects::{Actor, Effect},
    flight,
    game::{Direction, EntityKind, Player, PlayerMode, Position, State},
    push,
};

/// Result of applying one directional input.
///
/// When `changed` is false the input had no effect; `state` then equals the
/// input state (apart from recovering a player stranded in a vanished box)
/// and `effects` holds a single [`Effect::Bump`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: State,
    pub effects: Vec<Effect>,
    pub changed: bool,
}

/// Work area for a single transition.
pub struct Step {
    state: State,
    effects: Vec<Effect>,
    dir: Direction,
    player: Player,
    under: Option<EntityKind>,
}

/// Input rules for one player situation.
pub trait Handler {
    /// Whether these rules apply to `player` riding `under` (if anything).
    fn can_handle(&self, player: &Player, under: Option<EntityKind>) -> bool;

    /// Apply the input. Returns false, leaving the state untouched, if the
    /// move is not possible.
    fn handle_input(&self, step: &mut Step) -> bool;
}

struct Free;
struct InBox;
struct InHeavy;
struct InTri;
struct Stranded;

const HANDLERS: [&dyn Handler; 5] = [&Free, &InHeavy, &InTri, &InBox, &Stranded];

/// Apply a directional input to a state, producing a new state.
pub fn transition(state: &State, dir: Direction) -> Transition {
    let Some(player) = state.player().copied() else {
        return Transition {
            state: state.clone(),
            effects: Vec::new(),
            changed: false,
        };
    };
    let under = state.pushable_at(player.pos).map(|e| e.kind);

    let mut step = Step {
        state: state.clone(),
        effects: Vec::new(),
        dir,
        player,
        under,
    };

    let changed = HANDLERS
        .iter()
        .find(|handler| handler.can_handle(&player, under))
        .is_some_and(|handler| handler.handle_input(&mut step));

    step.finish(changed)
}

impl Step {
    fn finish(self, changed: bool) -> Transition {
        let mut effects = self.effects;
        if !changed {
            effects.clear();
            effects.push(Effect::Bump {
                pos: self.player.pos,
                direction: self.dir,
            });
        }
        Transition {
            state: self.state,
            effects,
            changed,
        }
    }

    fn target(&self) -> Option<Position> {
        self.state.move_position(self.player.pos, self.dir)
    }

    fn place_player(&mut self, to: Position, mode: PlayerMode) {
        let from = self.player.pos;
        self.player = Player { pos: to, mode };
        self.state.set_player(Some(self.player));
        self.effects.push(Effect::EntityMoved {
            actor: Actor::Player,
            from,
            to,
        });
    }

    fn set_entry(&mut self, entry: Option<Direction>) {
        self.player.mode = PlayerMode::InBox { entry };
        if let Some(player) = self.state.player_mut() {
            player.mode = self.player.mode;
        }
    }

    fn blocked_for_box(&self, target: Position) -> bool {
        self.state.get_tile(target).is_wall_for_box() || self.state.has_fixed_solid_at(target)
    }

    /// Input opposite to the ride direction, with room to take off.
    fn wants_reverse_flight(&self, target: Position) -> bool {
        self.player
            .entry()
            .is_some_and(|entry| entry.opposite() == self.dir)
            && !self.state.get_tile(target).is_wall_for_player()
            && !self.state.has_fixed_solid_at(target)
    }

    /// Leave the ridden box of `kind` in a glide along the input direction.
    fn launch(&mut self, kind: EntityKind) -> bool {
        let from = self.player.pos;
        let landing = flight::resolve_flight(&mut self.state, from, self.dir);
        self.place_player(landing.pos, landing.mode);
        self.effects.push(Effect::PlayerLaunched {
            from,
            to: landing.pos,
            direction: self.dir,
            distance: from.manhattan(landing.pos),
        });
        match landing.mode {
            PlayerMode::Free => self.effects.push(Effect::PlayerExitedBox {
                kind,
                pos: landing.pos,
                exit: self.dir,
            }),
            PlayerMode::InBox { .. } => {
                if let Some(rider) = self.state.pushable_at(landing.pos) {
                    self.effects.push(Effect::PlayerEnteredBox {
                        kind: rider.kind,
                        pos: landing.pos,
                        entry: self.dir,
                    });
                }
            }
        }
        self.effects.extend(landing.effects);
        true
    }

    /// Move the ridden box to `target` with the player inside.
    fn carry(&mut self, target: Position) {
        let from = self.player.pos;
        if let Some(moved) = self
            .state
            .move_entity_where(from, target, |e| e.kind.is_pushable())
        {
            self.effects.push(Effect::EntityMoved {
                actor: Actor::Entity(moved.kind),
                from,
                to: target,
            });
        }
        self.place_player(target, self.player.mode);
    }

    /// The ridden box falls into the box-hole at `target`; the player ends there.
    fn drop_into(&mut self, target: Position) {
        let from = self.player.pos;
        if let Some(fallen) = self
            .state
            .remove_entity_where(from, |e| e.kind.is_pushable())
        {
            self.effects.push(Effect::BoxFell {
                pos: target,
                kind: fallen.kind,
                player_inside: true,
            });
        }
        self.place_player(target, self.player.mode);
    }

    fn push_front_and_carry(&mut self, target: Position) -> bool {
        let Some(plan) = push::plan_push_chain(&self.state, target, self.dir) else {
            return false;
        };
        push::apply_push_chain(&mut self.state, &plan, self.dir, &mut self.effects);
        self.carry(target);
        true
    }

    /// Plain push of the ridden box, shared by every box kind.
    fn push_ridden(&mut self, target: Position) -> bool {
        if self.blocked_for_box(target) {
            return false;
        }
        if self.state.has_pushable_at(target) {
            return self.push_front_and_carry(target);
        }
        if self.state.get_tile(target).is_hole_for_box() {
            self.drop_into(target);
        } else {
            self.carry(target);
        }
        true
    }
}

impl Handler for Free {
    fn can_handle(&self, player: &Player, _under: Option<EntityKind>) -> bool {
        player.is_free()
    }

    fn handle_input(&self, step: &mut Step) -> bool {
        let Some(target) = step.target() else {
            return false;
        };
        if step.state.get_tile(target).is_wall_for_player() {
            return false;
        }

        if let Some(kind) = step.state.pushable_at(target).map(|e| e.kind) {
            let entry = step.dir;
            step.place_player(
                target,
                PlayerMode::InBox {
                    entry: Some(entry),
                },
            );
            step.effects.push(Effect::PlayerEnteredBox {
                kind,
                pos: target,
                entry,
            });
            return true;
        }

        if step.state.solid_at(target).is_some() {
            return false;
        }

        step.place_player(target, PlayerMode::Free);
        true
    }
}

impl Handler for InBox {
    fn can_handle(&self, player: &Player, under: Option<EntityKind>) -> bool {
        !player.is_free() && under == Some(EntityKind::Box)
    }

    fn handle_input(&self, step: &mut Step) -> bool {
        let Some(target) = step.target() else {
            return false;
        };
        if step.wants_reverse_flight(target) {
            return step.launch(EntityKind::Box);
        }
        step.push_ridden(target)
    }
}

impl Handler for InHeavy {
    fn can_handle(&self, player: &Player, under: Option<EntityKind>) -> bool {
        !player.is_free() && under == Some(EntityKind::HeavyBox)
    }

    fn handle_input(&self, step: &mut Step) -> bool {
        let Some(target) = step.target() else {
            return false;
        };
        if step.wants_reverse_flight(target) {
            return step.launch(EntityKind::HeavyBox);
        }

        let front_pushable = step.state.has_pushable_at(target);
        let hole = step.state.get_tile(target).is_hole_for_box();

        match step.player.entry() {
            // Forward along the ride axis
            Some(entry) if entry == step.dir => {
                if step.blocked_for_box(target) {
                    return false;
                }
                if front_pushable {
                    return step.push_front_and_carry(target);
                }
                step.set_entry(None);
                if hole {
                    step.drop_into(target);
                } else {
                    step.carry(target);
                    step.effects.push(Effect::HeavyNeutral {
                        pos: target,
                        neutral: true,
                    });
                }
                true
            }
            // Neutral: cannot push others, establishes a new axis
            None => {
                if front_pushable || step.blocked_for_box(target) {
                    return false;
                }
                step.set_entry(Some(step.dir.opposite()));
                step.effects.push(Effect::HeavyNeutral {
                    pos: step.player.pos,
                    neutral: false,
                });
                if hole {
                    step.drop_into(target);
                } else {
                    step.carry(target);
                }
                true
            }
            Some(_) => step.push_ridden(target),
        }
    }
}

impl Handler for InTri {
    fn can_handle(&self, player: &Player, under: Option<EntityKind>) -> bool {
        !player.is_free() && matches!(under, Some(EntityKind::TriBox(_)))
    }

    fn handle_input(&self, step: &mut Step) -> bool {
        let Some(EntityKind::TriBox(orient)) = step.under else {
            return false;
        };
        let kind = EntityKind::TriBox(orient);
        let Some(target) = step.target() else {
            return false;
        };
        if step.wants_reverse_flight(target) {
            return step.launch(kind);
        }

        let long_sides = orient.long_side_directions();
        let entered_from_long = step
            .player
            .entry()
            .is_some_and(|entry| long_sides.contains(&entry));
        if !entered_from_long && long_sides.contains(&step.dir) {
            if step.state.get_tile(target).is_wall_for_player() {
                return false;
            }
            return step.launch(kind);
        }

        step.push_ridden(target)
    }
}

impl Handler for Stranded {
    fn can_handle(&self, player: &Player, under: Option<EntityKind>) -> bool {
        !player.is_free() && under.is_none()
    }

    fn handle_input(&self, step: &mut Step) -> bool {
        warn!(
            "player at {} rides a box that no longer exists; resetting to free mode",
            step.player.pos
        );
        step.player.mode = PlayerMode::Free;
        step.state.set_player(Some(step.player));
        false
    }
}
