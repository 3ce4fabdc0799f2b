use crate::game::{PlayerMode, State};

/// The exit opens once every pressure plate holds a pushable.
pub fn exit_active(state: &State) -> bool {
    state
        .tiles()
        .filter(|(_, tile)| tile.requires_box())
        .all(|(pos, _)| state.has_pushable_at(pos))
}

/// The player stands on an open exit, outside any box.
pub fn is_winning(state: &State) -> bool {
    let Some(player) = state.player() else {
        return false;
    };
    player.is_free() && state.get_tile(player.pos).is_end() && exit_active(state)
}

/// The player dropped into a hole, on foot or together with its box.
pub fn is_losing(state: &State) -> bool {
    let Some(player) = state.player() else {
        return false;
    };
    let tile = state.get_tile(player.pos);
    match player.mode {
        PlayerMode::Free => tile.is_hole_for_player(),
        PlayerMode::InBox { .. } => tile.is_hole_for_box(),
    }
}
