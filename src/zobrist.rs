use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    game::{Entity, EntityKind, Player, PlayerMode, Position, State},
    tiles::{TILE_COUNT, Tile},
};

pub type Fingerprint = u64;

// Key layout: one salt per (key, cell).
const BOX_KEY: usize = TILE_COUNT;
const HEAVY_KEY: usize = BOX_KEY + 1;
const TRI_KEY: usize = HEAVY_KEY + 1; // + orientation index
const FRAGILE_KEY: usize = TRI_KEY + 4;
const PLAYER_FREE_KEY: usize = FRAGILE_KEY + 1;
const PLAYER_INBOX_KEY: usize = PLAYER_FREE_KEY + 1; // + direction index, 4 = neutral
const NUM_KEYS: usize = PLAYER_INBOX_KEY + 5;

/// Zobrist hash for world states, valid within one solving session.
///
/// Every cell contributes its tile type, so a fragile wall breaking changes
/// the fingerprint even when no entity moves.
pub struct Zobrist {
    width: usize,
    height: usize,
    salt: u64,
    table: Vec<u64>,
}

impl Zobrist {
    /// Build a table for boards of the given size from a fixed seed.
    pub fn new(width: usize, height: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let salt = rng.next_u64();
        let table = (0..NUM_KEYS * width * height)
            .map(|_| rng.next_u64())
            .collect();
        Zobrist {
            width,
            height,
            salt,
            table,
        }
    }

    /// Build a table with a fresh random seed.
    pub fn from_entropy(width: usize, height: usize) -> Self {
        Self::new(width, height, rand::thread_rng().next_u64())
    }

    fn key_hash(&self, key: usize, pos: Position) -> u64 {
        let cell = pos.1 as usize * self.width + pos.0 as usize;
        self.table[key * self.width * self.height + cell]
    }

    pub fn tile_hash(&self, pos: Position, tile: Tile) -> u64 {
        self.key_hash(tile.index(), pos)
    }

    pub fn entity_hash(&self, entity: &Entity) -> u64 {
        let key = match entity.kind {
            EntityKind::Box => BOX_KEY,
            EntityKind::HeavyBox => HEAVY_KEY,
            EntityKind::TriBox(orient) => TRI_KEY + orient.index(),
            EntityKind::FragileWall { .. } => FRAGILE_KEY,
        };
        self.key_hash(key, entity.pos)
    }

    /// Hash of the player's cell, mode and ride direction.
    pub fn player_hash(&self, player: &Player) -> u64 {
        let key = match player.mode {
            PlayerMode::Free => PLAYER_FREE_KEY,
            PlayerMode::InBox { entry: Some(dir) } => PLAYER_INBOX_KEY + dir.index(),
            PlayerMode::InBox { entry: None } => PLAYER_INBOX_KEY + 4,
        };
        self.key_hash(key, player.pos)
    }

    /// Compute the fingerprint of a whole state.
    pub fn fingerprint(&self, state: &State) -> Fingerprint {
        debug_assert_eq!(state.width() as usize, self.width);
        debug_assert_eq!(state.height() as usize, self.height);

        let mut hash = self.salt;
        for (pos, tile) in state.tiles() {
            hash ^= self.tile_hash(pos, tile);
        }
        for entity in state.entities() {
            hash ^= self.entity_hash(entity);
        }
        if let Some(player) = state.player() {
            hash ^= self.player_hash(player);
        }
        hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::transition,
        game::{Direction, Orientation},
    };

    fn zobrist_for(state: &State) -> Zobrist {
        Zobrist::new(state.width() as usize, state.height() as usize, 7)
    }

    #[test]
    fn test_equal_states_equal_fingerprints() {
        let a = State::from_text("#@$ H1#").unwrap();
        let b = State::from_text("#@$ H1#").unwrap();
        let z = zobrist_for(&a);
        assert_eq!(z.fingerprint(&a), z.fingerprint(&b));
    }

    #[test]
    fn test_entity_order_does_not_matter() {
        let mut a = State::new(4, 1).unwrap();
        a.add_entity(EntityKind::Box, Position(1, 0)).unwrap();
        a.add_entity(EntityKind::HeavyBox, Position(2, 0)).unwrap();

        let mut b = State::new(4, 1).unwrap();
        b.add_entity(EntityKind::HeavyBox, Position(2, 0)).unwrap();
        b.add_entity(EntityKind::Box, Position(1, 0)).unwrap();

        let z = zobrist_for(&a);
        assert_eq!(z.fingerprint(&a), z.fingerprint(&b));
    }

    #[test]
    fn test_distinguishes_entity_types_and_positions() {
        let z = Zobrist::new(5, 1, 7);
        let states = ["#@$ #", "#@ $#", "#@H #", "#@1 #", "#@2 #", "#@F #", "# @$#"];
        let mut fingerprints: Vec<u64> = states
            .iter()
            .map(|text| z.fingerprint(&State::from_text(text).unwrap()))
            .collect();
        fingerprints.sort();
        fingerprints.dedup();
        assert_eq!(fingerprints.len(), states.len());
    }

    #[test]
    fn test_distinguishes_ride_direction() {
        let base = State::from_text("# & #").unwrap();
        let z = zobrist_for(&base);
        let pos = Position(2, 0);

        let mut fingerprints = vec![z.fingerprint(&base)];
        for dir in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            let mut state = base.clone();
            state.set_player(Some(Player {
                pos,
                mode: PlayerMode::InBox { entry: Some(dir) },
            }));
            fingerprints.push(z.fingerprint(&state));
        }
        let mut free = base.clone();
        free.set_player(Some(Player::free(pos)));
        fingerprints.push(z.fingerprint(&free));

        fingerprints.sort();
        fingerprints.dedup();
        assert_eq!(fingerprints.len(), 6);
    }

    #[test]
    fn test_distinguishes_broken_fragile_tile() {
        // Same entities and player, only the tile under (1, 0) differs
        let intact = State::from_text("#%@  #").unwrap();
        let mut broken = intact.clone();
        broken.set_tile(Position(1, 0), Tile::Floor);

        let z = zobrist_for(&intact);
        assert_ne!(z.fingerprint(&intact), z.fingerprint(&broken));
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let state = State::from_text("#@$ 3#").unwrap();
        let a = Zobrist::new(6, 1, 42);
        let b = Zobrist::new(6, 1, 42);
        assert_eq!(a.fingerprint(&state), b.fingerprint(&state));
    }

    #[test]
    fn test_round_trip_moves_return_same_fingerprint() {
        let state = State::from_text("#  @  #").unwrap();
        let z = zobrist_for(&state);
        let left = transition(&state, Direction::Left).state;
        let back = transition(&left, Direction::Right).state;
        assert_eq!(z.fingerprint(&state), z.fingerprint(&back));
        assert_ne!(z.fingerprint(&state), z.fingerprint(&left));
    }

    #[test]
    fn test_tri_orientation_matters() {
        let mut a = State::new(3, 1).unwrap();
        a.add_entity(EntityKind::TriBox(Orientation::NE), Position(1, 0))
            .unwrap();
        let mut b = State::new(3, 1).unwrap();
        b.add_entity(EntityKind::TriBox(Orientation::SW), Position(1, 0))
            .unwrap();
        let z = zobrist_for(&a);
        assert_ne!(z.fingerprint(&a), z.fingerprint(&b));
    }
}
