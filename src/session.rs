use thiserror::Error;

use crate::{
    effects::Effect,
    engine::{Transition, transition},
    game::{Direction, State},
    goals,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("unknown move '{code}' at index {index}")]
    UnknownMove { index: usize, code: char },
}

/// Parse a move string of `d`/`a`/`w`/`s` codes.
pub fn parse_moves(moves: &str) -> Result<Vec<Direction>, ReplayError> {
    moves
        .chars()
        .enumerate()
        .map(|(index, code)| {
            Direction::from_code(code).ok_or(ReplayError::UnknownMove { index, code })
        })
        .collect()
}

/// Play a move string from `state`, returning the final state.
pub fn replay(state: &State, moves: &str) -> Result<State, ReplayError> {
    let mut session = Session::new(state.clone());
    session.play(moves)?;
    Ok(session.state().clone())
}

/// A play-through of one level with undo history.
#[derive(Debug, Clone)]
pub struct Session {
    initial: State,
    current: State,
    history: Vec<State>,
}

impl Session {
    pub fn new(initial: State) -> Self {
        Session {
            current: initial.clone(),
            initial,
            history: Vec::new(),
        }
    }

    pub fn state(&self) -> &State {
        &self.current
    }

    /// Number of moves that changed the state, net of undos.
    pub fn moves(&self) -> usize {
        self.history.len()
    }

    /// Apply one input. A move that changes nothing is not recorded.
    pub fn apply(&mut self, dir: Direction) -> Transition {
        let next = transition(&self.current, dir);
        if next.changed {
            let previous = std::mem::replace(&mut self.current, next.state.clone());
            self.history.push(previous);
        }
        next
    }

    /// Apply every move of a move string, returning the effects of each step.
    ///
    /// Stops at the first unknown code; moves before it stay applied.
    pub fn play(&mut self, moves: &str) -> Result<Vec<Vec<Effect>>, ReplayError> {
        let mut steps = Vec::new();
        for (index, code) in moves.chars().enumerate() {
            let dir =
                Direction::from_code(code).ok_or(ReplayError::UnknownMove { index, code })?;
            steps.push(self.apply(dir).effects);
        }
        Ok(steps)
    }

    /// Step back one move. Returns false if there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.current = previous;
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        self.current = self.initial.clone();
        self.history.clear();
    }

    pub fn is_won(&self) -> bool {
        goals::is_winning(&self.current)
    }

    pub fn is_lost(&self) -> bool {
        goals::is_losing(&self.current)
    }
}
