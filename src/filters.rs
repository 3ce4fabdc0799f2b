use serde::{Deserialize, Serialize};

/// A move string in `wasd` codes together with its length in moves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveSequence {
    pub moves: String,
    pub length: usize,
}

impl MoveSequence {
    pub fn new(moves: String) -> Self {
        let length = moves.chars().count();
        MoveSequence { moves, length }
    }
}

/// Whether the Levenshtein distance between `a` and `b` is at most `limit`.
///
/// Only the diagonal band of width `2 * limit + 1` is evaluated, and the scan
/// gives up as soon as a whole row exceeds the limit.
pub fn edit_distance_at_most(a: &[u8], b: &[u8], limit: usize) -> bool {
    if a == b {
        return true;
    }
    let (a, b) = if a.len() > b.len() { (b, a) } else { (a, b) };
    if b.len() - a.len() > limit {
        return false;
    }

    let over = limit + 1;
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![over; b.len() + 1];

    for i in 1..=a.len() {
        let lo = i.saturating_sub(limit).max(1);
        let hi = (i + limit).min(b.len());

        // The buffer still holds row i - 2; only the band and its two
        // neighbours are read, so only those are reset.
        curr[0] = i;
        if lo > 1 {
            curr[lo - 1] = over;
        }
        if hi < b.len() {
            curr[hi + 1] = over;
        }
        let mut row_min = if lo == 1 { curr[0] } else { over };
        for j in lo..=hi {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let value = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
            curr[j] = value.min(over);
            row_min = row_min.min(curr[j]);
        }
        if row_min > limit {
            return false;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()] <= limit
}

/// Keep the shortest representatives of groups of near-identical sequences.
///
/// Entries are sorted by length then lexicographically; an entry is dropped
/// when a kept entry of equal or shorter length lies within `max_edits`.
pub fn filter_near_duplicates(entries: &[MoveSequence], max_edits: usize) -> Vec<MoveSequence> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| a.length.cmp(&b.length).then_with(|| a.moves.cmp(&b.moves)));

    let mut kept: Vec<MoveSequence> = Vec::new();
    for entry in sorted {
        let clash = kept.iter().any(|k| {
            entry.length - k.length <= max_edits
                && edit_distance_at_most(entry.moves.as_bytes(), k.moves.as_bytes(), max_edits)
        });
        if !clash {
            kept.push(entry);
        }
    }
    kept
}
