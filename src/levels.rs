use std::{fs, io, path::Path};

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    game::{Direction, EntityKind, Orientation, Player, PlayerMode, Position, State},
    tiles::Tile,
};

/// Error type for level loading operations.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid level: {0}")]
    InvalidLevel(String),
}

impl From<String> for LevelError {
    fn from(err: String) -> Self {
        LevelError::InvalidLevel(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub rows: usize,
    pub cols: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    pub dx: i32,
    pub dy: i32,
}

/// Sub-state of the player entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub entry_dir: Option<Delta>,
}

/// Sub-state of a triangular box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriRecord {
    #[serde(default)]
    pub orient: Option<Orientation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub x: i64,
    pub y: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<serde_json::Value>,
    #[serde(
        rename = "underTile",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub under_tile: Option<String>,
}

/// A level in the current document format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDocument {
    pub size: Size,
    pub base: Vec<Vec<String>>,
    pub entities: Vec<EntityRecord>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct Point {
    x: i64,
    y: i64,
}

#[derive(Debug, Clone, Deserialize)]
struct LegacyPlayer {
    x: i64,
    y: i64,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default, rename = "entryDir")]
    entry_dir: Option<Delta>,
}

/// Per-type entity lists used by older documents.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyLists {
    #[serde(default)]
    boxes: Option<Vec<Point>>,
    #[serde(default)]
    heavy_boxes: Option<Vec<Point>>,
    #[serde(default)]
    fragiles: Option<Vec<Point>>,
    #[serde(default)]
    player: Option<LegacyPlayer>,
}

/// Any accepted document shape, before normalization.
#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    size: Option<Size>,
    #[serde(default)]
    base: Option<Vec<Vec<String>>>,
    #[serde(default)]
    entities: Option<Vec<EntityRecord>>,
    #[serde(default)]
    dynamic: Option<LegacyLists>,
    #[serde(flatten)]
    legacy: LegacyLists,
}

impl RawDocument {
    fn into_document(self) -> Result<LevelDocument, LevelError> {
        let base = self
            .base
            .ok_or_else(|| LevelError::InvalidLevel("base missing".to_string()))?;
        let inferred = Size {
            rows: base.len(),
            cols: base.first().map_or(0, |row| row.len()),
        };
        let size = match self.size {
            Some(size) if size.rows > 0 && size.cols > 0 => {
                if size != inferred {
                    warn!(
                        "declared size {}x{} differs from grid {}x{}; using the grid",
                        size.cols, size.rows, inferred.cols, inferred.rows
                    );
                }
                inferred
            }
            _ => inferred,
        };

        let entities = match self.entities {
            Some(entities) => entities,
            None => {
                let lists = self.dynamic.unwrap_or(self.legacy);
                legacy_entities(lists)
            }
        };

        Ok(LevelDocument {
            size,
            base,
            entities,
        })
    }
}

fn legacy_entities(lists: LegacyLists) -> Vec<EntityRecord> {
    let record = |kind: &str, p: Point| EntityRecord {
        kind: kind.to_string(),
        x: p.x,
        y: p.y,
        state: None,
        under_tile: None,
    };

    let mut entities = Vec::new();
    entities.extend(lists.boxes.unwrap_or_default().into_iter().map(|p| record("box", p)));
    entities.extend(
        lists
            .heavy_boxes
            .unwrap_or_default()
            .into_iter()
            .map(|p| record("heavyBox", p)),
    );
    entities.extend(
        lists
            .fragiles
            .unwrap_or_default()
            .into_iter()
            .map(|p| record("fragileWall", p)),
    );
    if let Some(player) = lists.player {
        let state = PlayerRecord {
            mode: player.mode,
            entry_dir: player.entry_dir,
        };
        entities.push(EntityRecord {
            kind: "player".to_string(),
            x: player.x,
            y: player.y,
            state: serde_json::to_value(state).ok(),
            under_tile: None,
        });
    }
    entities
}

fn position(record: &EntityRecord, state: &State) -> Result<Position, LevelError> {
    let (x, y) = (record.x, record.y);
    if x < 0 || y < 0 || x >= state.width() as i64 || y >= state.height() as i64 {
        return Err(LevelError::InvalidLevel(format!(
            "{} at ({}, {}) is out of bounds",
            record.kind, x, y
        )));
    }
    Ok(Position(x as u8, y as u8))
}

fn tile_named(name: &str) -> Tile {
    Tile::from_name(name).unwrap_or_else(|| {
        warn!("unknown tile '{}', using floor", name);
        Tile::Floor
    })
}

fn player_mode(record: &EntityRecord) -> PlayerMode {
    let parsed = record
        .state
        .clone()
        .map(serde_json::from_value::<PlayerRecord>)
        .and_then(Result::ok);
    match parsed {
        Some(PlayerRecord {
            mode: Some(mode),
            entry_dir,
        }) if mode == "inbox" => PlayerMode::InBox {
            entry: entry_dir.and_then(|d| Direction::from_delta(d.dx, d.dy)),
        },
        _ => PlayerMode::Free,
    }
}

fn tri_orientation(record: &EntityRecord) -> Orientation {
    record
        .state
        .clone()
        .map(serde_json::from_value::<TriRecord>)
        .and_then(Result::ok)
        .and_then(|tri| tri.orient)
        .unwrap_or_default()
}

impl LevelDocument {
    /// Build the world state this document describes.
    pub fn to_state(&self) -> Result<State, LevelError> {
        let rows = self.base.len();
        let cols = self.base.first().map_or(0, |row| row.len());
        if let Some(y) = self.base.iter().position(|row| row.len() != cols) {
            return Err(LevelError::InvalidLevel(format!(
                "row {} has {} cells, expected {}",
                y,
                self.base[y].len(),
                cols
            )));
        }

        let mut state = State::new(cols, rows)?;
        for (y, row) in self.base.iter().enumerate() {
            for (x, name) in row.iter().enumerate() {
                state.set_tile(Position(x as u8, y as u8), tile_named(name));
            }
        }

        for record in &self.entities {
            let pos = position(record, &state)?;
            let kind = match record.kind.as_str() {
                "player" => {
                    if state.player().is_some() {
                        return Err(LevelError::InvalidLevel(
                            "Multiple players found".to_string(),
                        ));
                    }
                    state.set_player(Some(Player {
                        pos,
                        mode: player_mode(record),
                    }));
                    continue;
                }
                "box" => EntityKind::Box,
                "heavyBox" => EntityKind::HeavyBox,
                "triBox" => EntityKind::TriBox(tri_orientation(record)),
                "fragileWall" => EntityKind::FragileWall {
                    under: record.under_tile.as_deref().map(tile_named),
                },
                other => {
                    warn!("unknown entity type '{}' at {}, skipping", other, pos);
                    continue;
                }
            };
            state.add_entity(kind, pos)?;
        }

        Ok(state)
    }

    /// Describe a world state as a document.
    pub fn from_state(state: &State) -> Self {
        let width = state.width() as usize;
        let mut base = vec![Vec::with_capacity(width); state.height() as usize];
        for (pos, tile) in state.tiles() {
            base[pos.y() as usize].push(tile.name().to_string());
        }

        let mut entities = Vec::new();
        if let Some(player) = state.player() {
            let record = match player.mode {
                PlayerMode::Free => PlayerRecord {
                    mode: Some("free".to_string()),
                    entry_dir: Some(Delta { dx: 0, dy: 0 }),
                },
                PlayerMode::InBox { entry } => {
                    let (dx, dy) = entry.map_or((0, 0), |dir| dir.delta());
                    PlayerRecord {
                        mode: Some("inbox".to_string()),
                        entry_dir: Some(Delta {
                            dx: dx.into(),
                            dy: dy.into(),
                        }),
                    }
                }
            };
            entities.push(EntityRecord {
                kind: "player".to_string(),
                x: player.pos.x().into(),
                y: player.pos.y().into(),
                state: serde_json::to_value(record).ok(),
                under_tile: None,
            });
        }
        for entity in state.entities() {
            let (state, under_tile) = match entity.kind {
                EntityKind::TriBox(orient) => (
                    serde_json::to_value(TriRecord {
                        orient: Some(orient),
                    })
                    .ok(),
                    None,
                ),
                EntityKind::FragileWall { under } => {
                    (None, under.map(|tile| tile.name().to_string()))
                }
                EntityKind::Box | EntityKind::HeavyBox => (None, None),
            };
            entities.push(EntityRecord {
                kind: entity.kind.name().to_string(),
                x: entity.pos.x().into(),
                y: entity.pos.y().into(),
                state,
                under_tile,
            });
        }

        LevelDocument {
            size: Size {
                rows: state.height() as usize,
                cols: width,
            },
            base,
            entities,
        }
    }
}

/// Parse a level document in the current or a legacy format.
pub fn parse_level(json: &str) -> Result<State, LevelError> {
    let raw: RawDocument = serde_json::from_str(json)?;
    raw.into_document()?.to_state()
}

/// Serialize a world state as a pretty-printed level document.
pub fn level_to_json(state: &State) -> Result<String, LevelError> {
    Ok(serde_json::to_string_pretty(&LevelDocument::from_state(state))?)
}

/// A collection of levels.
#[derive(Debug)]
pub struct Levels {
    levels: Vec<State>,
}

impl Levels {
    /// Parse text-format levels from a string.
    ///
    /// Lines starting with `;` are comments that separate levels, as do
    /// empty lines.
    pub fn from_text(contents: &str) -> Result<Self, LevelError> {
        let mut levels = Vec::new();
        let mut current_level = String::new();

        for line in contents.lines() {
            if line.trim_start().starts_with(';') || line.is_empty() {
                if !current_level.is_empty() {
                    levels.push(State::from_text(current_level.trim_end_matches('\n'))?);
                    current_level.clear();
                }
                continue;
            }
            current_level.push_str(line);
            current_level.push('\n');
        }

        if !current_level.is_empty() {
            levels.push(State::from_text(current_level.trim_end_matches('\n'))?);
        }

        Ok(Levels { levels })
    }

    /// Parse one level document or an array of them.
    pub fn from_json(contents: &str) -> Result<Self, LevelError> {
        let value: serde_json::Value = serde_json::from_str(contents)?;
        let documents = match value {
            serde_json::Value::Array(items) => items,
            single => vec![single],
        };
        let levels = documents
            .into_iter()
            .map(|doc| {
                let raw: RawDocument = serde_json::from_value(doc)?;
                raw.into_document()?.to_state()
            })
            .collect::<Result<Vec<_>, LevelError>>()?;
        Ok(Levels { levels })
    }

    /// Load levels from a file; `.json` files hold documents, anything else text boards.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json(&contents)
        } else {
            Self::from_text(&contents)
        }
    }

    /// Get the nth level (0-indexed).
    pub fn get(&self, index: usize) -> Option<&State> {
        self.levels.get(index)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_basic() {
        let level1 = "#####
#@$_E#
######";

        let level2 = "#######
# H  o#
#@ 1  #
#######";

        let level3 = "####
#+F#
####";

        let content = format!("; 1\n\n{}\n\n; 2\n\n{}\n\n; 3\n{}\n", level1, level2, level3);
        let levels = Levels::from_text(&content).unwrap();

        assert_eq!(levels.len(), 3);
        assert_eq!(levels.get(0).unwrap().to_string().trim_end(), level1);
        assert_eq!(levels.get(1).unwrap().to_string().trim_end(), level2);
        assert_eq!(levels.get(2).unwrap().to_string().trim_end(), level3);
        assert!(levels.get(3).is_none());
    }

    #[test]
    fn test_from_text_invalid_level() {
        let content = "; 1

####
#@@ #
####
";
        let result = Levels::from_text(content);
        assert!(matches!(result.unwrap_err(), LevelError::InvalidLevel(_)));
    }

    #[test]
    fn test_from_file_no_file() {
        let result = Levels::from_file("nonexistent_file.txt");
        assert!(matches!(result.unwrap_err(), LevelError::Io(_)));
    }

    #[test]
    fn test_parse_document() {
        let json = r#"{
            "size": { "rows": 1, "cols": 5 },
            "base": [["wall", "floor", "pressurePlate", "exit", "wall"]],
            "entities": [
                { "type": "player", "x": 1, "y": 0,
                  "state": { "mode": "inbox", "entryDir": { "dx": 1, "dy": 0 } } },
                { "type": "box", "x": 1, "y": 0 },
                { "type": "triBox", "x": 2, "y": 0, "state": { "orient": "SW" } },
                { "type": "fragileWall", "x": 3, "y": 0, "underTile": "hole" }
            ]
        }"#;
        let state = parse_level(json).unwrap();

        assert_eq!(state.width(), 5);
        assert_eq!(state.get_tile(Position(2, 0)), Tile::PressurePlate);
        assert_eq!(
            state.player().unwrap().mode,
            PlayerMode::InBox {
                entry: Some(Direction::Right)
            }
        );
        assert_eq!(
            state.entity_at(Position(2, 0)).unwrap().kind,
            EntityKind::TriBox(Orientation::SW)
        );
        assert_eq!(
            state.entity_at(Position(3, 0)).unwrap().kind,
            EntityKind::FragileWall {
                under: Some(Tile::Hole)
            }
        );
    }

    #[test]
    fn test_parse_defaults() {
        // No size, player without state, tri box without orientation
        let json = r#"{
            "base": [["floor", "floor", "floor"]],
            "entities": [
                { "type": "player", "x": 0, "y": 0 },
                { "type": "triBox", "x": 2, "y": 0 }
            ]
        }"#;
        let state = parse_level(json).unwrap();
        assert_eq!(state.width(), 3);
        assert_eq!(state.height(), 1);
        assert!(state.player().unwrap().is_free());
        assert_eq!(
            state.entity_at(Position(2, 0)).unwrap().kind,
            EntityKind::TriBox(Orientation::NE)
        );
    }

    #[test]
    fn test_parse_inbox_neutral() {
        let json = r#"{
            "base": [["floor", "floor"]],
            "entities": [
                { "type": "heavyBox", "x": 1, "y": 0 },
                { "type": "player", "x": 1, "y": 0,
                  "state": { "mode": "inbox", "entryDir": { "dx": 0, "dy": 0 } } }
            ]
        }"#;
        let state = parse_level(json).unwrap();
        assert_eq!(
            state.player().unwrap().mode,
            PlayerMode::InBox { entry: None }
        );
    }

    #[test]
    fn test_parse_legacy_lists() {
        let json = r#"{
            "base": [["wall", "floor", "floor", "floor", "exit", "wall"]],
            "boxes": [{ "x": 2, "y": 0 }],
            "heavyBoxes": [{ "x": 3, "y": 0 }],
            "player": { "x": 1, "y": 0 }
        }"#;
        let state = parse_level(json).unwrap();
        assert_eq!(state.to_string().trim_end(), "#@$HE#");
    }

    #[test]
    fn test_parse_legacy_dynamic() {
        let json = r#"{
            "base": [["floor", "floor", "floor"]],
            "dynamic": {
                "fragiles": [{ "x": 2, "y": 0 }],
                "player": { "x": 0, "y": 0, "mode": "free" }
            }
        }"#;
        let state = parse_level(json).unwrap();
        assert_eq!(state.to_string().trim_end(), "@ F");
        assert_eq!(
            state.entity_at(Position(2, 0)).unwrap().kind,
            EntityKind::FragileWall { under: None }
        );
    }

    #[test]
    fn test_missing_base() {
        let result = parse_level(r#"{ "entities": [] }"#);
        assert!(matches!(result.unwrap_err(), LevelError::InvalidLevel(_)));
    }

    #[test]
    fn test_malformed_json() {
        let result = parse_level("{ base: ");
        assert!(matches!(result.unwrap_err(), LevelError::Json(_)));
    }

    #[test]
    fn test_ragged_rows() {
        let result = parse_level(r#"{ "base": [["floor", "floor"], ["floor"]] }"#);
        assert!(matches!(result.unwrap_err(), LevelError::InvalidLevel(_)));
    }

    #[test]
    fn test_entity_out_of_bounds() {
        let json = r#"{
            "base": [["floor", "floor"]],
            "entities": [{ "type": "box", "x": 2, "y": 0 }]
        }"#;
        assert!(matches!(
            parse_level(json).unwrap_err(),
            LevelError::InvalidLevel(_)
        ));
    }

    #[test]
    fn test_unknown_tile_falls_back_to_floor() {
        let json = r#"{ "base": [["wall", "lava", "exit"]] }"#;
        let state = parse_level(json).unwrap();
        assert_eq!(state.get_tile(Position(1, 0)), Tile::Floor);
    }

    #[test]
    fn test_document_round_trip() {
        let mut state = State::from_text("#_ 3H%#\n#& E=o#").unwrap();
        state
            .add_entity(
                EntityKind::FragileWall {
                    under: Some(Tile::Exit),
                },
                Position(2, 0),
            )
            .unwrap();

        let json = level_to_json(&state).unwrap();
        assert_eq!(parse_level(&json).unwrap(), state);
    }

    #[test]
    fn test_document_shape() {
        let state = State::from_text("#@1").unwrap();
        let json: serde_json::Value = serde_json::from_str(&level_to_json(&state).unwrap()).unwrap();
        assert_eq!(json["size"]["rows"], 1);
        assert_eq!(json["size"]["cols"], 3);
        assert_eq!(json["base"][0][0], "wall");
        assert_eq!(json["entities"][0]["type"], "player");
        assert_eq!(json["entities"][0]["state"]["mode"], "free");
        assert_eq!(json["entities"][1]["type"], "triBox");
        assert_eq!(json["entities"][1]["state"]["orient"], "NE");
    }

    #[test]
    fn test_from_json_array() {
        let json = r#"[
            { "base": [["floor"]] },
            { "base": [["wall", "exit"]] }
        ]"#;
        let levels = Levels::from_json(json).unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels.get(1).unwrap().width(), 2);
    }
}
