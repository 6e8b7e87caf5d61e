use serde::Serialize;

use crate::core::{grid::CellPos, piece::Piece, piece::PieceKind};

/// Everything a game reports to its renderer, audio and persistence collaborators.
///
/// Events carry copies, never references into the game state. Serialised with an
/// `event` tag:
///
/// ```
/// use tetrecs_engine::GameEvent;
///
/// let json = serde_json::to_string(&GameEvent::LifeLost { lives: 2 }).unwrap();
/// assert_eq!(json, r#"{"event":"life_lost","lives":2}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_more::IsVariant)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    GameStarted,
    PieceQueueChanged { current: Piece, next: Piece },
    PieceRotated { current: Piece },
    PiecePlaced { x: usize, y: usize, kind: PieceKind },
    CellsCleared { cells: Vec<CellPos> },
    StatsChanged {
        score: usize,
        level: usize,
        lives: u8,
        multiplier: u32,
    },
    LevelUp { level: usize },
    LifeLost { lives: u8 },
    DelayChanged { delay_ms: u64 },
    CursorMoved { x: usize, y: usize },
    HighScoreBeaten { score: usize },
    GameOver { final_score: usize },
    /// A command could not be applied. Only the command loop emits this.
    CommandRejected { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_and_struct_variants_serialize_with_tag() {
        assert_eq!(
            serde_json::to_string(&GameEvent::GameStarted).unwrap(),
            r#"{"event":"game_started"}"#
        );
        assert_eq!(
            serde_json::to_string(&GameEvent::CellsCleared {
                cells: vec![CellPos::new(0, 1), CellPos::new(2, 1)],
            })
            .unwrap(),
            r#"{"event":"cells_cleared","cells":[{"x":0,"y":1},{"x":2,"y":1}]}"#
        );
        assert_eq!(
            serde_json::to_string(&GameEvent::PieceRotated {
                current: Piece::new(PieceKind::Dot),
            })
            .unwrap(),
            r#"{"event":"piece_rotated","current":{"kind":"Dot","footprint":["...",".#.","..."]}}"#
        );
    }

    #[test]
    fn test_is_variant_helpers() {
        assert!(GameEvent::GameOver { final_score: 10 }.is_game_over());
        assert!(!GameEvent::GameStarted.is_game_over());
    }
}
