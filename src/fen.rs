//! FEN-style position codec.
//!
//! Seven rank rows, `/`-separated, listed top (rank 6) to bottom
//! (rank 0), followed by a space and the side-to-move letter.

use crate::basetypes::{square_of, Height, Side, BOARD_SIZE};
use crate::error::EngineError;
use crate::position::Position;

pub fn from_fen(text: &str) -> Result<Position, EngineError> {
    let mut parts = text.split_whitespace();
    let board = parts
        .next()
        .ok_or_else(|| EngineError::InvalidFen(text.to_string()))?;
    let stm = parts
        .next()
        .ok_or_else(|| EngineError::InvalidFen(text.to_string()))?;
    if parts.next().is_some() {
        return Err(EngineError::InvalidFen(text.to_string()));
    }

    let rows: Vec<&str> = board.split('/').collect();
    if rows.len() != BOARD_SIZE as usize {
        return Err(EngineError::InvalidFen(text.to_string()));
    }

    let mut pos = Position::empty();
    for (row_index, row) in rows.iter().enumerate() {
        let rank = BOARD_SIZE - 1 - row_index as u8;
        let mut file = 0u8;
        let mut chars = row.chars().peekable();
        while let Some(c) = chars.next() {
            if file >= BOARD_SIZE {
                return Err(EngineError::InvalidFen(text.to_string()));
            }
            if let Some(empty_count) = c.to_digit(10) {
                file += empty_count as u8;
                continue;
            }
            let square = square_of(rank, file);
            match c {
                'r' | 'b' => {
                    let side = if c == 'r' { Side::Red } else { Side::Blue };
                    let height: Height = match chars.peek() {
                        Some(d) if d.is_ascii_digit() => {
                            let digit = chars.next().unwrap().to_digit(10).unwrap() as Height;
                            digit
                        }
                        _ => 1,
                    };
                    if !(1..=7).contains(&height) {
                        return Err(EngineError::InvalidFen(text.to_string()));
                    }
                    pos.set_tower(side, square, height);
                    file += 1;
                }
                'R' | 'B' => {
                    match chars.next() {
                        Some('G') => {}
                        _ => return Err(EngineError::InvalidFen(text.to_string())),
                    }
                    let side = if c == 'R' { Side::Red } else { Side::Blue };
                    pos.set_guard(side, square);
                    file += 1;
                }
                _ => return Err(EngineError::InvalidFen(text.to_string())),
            }
        }
        if file != BOARD_SIZE {
            return Err(EngineError::InvalidFen(text.to_string()));
        }
    }

    let side = match stm {
        "r" => Side::Red,
        "b" => Side::Blue,
        _ => return Err(EngineError::InvalidFen(text.to_string())),
    };
    pos.set_side_to_move(side);
    pos.recompute_hash();
    Ok(pos)
}

pub fn to_fen(pos: &Position) -> String {
    let mut rows = Vec::with_capacity(BOARD_SIZE as usize);
    for row_index in 0..BOARD_SIZE {
        let rank = BOARD_SIZE - 1 - row_index;
        let mut row = String::new();
        let mut empty_run = 0u8;
        for file in 0..BOARD_SIZE {
            let square = square_of(rank, file);
            match pos.occupant_at(square) {
                crate::position::Occupant::Empty => empty_run += 1,
                crate::position::Occupant::Guard(side) => {
                    if empty_run > 0 {
                        row.push_str(&empty_run.to_string());
                        empty_run = 0;
                    }
                    row.push(if matches!(side, Side::Red) { 'R' } else { 'B' });
                    row.push('G');
                }
                crate::position::Occupant::Tower(side, height) => {
                    if empty_run > 0 {
                        row.push_str(&empty_run.to_string());
                        empty_run = 0;
                    }
                    row.push(if matches!(side, Side::Red) { 'r' } else { 'b' });
                    row.push_str(&height.to_string());
                }
            }
        }
        if empty_run > 0 {
            row.push_str(&empty_run.to_string());
        }
        rows.push(row);
    }
    let board = rows.join("/");
    let stm = if matches!(pos.side_to_move(), Side::Red) {
        "r"
    } else {
        "b"
    };
    format!("{} {}", board, stm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_initial_layout() {
        let fen = "r1r11RG1r1r1/2r11r12/3r13/7/3b13/2b11b12/b1b11BG1b1b1 r";
        let pos = from_fen(fen).unwrap();
        assert_eq!(to_fen(&pos), fen);
    }

    #[test]
    fn roundtrips_sparse_position() {
        let fen = "3RG3/7/7/7/7/7/7 r";
        let pos = from_fen(fen).unwrap();
        assert_eq!(to_fen(&pos), fen);
        assert!(pos.is_terminal());
    }

    #[test]
    fn rejects_bad_row_count() {
        assert!(from_fen("7/7/7 r").is_err());
    }

    #[test]
    fn rejects_bad_row_width() {
        assert!(from_fen("8/7/7/7/7/7/7 r").is_err());
    }

    #[test]
    fn rejects_unknown_char() {
        assert!(from_fen("7/7/7/7/7/7/zzzzzzz r").is_err());
    }

    #[test]
    fn forced_capture_scenario_roundtrips() {
        let fen = "7/3BG3/7/3r23/3RG3/7/7 r";
        let pos = from_fen(fen).unwrap();
        assert_eq!(to_fen(&pos), fen);
    }
}
