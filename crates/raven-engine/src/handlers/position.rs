//! Directional comparison of position labels
//!
//! Labels belong to one of five layout families. Within the nine-cell
//! grid, the two halves layouts and the inner 2x2 quadrants, a pair of
//! distinct labels is answered from cell coordinates. Nested layouts
//! answer `Outside` / `Inside` between the outer frame and anything in
//! the inner part. Every other pair is unmapped and fails loudly.

use crate::error::{EngineError, EngineResult};
use raven_scene::OUTER_PART;
use std::cmp::Ordering;

/// Every position label produced by the supported layouts
pub const POSITION_LABELS: [&str; 20] = [
    "center",
    "top-left",
    "top-center",
    "top-right",
    "middle-left",
    "middle-center",
    "middle-right",
    "bottom-left",
    "bottom-center",
    "bottom-right",
    "left",
    "right",
    "top",
    "bottom",
    "inner-part",
    "outer-part",
    "top-left of the inner part",
    "top-right of the inner part",
    "bottom-left of the inner part",
    "bottom-right of the inner part",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Grid(i8, i8),
    Halves(i8),
    Stacked(i8),
    Quadrant(i8, i8),
    InnerPart,
    Outer,
}

fn placement(label: &str) -> Option<Placement> {
    if label == OUTER_PART {
        return Some(Placement::Outer);
    }
    if label == "inner-part" {
        return Some(Placement::InnerPart);
    }
    match label {
        "left" => return Some(Placement::Halves(0)),
        "right" => return Some(Placement::Halves(1)),
        "top" => return Some(Placement::Stacked(0)),
        "bottom" => return Some(Placement::Stacked(1)),
        "center" => return Some(Placement::Grid(1, 1)),
        _ => {}
    }
    if let Some(corner) = label.strip_suffix(" of the inner part") {
        let (row, col) = cell(corner)?;
        return (row != 1 && col != 1).then(|| Placement::Quadrant(col / 2, row / 2));
    }
    let (row, col) = cell(label)?;
    Some(Placement::Grid(col, row))
}

/// `(row, col)` of a `<row>-<col>` grid label
fn cell(label: &str) -> Option<(i8, i8)> {
    let (row, col) = label.split_once('-')?;
    let row = match row {
        "top" => 0,
        "middle" => 1,
        "bottom" => 2,
        _ => return None,
    };
    let col = match col {
        "left" => 0,
        "center" => 1,
        "right" => 2,
        _ => return None,
    };
    Some((row, col))
}

fn direction(dx: Ordering, dy: Ordering) -> Option<&'static str> {
    use Ordering::{Equal, Greater, Less};
    Some(match (dx, dy) {
        (Less, Equal) => "Left",
        (Greater, Equal) => "Right",
        (Equal, Less) => "Above",
        (Equal, Greater) => "Below",
        (Less, Less) => "Left and above",
        (Greater, Less) => "Right and above",
        (Less, Greater) => "Left and below",
        (Greater, Greater) => "Right and below",
        (Equal, Equal) => return None,
    })
}

/// Direction of the first label as seen from the second
///
/// # Errors
///
/// [`EngineError::UnmappedPositionPair`] for identical cells, unknown
/// labels and pairs from different layout families.
pub fn compare_positions(from: &str, to: &str) -> EngineResult<&'static str> {
    let unmapped = || EngineError::unmapped_position(from, to);
    let (a, b) = placement(from).zip(placement(to)).ok_or_else(unmapped)?;
    let found = match (a, b) {
        (Placement::Grid(ax, ay), Placement::Grid(bx, by))
        | (Placement::Quadrant(ax, ay), Placement::Quadrant(bx, by)) => direction(ax.cmp(&bx), ay.cmp(&by)),
        (Placement::Halves(ax), Placement::Halves(bx)) => direction(ax.cmp(&bx), Ordering::Equal),
        (Placement::Stacked(ay), Placement::Stacked(by)) => direction(Ordering::Equal, ay.cmp(&by)),
        (Placement::Outer, Placement::InnerPart | Placement::Quadrant(..)) => Some("Outside"),
        (Placement::InnerPart | Placement::Quadrant(..), Placement::Outer) => Some("Inside"),
        _ => None,
    };
    found.ok_or_else(unmapped)
}
