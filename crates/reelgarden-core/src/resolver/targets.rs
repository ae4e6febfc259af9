//! Candidate target selection by location rule.

use crate::grid::{GridPosition, GridTopology};
use crate::symbol::LocationRule;

/// Cells an effect at `source` may act on, before key filtering.
///
/// `SelfCorner` yields the source itself only while it sits on a grid
/// corner; every other rule excludes the source.
#[must_use]
pub fn candidates(
    grid: GridTopology,
    rule: LocationRule,
    source: GridPosition,
) -> Vec<GridPosition> {
    match rule {
        LocationRule::Anywhere => grid.positions().filter(|&p| p != source).collect(),
        LocationRule::Adjacent => grid.adjacent(source),
        LocationRule::SameRow => grid.same_row(source),
        LocationRule::SameColumn => grid.same_column(source),
        LocationRule::SelfCorner if grid.is_corner(source) => vec![source],
        LocationRule::SelfCorner => Vec::new(),
    }
}
