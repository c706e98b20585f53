//! Plain-text map renderer for the console.

use std::fmt::Write;

use crate::town::grid::{Coord, Field, TreeKind, HEIGHT, WIDTH};
use crate::town::roster::Faction;
use crate::town::state::Town;

/// Glyph for a cell as seen by the player.
#[must_use]
pub(crate) fn glyph(town: &Town, at: Coord) -> char {
    if town.is_hidden(at) {
        return '#';
    }
    if let Some(index) = town.mercenary_at(at) {
        return match town.mercenaries()[index].faction {
            Faction::Town => 'm',
            Faction::Raider => 'r',
        };
    }
    match town.field(at).unwrap_or_default() {
        Field::Empty => '.',
        Field::Tree(TreeKind::Oak) => 'T',
        Field::Tree(TreeKind::Pine) => 'P',
        Field::Tree(TreeKind::Birch) => 'B',
        Field::Administration => 'A',
        Field::Construction => '+',
        Field::Quarry => 'Q',
    }
}

/// Glyphs of the whole map, one row per `y`.
#[must_use]
pub(crate) fn glyph_rows(town: &Town) -> Vec<Vec<char>> {
    (0..HEIGHT)
        .map(|y| {
            (0..WIDTH)
                .map(|x| {
                    let at = Coord::new(
                        u16::try_from(x).unwrap_or(u16::MAX),
                        u16::try_from(y).unwrap_or(u16::MAX),
                    );
                    glyph(town, at)
                })
                .collect()
        })
        .collect()
}

/// Render the town as a framed character map with a column ruler.
///
/// Output format:
/// ```text
///    0 1 2 3 4 5 6 7 8 9 0 1 2 3 4
///  0 # # # # # # # # # # # # # # #
///  ...
///  7 # # # # . . . A . . . # # # #
/// Legend: #=unexplored .=empty T/P/B=trees A=administration +=site Q=quarry m=mercenary r=raider
/// ```
#[must_use]
pub fn render_ascii(town: &Town) -> String {
    let mut output = String::from("   ");
    for x in 0..WIDTH {
        let _ = write!(output, "{} ", x % 10);
    }
    output.push('\n');

    for (y, row) in glyph_rows(town).into_iter().enumerate() {
        let _ = write!(output, "{y:>2} ");
        for cell in row {
            output.push(cell);
            output.push(' ');
        }
        output.truncate(output.trim_end().len());
        output.push('\n');
    }

    output.push_str(
        "Legend: #=unexplored .=empty T/P/B=trees A=administration +=site Q=quarry m=mercenary r=raider\n",
    );
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::town::generate;

    #[test]
    fn test_render_shape() {
        let town = generate(0, 3).unwrap();
        let text = render_ascii(&town);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), HEIGHT + 2);
        assert!(lines[8].contains('A'));
        assert!(lines[1].starts_with(" 0 #"));
    }

    #[test]
    fn test_mercenary_glyphs() {
        let mut town = Town::new(0).unwrap();
        town.spawn_mercenary(0, Coord::new(1, 1), Faction::Town).unwrap();
        town.spawn_mercenary(0, Coord::new(2, 1), Faction::Raider).unwrap();
        assert_eq!(glyph(&town, Coord::new(1, 1)), 'm');
        assert_eq!(glyph(&town, Coord::new(2, 1)), 'r');
        town.set_hidden(Coord::new(2, 1), true);
        assert_eq!(glyph(&town, Coord::new(2, 1)), '#');
    }
}
