//! Terrain is derived from coordinates, never stored (`spec.md` §3).
//!
//! Columns 0-2 are sea. Rows 5-6 are river. The four reef squares at
//! (5,5), (5,6), (7,5), (7,6) sit inside the river and are navigable by
//! certain land pieces. Everything else is land.

use super::coords::Coord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terrain {
    Sea,
    River,
    Land,
}

pub const REEF_SQUARES: [(i32, i32); 4] = [(5, 5), (5, 6), (7, 5), (7, 6)];

impl Terrain {
    pub fn of(coord: &Coord) -> Terrain {
        if coord.col <= 2 {
            Terrain::Sea
        } else if coord.row == 5 || coord.row == 6 {
            Terrain::River
        } else {
            Terrain::Land
        }
    }
}

pub fn is_sea(coord: &Coord) -> bool {
    Terrain::of(coord) == Terrain::Sea
}

pub fn is_river(coord: &Coord) -> bool {
    Terrain::of(coord) == Terrain::River
}

pub fn is_reef(coord: &Coord) -> bool {
    REEF_SQUARES.contains(&(coord.col, coord.row))
}

pub fn is_land(coord: &Coord) -> bool {
    Terrain::of(coord) == Terrain::Land
}

/// River squares a navy unit can swim through (river or sea); land pieces may
/// only cross a river square via a reef, or by being ferried (`carry.rs`).
pub fn is_navigable_by_water(coord: &Coord) -> bool {
    matches!(Terrain::of(coord), Terrain::Sea | Terrain::River)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sea_is_low_columns() {
        assert_eq!(Terrain::of(&Coord::new(0, 4)), Terrain::Sea);
        assert_eq!(Terrain::of(&Coord::new(2, 11)), Terrain::Sea);
        assert_ne!(Terrain::of(&Coord::new(3, 4)), Terrain::Sea);
    }

    #[test]
    fn river_is_rows_five_and_six() {
        assert_eq!(Terrain::of(&Coord::new(5, 5)), Terrain::River);
        assert_eq!(Terrain::of(&Coord::new(8, 6)), Terrain::River);
        assert_ne!(Terrain::of(&Coord::new(5, 4)), Terrain::River);
    }

    #[test]
    fn reefs_sit_inside_the_river() {
        for &(col, row) in &REEF_SQUARES {
            assert!(is_reef(&Coord::new(col, row)));
            assert_eq!(Terrain::of(&Coord::new(col, row)), Terrain::River);
        }
        assert!(!is_reef(&Coord::new(4, 5)));
    }
}
