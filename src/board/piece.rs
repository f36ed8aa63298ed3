//! Piece identity: side, kind, and the mutable per-piece record.
//!
//! The source material tags pieces with bare strings (`"C"`, `"red"`). Per
//! the Design Notes this is re-architected as tagged variants with O(1)
//! comparison and array-indexed tables: `#[repr(u8)]`, a `perspective`-style
//! sign helper, and a `parse`/`notate` pair at the boundary where text is
//! still unavoidable (notation, CLI).

use serde::{Deserialize, Serialize};

use super::coords::Coord;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    Red = 0,
    Blue = 1,
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::Red => Side::Blue,
            Side::Blue => Side::Red,
        }
    }

    /// +1 for Red, -1 for Blue. Lets evaluation terms be written once "from
    /// Red's perspective" and flipped with a multiply, same trick as the
    /// teacher's `Player::perspective`.
    pub fn perspective(&self) -> i32 {
        match self {
            Side::Red => 1,
            Side::Blue => -1,
        }
    }

    /// Home rank direction: Red advances toward higher rows, Blue toward
    /// lower rows.
    pub fn advance_dir(&self) -> i32 {
        match self {
            Side::Red => 1,
            Side::Blue => -1,
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl std::ops::Neg for Side {
    type Output = Side;
    fn neg(self) -> Side {
        self.opponent()
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Commander = 0,
    Headquarters = 1,
    Infantry = 2,
    Militia = 3,
    Tank = 4,
    Engineer = 5,
    Artillery = 6,
    AntiAircraft = 7,
    Missile = 8,
    AirForce = 9,
    Navy = 10,
}

pub const NUM_PIECE_KINDS: usize = 11;

pub const ALL_KINDS: [PieceKind; NUM_PIECE_KINDS] = [
    PieceKind::Commander,
    PieceKind::Headquarters,
    PieceKind::Infantry,
    PieceKind::Militia,
    PieceKind::Tank,
    PieceKind::Engineer,
    PieceKind::Artillery,
    PieceKind::AntiAircraft,
    PieceKind::Missile,
    PieceKind::AirForce,
    PieceKind::Navy,
];

impl PieceKind {
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Short notation letter, as used in `spec.md` §3: C, H, In, M, T, E, A,
    /// Aa, Ms, Af, N.
    pub fn notate(&self) -> &'static str {
        match self {
            PieceKind::Commander => "C",
            PieceKind::Headquarters => "H",
            PieceKind::Infantry => "In",
            PieceKind::Militia => "M",
            PieceKind::Tank => "T",
            PieceKind::Engineer => "E",
            PieceKind::Artillery => "A",
            PieceKind::AntiAircraft => "Aa",
            PieceKind::Missile => "Ms",
            PieceKind::AirForce => "Af",
            PieceKind::Navy => "N",
        }
    }

    pub fn base_value(&self) -> i32 {
        match self {
            PieceKind::Commander => 10_000,
            PieceKind::Headquarters => 300,
            PieceKind::Infantry => 180,
            PieceKind::Militia => 140,
            PieceKind::Tank => 420,
            PieceKind::Engineer => 160,
            PieceKind::Artillery => 380,
            PieceKind::AntiAircraft => 260,
            PieceKind::Missile => 400,
            PieceKind::AirForce => 500,
            PieceKind::Navy => 460,
        }
    }
}

pub const NO_CARRIER: i64 = -1;

/// A single piece. Ids are stable through the game (`spec.md` §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub id: i64,
    pub side: Side,
    pub kind: PieceKind,
    pub col: i32,
    pub row: i32,
    pub hero: bool,
    pub carrier_id: i64,
}

impl Piece {
    pub fn new(id: i64, side: Side, kind: PieceKind, col: i32, row: i32) -> Piece {
        Piece {
            id,
            side,
            kind,
            col,
            row,
            hero: false,
            carrier_id: NO_CARRIER,
        }
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.col, self.row)
    }

    pub fn is_carried(&self) -> bool {
        self.carrier_id != NO_CARRIER
    }

    /// Material weight, 1.5x for heroic units (`spec.md` §4.3).
    pub fn material_value(&self) -> i32 {
        let v = self.kind.base_value();
        if self.hero { v * 3 / 2 } else { v }
    }
}
