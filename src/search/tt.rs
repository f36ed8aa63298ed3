//! The shared transposition table: a two-slot bucket, racy by design.
//!
//! `spec.md` §4.4/§5: "Two-slot bucket: Slot 0 (depth-preferred) is
//! overwritten when it matches the key, is empty, is stale (different
//! generation), or the new depth >= its depth (or flag is Exact). Slot 1 is
//! always overwritten. Stores write `key=0` before payload and set the key
//! last." Reads are racy: a torn write can at worst present as a miss,
//! never as a wrong hit, because the key word is the last one written and
//! the first one checked. Grounded on the lockless atomic table in
//! `examples/other_examples/..._cesso__crates-cesso-engine-src-search-tt.rs.rs`,
//! simplified from its XOR-checksum scheme to the plain key-last discipline
//! `spec.md` actually specifies.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

use crate::board::Move;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    None,
    Exact,
    Lower,
    Upper,
}

impl Bound {
    fn to_bits(self) -> u64 {
        match self {
            Bound::None => 0,
            Bound::Exact => 1,
            Bound::Lower => 2,
            Bound::Upper => 3,
        }
    }

    fn from_bits(bits: u64) -> Bound {
        match bits & 0b11 {
            1 => Bound::Exact,
            2 => Bound::Lower,
            3 => Bound::Upper,
            _ => Bound::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtEntry {
    pub score: i32,
    pub depth: i32,
    pub bound: Bound,
    pub best_move: Option<Move>,
    pub generation: u8,
}

fn encode(entry: &TtEntry) -> u64 {
    let mut bits: u64 = 0;
    bits |= (entry.score as i16 as u16 as u64) & 0xFFFF;
    bits |= ((entry.depth.clamp(0, 255) as u64) & 0xFF) << 16;
    bits |= entry.bound.to_bits() << 24;
    bits |= (entry.generation as u64) << 26;
    if let Some(mv) = entry.best_move {
        bits |= 1 << 34;
        bits |= ((mv.piece_id.clamp(0, 255) as u64) & 0xFF) << 35;
        bits |= ((mv.to_col.clamp(0, 15) as u64) & 0xF) << 43;
        bits |= ((mv.to_row.clamp(0, 31) as u64) & 0x1F) << 47;
    }
    bits
}

fn decode(bits: u64) -> TtEntry {
    let score = (bits & 0xFFFF) as u16 as i16 as i32;
    let depth = ((bits >> 16) & 0xFF) as i32;
    let bound = Bound::from_bits((bits >> 24) & 0b11);
    let generation = ((bits >> 26) & 0xFF) as u8;
    let best_move = if (bits >> 34) & 1 == 1 {
        let piece_id = ((bits >> 35) & 0xFF) as i64;
        let to_col = ((bits >> 43) & 0xF) as i32;
        let to_row = ((bits >> 47) & 0x1F) as i32;
        Some(Move::new(piece_id, to_col, to_row))
    } else {
        None
    };
    TtEntry { score, depth, bound, best_move, generation }
}

struct TtSlot {
    key: AtomicU64,
    data: AtomicU64,
}

impl TtSlot {
    fn empty() -> TtSlot {
        TtSlot { key: AtomicU64::new(0), data: AtomicU64::new(0) }
    }

    /// Writes `key=0`, then the payload, then the real key — a reader can
    /// only ever observe "empty/stale" or "fully written", never a mix.
    fn store(&self, key: u64, data: u64) {
        self.key.store(0, Ordering::Relaxed);
        self.data.store(data, Ordering::Relaxed);
        self.key.store(key, Ordering::Relaxed);
    }

    fn load(&self, key: u64) -> Option<u64> {
        if self.key.load(Ordering::Relaxed) != key {
            return None;
        }
        let data = self.data.load(Ordering::Relaxed);
        if self.key.load(Ordering::Relaxed) != key {
            return None;
        }
        Some(data)
    }

    /// Raw `(key, data)` regardless of key match, so a store can tell a
    /// genuinely empty slot apart from one occupied by a colliding key.
    /// `None` only when the slot has never been written (its zero-initialized
    /// key sentinel — a real hash landing on exactly 0 is accepted as the
    /// same harmless miss every other bucket index would give it).
    fn peek(&self) -> Option<(u64, u64)> {
        let key = self.key.load(Ordering::Relaxed);
        if key == 0 {
            return None;
        }
        Some((key, self.data.load(Ordering::Relaxed)))
    }
}

pub struct Tt {
    buckets: Vec<[TtSlot; 2]>,
    mask: u64,
    generation: AtomicU8,
}

/// Bytes per bucket: two slots, each a key word + a data word.
const BUCKET_BYTES: usize = 2 * 2 * 8;

impl Tt {
    /// Allocates the largest configured size that fits, falling back through
    /// `config::TT_SIZE_FALLBACK_MIB` (`spec.md` §5 resource policy).
    pub fn with_size_mib(mib: usize) -> Tt {
        for &candidate in std::iter::once(&mib).chain(crate::config::TT_SIZE_FALLBACK_MIB.iter()) {
            if let Some(tt) = Self::try_allocate(candidate) {
                return tt;
            }
        }
        Self::try_allocate(1).expect("at least a 1 MiB transposition table must allocate")
    }

    fn try_allocate(mib: usize) -> Option<Tt> {
        if mib == 0 {
            return None;
        }
        let bytes = mib.saturating_mul(1024 * 1024);
        let buckets_wanted = (bytes / BUCKET_BYTES).next_power_of_two().max(1) / 2;
        let count = buckets_wanted.max(1);
        let mut buckets = Vec::new();
        buckets.try_reserve(count).ok()?;
        for _ in 0..count {
            buckets.push([TtSlot::empty(), TtSlot::empty()]);
        }
        Some(Tt { buckets, mask: (count as u64).saturating_sub(1), generation: AtomicU8::new(0) })
    }

    pub fn new_generation(&self) {
        self.generation.fetch_add(1, Ordering::Relaxed);
    }

    fn index(&self, hash: u64) -> usize {
        (hash & self.mask) as usize
    }

    pub fn probe(&self, hash: u64) -> Option<TtEntry> {
        let bucket = &self.buckets[self.index(hash)];
        bucket[0]
            .load(hash)
            .or_else(|| bucket[1].load(hash))
            .map(decode)
    }

    pub fn store(&self, hash: u64, entry: TtEntry) {
        let bucket = &self.buckets[self.index(hash)];
        let gen = self.generation.load(Ordering::Relaxed);
        let mut entry = entry;
        entry.generation = gen;
        let data = encode(&entry);

        // Slot 0 is depth-preferred: it's overwritten when it matches the key,
        // is empty, is stale, or the new depth >= its depth (or the new bound
        // is Exact). A *different* key at the same bucket index (a collision)
        // must fall through to those same depth/staleness/bound checks rather
        // than being treated as empty, or a deeper, fresher entry would be
        // blown away by an unrelated shallower one.
        let replace_slot0 = match bucket[0].peek() {
            None => true,
            Some((existing_key, _)) if existing_key == hash => true,
            Some((_, existing_data)) => {
                let old = decode(existing_data);
                old.generation != gen || entry.depth >= old.depth || entry.bound == Bound::Exact
            }
        };

        if replace_slot0 {
            bucket[0].store(hash, data);
        } else {
            bucket[1].store(hash, data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_an_entry() {
        let entry = TtEntry {
            score: -1234,
            depth: 7,
            bound: Bound::Lower,
            best_move: Some(Move::new(12, 5, 6)),
            generation: 3,
        };
        let bits = encode(&entry);
        let decoded = decode(bits);
        assert_eq!(decoded.score, entry.score);
        assert_eq!(decoded.depth, entry.depth);
        assert_eq!(decoded.bound, entry.bound);
        assert_eq!(decoded.best_move, entry.best_move);
    }

    #[test]
    fn miss_on_unseen_key() {
        let tt = Tt::with_size_mib(1);
        assert!(tt.probe(0xDEAD_BEEF).is_none());
    }

    #[test]
    fn store_then_probe_hits() {
        let tt = Tt::with_size_mib(1);
        let entry = TtEntry { score: 42, depth: 4, bound: Bound::Exact, best_move: None, generation: 0 };
        tt.store(777, entry);
        let probed = tt.probe(777).unwrap();
        assert_eq!(probed.score, 42);
        assert_eq!(probed.depth, 4);
    }

    #[test]
    fn a_shallow_colliding_key_does_not_evict_a_deeper_entry() {
        let tt = Tt::with_size_mib(1);
        let deep = TtEntry { score: 10, depth: 8, bound: Bound::Exact, best_move: None, generation: 0 };
        tt.store(100, deep);

        // Shares bucket index with key 100 (same low bits) but is a distinct
        // key, simulating an index collision between two positions.
        let colliding_key = 100 ^ (tt.mask + 1);
        let shallow = TtEntry { score: -5, depth: 1, bound: Bound::Upper, best_move: None, generation: 0 };
        tt.store(colliding_key, shallow);

        let probed = tt.probe(100).unwrap();
        assert_eq!(probed.depth, 8, "collision should have fallen through to slot 1, not evicted slot 0");
    }
}
