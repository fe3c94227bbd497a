//! # Elastic Sliding Window Cache
//!
//! A fixed-capacity memo table keyed by `(position, rule id)`.
//!
//! ## Overview
//!
//! Classic packrat parsing remembers every rule at every position and needs
//! memory proportional to `input length × rule count`. This cache instead
//! owns exactly `width × height` slots, allocated up front. A new entry
//! simply overwrites whatever occupied its slot: there is no probing and no
//! chaining. As parsing moves forward, entries for old positions are pushed
//! out by entries for new ones, so the table behaves like a window sliding
//! over the input.
//!
//! Every slot keeps the full key next to the outcome and a lookup only
//! answers when the stored key matches. A collision therefore costs a
//! recomputation, never a wrong answer: lookups have false negatives but no
//! false positives.
//!
//! ## Keys
//!
//! `key = (position << shift) | rule_id`, where `shift` is the bit length of
//! `height`. Rule ids must stay below `2^shift` (see
//! [`max_rules`](ElasticCache::max_rules)); larger ids spill into the
//! position bits and alias other `(position, rule)` pairs.

mod config;

pub use config::CacheConfig;

use crate::error::CacheError;

/// 2^64 divided by the golden ratio.
const FIBONACCI_MULTIPLIER: u64 = 0x9E37_79B9_7F4A_7C15;

/// An occupied slot.
#[derive(Debug, Clone)]
struct MemoEntry<T> {
    key: u64,
    outcome: T,
}

/// Counters describing how the slots have been used since the last clear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheStats {
    /// Number of `insert` calls
    pub inserts: usize,
    /// Inserts that overwrote an entry for a different key
    pub evictions: usize,
    /// Inserts that overwrote an entry for the same key
    pub replacements: usize,
}

/// Bounded memoization table.
#[derive(Debug, Clone)]
pub struct ElasticCache<T> {
    slots: Box<[Option<MemoEntry<T>>]>,
    width: usize,
    height: usize,
    shift: u32,
    occupied: usize,
    stats: CacheStats,
}

impl<T> ElasticCache<T> {
    /// Allocates `width * height` empty slots.
    ///
    /// `height` is the number of rule ids the cache is meant to distinguish,
    /// `width` roughly the number of recent positions it keeps.
    ///
    /// The rule field of a key is the bit length of `height`, deliberately not
    /// `64 - floor(log2(height)) - 1`: that width leaves almost no bits for
    /// the position, so distinct positions would share a key.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ZeroDimension`] if either dimension is zero and
    /// [`CacheError::TooLarge`] if the slot count does not fit in 32 bits.
    pub fn new(width: usize, height: usize) -> Result<Self, CacheError> {
        if width == 0 || height == 0 {
            return Err(CacheError::ZeroDimension { width, height });
        }
        let capacity = width
            .checked_mul(height)
            .filter(|capacity| u32::try_from(*capacity).is_ok())
            .ok_or(CacheError::TooLarge { width, height })?;

        let shift = u64::BITS - (height as u64).leading_zeros();
        let slots = std::iter::repeat_with(|| None).take(capacity).collect();

        Ok(Self {
            slots,
            width,
            height,
            shift,
            occupied: 0,
            stats: CacheStats::default(),
        })
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Number of low key bits reserved for the rule id.
    #[must_use]
    pub const fn shift(&self) -> u32 {
        self.shift
    }

    /// Number of distinct rule ids the key layout can hold (`2^shift`).
    #[must_use]
    pub const fn max_rules(&self) -> u64 {
        1 << self.shift
    }

    /// Whether `rule` can be keyed without aliasing.
    #[must_use]
    pub const fn fits(&self, rule: u32) -> bool {
        (rule as u64) < self.max_rules()
    }

    /// Total number of slots; fixed at construction.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.occupied
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    #[must_use]
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }

    /// The full key stored for `(position, rule)`.
    #[must_use]
    pub const fn key(&self, position: usize, rule: u32) -> u64 {
        ((position as u64) << self.shift) | rule as u64
    }

    /// Maps a key onto `[0, capacity)` with a multiply-high reduction.
    fn slot(&self, key: u64) -> usize {
        let mixed = key.wrapping_mul(FIBONACCI_MULTIPLIER) >> 32;
        // Both factors are below 2^32, so the product cannot overflow.
        ((mixed * self.slots.len() as u64) >> 32) as usize
    }

    /// Returns the outcome stored for `(position, rule)`, if it is still there.
    #[must_use]
    pub fn get(&self, position: usize, rule: u32) -> Option<&T> {
        let key = self.key(position, rule);
        match &self.slots[self.slot(key)] {
            Some(entry) if entry.key == key => Some(&entry.outcome),
            _ => None,
        }
    }

    /// Stores `outcome` for `(position, rule)`, overwriting the slot.
    pub fn insert(&mut self, position: usize, rule: u32, outcome: T) {
        let key = self.key(position, rule);
        let index = self.slot(key);
        let slot = &mut self.slots[index];
        match slot {
            Some(entry) if entry.key == key => self.stats.replacements += 1,
            Some(entry) => {
                self.stats.evictions += 1;
                tracing::trace!(slot = index, evicted = entry.key, key, "memo entry evicted");
            }
            None => self.occupied += 1,
        }
        self.stats.inserts += 1;
        *slot = Some(MemoEntry { key, outcome });
    }

    /// Empties every slot and resets the statistics; the allocation is kept.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.occupied = 0;
        self.stats = CacheStats::default();
    }
}
