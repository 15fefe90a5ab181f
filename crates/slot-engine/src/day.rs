//! Bit-packed availability for a single calendar date.
//!
//! A day's 96 quarter-hour slots and its metadata flags live in two 64-bit
//! words:
//!
//! | word   | bits     | contents          |
//! |--------|----------|-------------------|
//! | `low`  | 0..64    | slots 0..=63      |
//! | `high` | 0..32    | slots 64..=95     |
//! | `high` | 32..64   | metadata flags    |
//!
//! Every slot mask applied to the high word is confined to its low 32 bits, so
//! reserving or freeing slots can never disturb a metadata flag.

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::trace;

use crate::error::{Result, SlotError};
use crate::timeblock::{BlockRange, BLOCKS_PER_DAY};

/// Number of reservable slots in a day.
pub const SLOTS_PER_DAY: usize = BLOCKS_PER_DAY;

const LOW_WORD_SLOTS: usize = 64;
const HIGH_WORD_SLOTS: usize = 32;
const HIGH_SLOT_MASK: u64 = 0x0000_0000_FFFF_FFFF;
const METADATA_SHIFT: u32 = 32;

/// A single flag in the metadata region of a day, identified by a
/// power-of-two tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MetadataFlag(u32);

impl MetadataFlag {
    /// Set exactly when all 96 slots are free.
    pub const IS_FREE: MetadataFlag = MetadataFlag(1);

    /// Flag for `tag`, or `None` unless `tag` has exactly one bit set.
    pub const fn from_tag(tag: u32) -> Option<Self> {
        if tag.is_power_of_two() {
            Some(Self(tag))
        } else {
            None
        }
    }

    pub const fn tag(self) -> u32 {
        self.0
    }

    const fn mask(self) -> u64 {
        (self.0 as u64) << METADATA_SHIFT
    }
}

/// Masks selecting a contiguous run of slots, one per word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SpanMask {
    low: u64,
    high: u64,
}

impl SpanMask {
    /// Caller guarantees `length > 0` and `start + length <= SLOTS_PER_DAY`.
    fn new(start: usize, length: usize) -> Self {
        let end = start + length;

        let low = if start < LOW_WORD_SLOTS {
            ones(end.min(LOW_WORD_SLOTS) - start, LOW_WORD_SLOTS) << start
        } else {
            0
        };

        let high = if end > LOW_WORD_SLOTS {
            let from = start.saturating_sub(LOW_WORD_SLOTS);
            let count = end - LOW_WORD_SLOTS - from;
            (ones(count, HIGH_WORD_SLOTS) << from) & HIGH_SLOT_MASK
        } else {
            0
        };

        Self { low, high }
    }

    /// Validate `start..start + length` against the day and build its mask.
    fn checked(start: usize, length: usize) -> Result<Self> {
        if length == 0 {
            return Err(SlotError::RangeBounds(
                "slot count must be positive".to_string(),
            ));
        }
        match start.checked_add(length) {
            Some(end) if end <= SLOTS_PER_DAY => Ok(Self::new(start, length)),
            _ => Err(SlotError::RangeBounds(format!(
                "{} slots starting at slot {} exceed the {} slots of a day",
                length, start, SLOTS_PER_DAY
            ))),
        }
    }

    fn of_block(range: &BlockRange) -> Self {
        Self::new(range.start_block(), range.block_count())
    }
}

/// `count` low bits set. Counts at or past `width` give the full-width mask,
/// never a shift by the word size.
fn ones(count: usize, width: usize) -> u64 {
    let bits = count.min(width);
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// The 128-bit state of a day, held as two 64-bit words.
///
/// `SlotBits` is plain storage: it does not maintain [`MetadataFlag::IS_FREE`]
/// itself. [`Day`] does that on every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SlotBits {
    low: u64,
    high: u64,
}

impl SlotBits {
    pub const fn from_words(low: u64, high: u64) -> Self {
        Self { low, high }
    }

    pub const fn low(&self) -> u64 {
        self.low
    }

    pub const fn high(&self) -> u64 {
        self.high
    }

    fn is_span_clear(&self, mask: SpanMask) -> bool {
        self.low & mask.low == 0 && (self.high & HIGH_SLOT_MASK) & mask.high == 0
    }

    fn set_span(&mut self, mask: SpanMask) {
        self.low |= mask.low;
        self.high |= mask.high & HIGH_SLOT_MASK;
    }

    fn clear_span(&mut self, mask: SpanMask) {
        self.low &= !mask.low;
        self.high &= !(mask.high & HIGH_SLOT_MASK);
    }

    /// True when no slot bit is set in either word; metadata is ignored.
    pub fn slots_clear(&self) -> bool {
        self.low == 0 && self.high & HIGH_SLOT_MASK == 0
    }

    pub fn is_slot_set(&self, slot: usize) -> bool {
        if slot < LOW_WORD_SLOTS {
            self.low & (1u64 << slot) != 0
        } else if slot < SLOTS_PER_DAY {
            self.high & (1u64 << (slot - LOW_WORD_SLOTS)) != 0
        } else {
            false
        }
    }

    pub fn slot_count(&self) -> u32 {
        self.low.count_ones() + (self.high & HIGH_SLOT_MASK).count_ones()
    }

    pub fn flag(&self, flag: MetadataFlag) -> bool {
        self.high & flag.mask() != 0
    }

    pub fn set_flag(&mut self, flag: MetadataFlag, value: bool) {
        if value {
            self.high |= flag.mask();
        } else {
            self.high &= !flag.mask();
        }
    }
}

/// Reservation state of one calendar date in 15-minute slots.
///
/// Slot `i` covers `[i * 15min, (i + 1) * 15min)` of the date. The
/// [`MetadataFlag::IS_FREE`] flag always equals "no slot reserved": every
/// mutator below keeps it exact, and [`Day::is_range_available`] relies on it
/// as a fast path.
///
/// A day does no locking; concurrent writers must serialize access to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Day {
    date: NaiveDate,
    bits: SlotBits,
}

impl Day {
    /// A day with every slot free.
    pub fn new(date: NaiveDate) -> Self {
        let mut bits = SlotBits::default();
        bits.set_flag(MetadataFlag::IS_FREE, true);
        Self { date, bits }
    }

    /// Restore a day from its two stored words.
    ///
    /// The words are taken as-is, including the metadata region; the caller
    /// is responsible for having stored a consistent `IS_FREE` flag. A stale
    /// flag makes the fast path report reserved slots as free, so a later
    /// reservation may overlap them.
    pub fn from_raw(date: NaiveDate, bits_low: u64, bits_high: u64) -> Self {
        Self {
            date,
            bits: SlotBits::from_words(bits_low, bits_high),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    pub fn bits(&self) -> SlotBits {
        self.bits
    }

    /// Slots 0..=63.
    pub fn bits_low(&self) -> u64 {
        self.bits.low()
    }

    /// Slots 64..=95 in the low half, metadata flags in the high half.
    pub fn bits_high(&self) -> u64 {
        self.bits.high()
    }

    /// Overwrite both words, as when reloading a day from storage. The same
    /// `IS_FREE` caveat as [`Day::from_raw`] applies.
    pub fn set_raw_bits(&mut self, bits_low: u64, bits_high: u64) {
        self.bits = SlotBits::from_words(bits_low, bits_high);
    }

    pub fn is_free(&self) -> bool {
        self.bits.flag(MetadataFlag::IS_FREE)
    }

    pub fn metadata_flag(&self, flag: MetadataFlag) -> bool {
        self.bits.flag(flag)
    }

    /// Set or clear a metadata flag. Slot bits are untouched.
    pub fn set_metadata_flag(&mut self, flag: MetadataFlag, value: bool) {
        self.bits.set_flag(flag, value);
    }

    /// Whether all of `length` slots starting at `start_slot` are free.
    ///
    /// # Errors
    /// Returns `SlotError::RangeBounds` if `length` is zero or the range runs
    /// past slot 95.
    pub fn is_range_available(&self, start_slot: usize, length: usize) -> Result<bool> {
        let mask = SpanMask::checked(start_slot, length)?;
        Ok(self.is_free() || self.bits.is_span_clear(mask))
    }

    /// Reserve `length` slots starting at `start_slot`.
    ///
    /// Returns `Ok(false)` without changing anything if any slot in the range
    /// is already reserved.
    ///
    /// # Errors
    /// Same validation as [`Day::is_range_available`]; nothing is mutated on error.
    pub fn reserve_range(&mut self, start_slot: usize, length: usize) -> Result<bool> {
        let mask = SpanMask::checked(start_slot, length)?;
        Ok(self.reserve_mask(mask))
    }

    /// Release `length` slots starting at `start_slot`. Releasing free slots
    /// is a no-op.
    ///
    /// # Errors
    /// Same validation as [`Day::is_range_available`]; nothing is mutated on error.
    pub fn free_range(&mut self, start_slot: usize, length: usize) -> Result<()> {
        let mask = SpanMask::checked(start_slot, length)?;
        self.free_mask(mask);
        Ok(())
    }

    /// [`Day::is_range_available`] for an already validated [`BlockRange`].
    pub fn is_block_available(&self, range: &BlockRange) -> bool {
        self.is_free() || self.bits.is_span_clear(SpanMask::of_block(range))
    }

    /// [`Day::reserve_range`] for an already validated [`BlockRange`].
    pub fn reserve_block(&mut self, range: &BlockRange) -> bool {
        self.reserve_mask(SpanMask::of_block(range))
    }

    /// [`Day::free_range`] for an already validated [`BlockRange`].
    pub fn free_block(&mut self, range: &BlockRange) {
        self.free_mask(SpanMask::of_block(range));
    }

    /// # Errors
    /// Returns `SlotError::RangeBounds` if `slot` is past slot 95.
    pub fn is_slot_reserved(&self, slot: usize) -> Result<bool> {
        if slot >= SLOTS_PER_DAY {
            return Err(SlotError::RangeBounds(format!(
                "slot {} is outside 0..{}",
                slot, SLOTS_PER_DAY
            )));
        }
        Ok(self.bits.is_slot_set(slot))
    }

    pub fn reserved_slot_count(&self) -> u32 {
        self.bits.slot_count()
    }

    fn reserve_mask(&mut self, mask: SpanMask) -> bool {
        if !self.is_free() && !self.bits.is_span_clear(mask) {
            return false;
        }
        self.bits.set_span(mask);
        self.bits.set_flag(MetadataFlag::IS_FREE, false);
        trace!(date = %self.date, low = mask.low, high = mask.high, "reserved slots");
        true
    }

    fn free_mask(&mut self, mask: SpanMask) {
        self.bits.clear_span(mask);
        let all_free = self.bits.slots_clear();
        self.bits.set_flag(MetadataFlag::IS_FREE, all_free);
    }
}

