use crate::io::error::{Result, ensure_same_size};
use std::fmt;

const BITS_PER_WORD: usize = 64;
const STATIC_WORDS: usize = 2;

/// Number of bits stored inline before any overflow word is allocated
pub const STATIC_BITS: usize = BITS_PER_WORD * STATIC_WORDS;

/// Outcome of [`BitSet::get_only_set_bit`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnlyBit {
    /// No bit is set
    NoneSet,
    /// Exactly one bit is set, at this index
    Single(usize),
    /// More than one bit is set
    Multiple,
}

/// Fixed-capacity bit vector used for cell domains and adjacency rows
///
/// The first 128 bits live in two inline words so small tile sets never
/// allocate; larger sets spill into an overflow vector. Bits at or beyond
/// the logical size are always zero, which lets equality and hashing work
/// directly on the stored words.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BitSet {
    data0: u64,
    data1: u64,
    overflow: Vec<u64>,
    size: usize,
}

impl BitSet {
    /// Create a bitset of `size` bits, all set to `default`
    pub fn new(size: usize, default: bool) -> Self {
        let overflow_words = size.saturating_sub(STATIC_BITS).div_ceil(BITS_PER_WORD);
        let mut bitset = Self {
            data0: 0,
            data1: 0,
            overflow: vec![0; overflow_words],
            size,
        };
        if default {
            bitset.set_all();
        }
        bitset
    }

    /// Create a bitset with only the listed bits set
    ///
    /// Indices at or beyond `size` are ignored
    pub fn from_bits(size: usize, bits: impl IntoIterator<Item = usize>) -> Self {
        let mut bitset = Self::new(size, false);
        for bit in bits {
            bitset.set_bit(bit, true);
        }
        bitset
    }

    /// Logical number of bits
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Set every bit below the logical size
    pub fn set_all(&mut self) {
        self.data0 = self.word_mask(0);
        self.data1 = self.word_mask(1);
        for index in 0..self.overflow.len() {
            let mask = self.word_mask(index + STATIC_WORDS);
            if let Some(word) = self.overflow.get_mut(index) {
                *word = mask;
            }
        }
    }

    /// Bits of word `index` that fall inside the logical size
    const fn word_mask(&self, index: usize) -> u64 {
        let start = index * BITS_PER_WORD;
        if self.size >= start + BITS_PER_WORD {
            u64::MAX
        } else if self.size <= start {
            0
        } else {
            (1u64 << (self.size - start)) - 1
        }
    }

    fn word(&self, index: usize) -> Option<u64> {
        match index {
            0 => Some(self.data0),
            1 => Some(self.data1),
            _ => self.overflow.get(index - STATIC_WORDS).copied(),
        }
    }

    fn words(&self) -> impl Iterator<Item = u64> + '_ {
        [self.data0, self.data1]
            .into_iter()
            .chain(self.overflow.iter().copied())
    }

    fn combine_in_place(
        &mut self,
        other: &Self,
        operation: &'static str,
        combine: impl Fn(u64, u64) -> u64,
    ) -> Result<()> {
        ensure_same_size(operation, self.size, other.size)?;
        self.data0 = combine(self.data0, other.data0);
        self.data1 = combine(self.data1, other.data1);
        for (word, &other_word) in self.overflow.iter_mut().zip(&other.overflow) {
            *word = combine(*word, other_word);
        }
        Ok(())
    }

    /// Add every bit of `other` to this set
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error if the sizes differ
    pub fn union_in_place(&mut self, other: &Self) -> Result<()> {
        self.combine_in_place(other, "BitSet::union", |a, b| a | b)
    }

    /// Union of two sets as a new value
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error if the sizes differ
    pub fn union(&self, other: &Self) -> Result<Self> {
        let mut result = self.clone();
        result.union_in_place(other)?;
        Ok(result)
    }

    /// Keep only bits also present in `other`
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error if the sizes differ
    pub fn intersect_in_place(&mut self, other: &Self) -> Result<()> {
        self.combine_in_place(other, "BitSet::intersect", |a, b| a & b)
    }

    /// Intersection of two sets as a new value
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error if the sizes differ
    pub fn intersection(&self, other: &Self) -> Result<Self> {
        let mut result = self.clone();
        result.intersect_in_place(other)?;
        Ok(result)
    }

    /// Toggle every bit present in `other`
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error if the sizes differ
    pub fn xor_in_place(&mut self, other: &Self) -> Result<()> {
        self.combine_in_place(other, "BitSet::xor", |a, b| a ^ b)
    }

    /// Symmetric difference of two sets as a new value
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error if the sizes differ
    pub fn xor(&self, other: &Self) -> Result<Self> {
        let mut result = self.clone();
        result.xor_in_place(other)?;
        Ok(result)
    }

    /// Complement within the logical size
    #[must_use]
    pub fn invert(&self) -> Self {
        let mut result = self.clone();
        result.data0 = !self.data0 & self.word_mask(0);
        result.data1 = !self.data1 & self.word_mask(1);
        for (index, word) in result.overflow.iter_mut().enumerate() {
            *word = !*word & self.word_mask(index + STATIC_WORDS);
        }
        result
    }

    /// Bits of this set that are not in `other`
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error if the sizes differ
    pub fn difference(&self, other: &Self) -> Result<Self> {
        self.intersection(&other.invert())
    }

    /// Test whether every bit of `subset` is also set here
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error if the sizes differ
    pub fn is_superset_of(&self, subset: &Self) -> Result<bool> {
        ensure_same_size("BitSet::is_superset_of", self.size, subset.size)?;
        Ok(self
            .words()
            .zip(subset.words())
            .all(|(own, sub)| sub & !own == 0))
    }

    /// Test whether the two sets share any bit
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error if the sizes differ
    pub fn intersects_with(&self, other: &Self) -> Result<bool> {
        ensure_same_size("BitSet::intersects_with", self.size, other.size)?;
        Ok(self.words().zip(other.words()).any(|(a, b)| a & b != 0))
    }

    /// Read one bit; indices beyond the logical size read as unset
    pub fn get_bit(&self, bit: usize) -> bool {
        if bit >= self.size {
            return false;
        }
        self.word(bit / BITS_PER_WORD)
            .is_some_and(|word| word & (1u64 << (bit % BITS_PER_WORD)) != 0)
    }

    /// Write one bit; indices beyond the logical size are ignored
    pub fn set_bit(&mut self, bit: usize, value: bool) {
        if bit >= self.size {
            return;
        }
        let mask = 1u64 << (bit % BITS_PER_WORD);
        let word = match bit / BITS_PER_WORD {
            0 => &mut self.data0,
            1 => &mut self.data1,
            index => match self.overflow.get_mut(index - STATIC_WORDS) {
                Some(word) => word,
                None => return,
            },
        };
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    /// Identify a fully collapsed set without scanning individual bits
    pub fn get_only_set_bit(&self) -> OnlyBit {
        let mut found = OnlyBit::NoneSet;
        for (index, word) in self.words().enumerate() {
            if word == 0 {
                continue;
            }
            if !word.is_power_of_two() || found != OnlyBit::NoneSet {
                return OnlyBit::Multiple;
            }
            found = OnlyBit::Single(index * BITS_PER_WORD + word.trailing_zeros() as usize);
        }
        found
    }

    /// Test if no bits are set
    pub fn is_empty(&self) -> bool {
        self.words().all(|word| word == 0)
    }

    /// Count set bits, stopping as soon as the count exceeds `pass_if_more_than`
    ///
    /// The returned value is exact when it is at most `pass_if_more_than`.
    pub fn count_set_bits(&self, pass_if_more_than: usize) -> usize {
        let mut count = 0;
        for word in self.words() {
            count += word.count_ones() as usize;
            if count > pass_if_more_than {
                break;
            }
        }
        count
    }

    /// Exact number of set bits
    pub fn count(&self) -> usize {
        self.count_set_bits(usize::MAX)
    }

    /// Iterate set bit indices in ascending order
    pub const fn iter(&self) -> SetBits<'_> {
        SetBits {
            set: self,
            word_index: 0,
            word: self.data0,
        }
    }

    /// Invoke `callback` for every set bit, in ascending order
    pub fn for_each_set_bit(&self, callback: impl FnMut(usize)) {
        self.iter().for_each(callback);
    }

    /// Extract all set bit indices as a vector
    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }

    /// Raw storage words, inline words first
    pub fn to_words(&self) -> Vec<u64> {
        self.words().collect()
    }
}

/// Iterator over the set bits of a [`BitSet`]
///
/// Uses lowest-set-bit extraction, so the cost follows the number of set
/// bits rather than the bit width.
#[derive(Debug, Clone)]
pub struct SetBits<'a> {
    set: &'a BitSet,
    word_index: usize,
    word: u64,
}

impl Iterator for SetBits<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.word != 0 {
                let bit = self.word.trailing_zeros() as usize;
                self.word &= self.word - 1;
                return Some(self.word_index * BITS_PER_WORD + bit);
            }
            self.word_index += 1;
            self.word = self.set.word(self.word_index)?;
        }
    }
}

impl<'a> IntoIterator for &'a BitSet {
    type Item = usize;
    type IntoIter = SetBits<'a>;

    fn into_iter(self) -> SetBits<'a> {
        self.iter()
    }
}

impl fmt::Display for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitSet({}/{}: {:?})", self.count(), self.size, self.to_vec())
    }
}
