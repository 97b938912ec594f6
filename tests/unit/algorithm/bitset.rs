//! Tests for `BitSet` algebra, collapse detection and set-bit iteration

#[cfg(test)]
mod tests {
    use gridwfc::WfcError;
    use gridwfc::algorithm::bitset::{BitSet, OnlyBit, STATIC_BITS};

    fn sample(size: usize, bits: &[usize]) -> BitSet {
        BitSet::from_bits(size, bits.iter().copied())
    }

    // Verifies a new set honours its default and reports its size
    // Verified by ignoring the default flag in the constructor
    #[test]
    fn test_new_respects_default() {
        let empty = BitSet::new(10, false);
        assert!(empty.is_empty());
        assert_eq!(empty.size(), 10);

        let full = BitSet::new(10, true);
        assert_eq!(full.count(), 10);
        assert_eq!(full.to_vec(), (0..10).collect::<Vec<_>>());
    }

    // Bits beyond the logical size stay clear after set_all and invert
    #[test]
    fn test_padding_bits_stay_clear() {
        for size in [1, 63, 64, 65, 127, 128, 129, 200] {
            let full = BitSet::new(size, true);
            assert_eq!(full.count(), size, "size {size}");
            assert!(full.invert().is_empty(), "size {size}");
            assert!(!full.get_bit(size));
        }
    }

    // Tests the algebraic identities every domain operation relies on
    #[test]
    fn test_algebraic_identities() {
        for size in [5, 130, 300] {
            let a = sample(size, &[0, 2, 4]);
            let b = sample(size, &[1, 2, size - 1]);

            assert_eq!(a.union(&b).unwrap().intersection(&a).unwrap(), a);
            assert!(a.xor(&a).unwrap().is_empty());
            assert_eq!(a.invert().invert(), a);
            assert!(a.is_superset_of(&a).unwrap());
        }
    }

    // Tests union, intersection, xor and difference on concrete values
    // Verified by swapping the intersection and union operators
    #[test]
    fn test_binary_operations() {
        let a = sample(10, &[1, 3, 5]);
        let b = sample(10, &[3, 5, 7]);

        assert_eq!(a.union(&b).unwrap().to_vec(), vec![1, 3, 5, 7]);
        assert_eq!(a.intersection(&b).unwrap().to_vec(), vec![3, 5]);
        assert_eq!(a.xor(&b).unwrap().to_vec(), vec![1, 7]);
        assert_eq!(a.difference(&b).unwrap().to_vec(), vec![1]);
        assert!(a.intersects_with(&b).unwrap());
        assert!(!sample(10, &[0]).intersects_with(&sample(10, &[9])).unwrap());
    }

    // Tests in-place operations match their value-returning forms
    #[test]
    fn test_in_place_operations() {
        let a = sample(140, &[0, 64, 139]);
        let b = sample(140, &[64, 100]);

        let mut union = a.clone();
        union.union_in_place(&b).unwrap();
        assert_eq!(union, a.union(&b).unwrap());

        let mut intersection = a.clone();
        intersection.intersect_in_place(&b).unwrap();
        assert_eq!(intersection.to_vec(), vec![64]);

        let mut xor = a.clone();
        xor.xor_in_place(&b).unwrap();
        assert_eq!(xor.to_vec(), vec![0, 100, 139]);
    }

    // Tests mismatched sizes are rejected rather than tolerated
    #[test]
    fn test_size_mismatch_is_invalid_argument() {
        let mut a = BitSet::new(8, true);
        let b = BitSet::new(9, true);

        assert!(matches!(
            a.union(&b),
            Err(WfcError::InvalidArgument { .. })
        ));
        assert!(a.intersect_in_place(&b).is_err());
        assert!(a.xor(&b).is_err());
        assert!(a.is_superset_of(&b).is_err());
        assert!(a.intersects_with(&b).is_err());
        assert_eq!(a.count(), 8);
    }

    // Tests superset checks in both directions
    #[test]
    fn test_is_superset_of() {
        let big = sample(200, &[1, 2, 150]);
        let small = sample(200, &[2, 150]);
        assert!(big.is_superset_of(&small).unwrap());
        assert!(!small.is_superset_of(&big).unwrap());
    }

    // Tests single-bit reads and writes, including out-of-range indices
    #[test]
    fn test_get_and_set_bit() {
        let mut bits = BitSet::new(130, false);
        bits.set_bit(129, true);
        bits.set_bit(64, true);
        bits.set_bit(500, true);
        assert!(bits.get_bit(129));
        assert!(bits.get_bit(64));
        assert!(!bits.get_bit(500));
        assert_eq!(bits.count(), 2);

        bits.set_bit(64, false);
        assert_eq!(bits.to_vec(), vec![129]);
    }

    // Tests collapse detection for none, one and several set bits
    // Verified by returning Single for the first non-zero word unconditionally
    #[test]
    fn test_get_only_set_bit() {
        assert_eq!(BitSet::new(300, false).get_only_set_bit(), OnlyBit::NoneSet);
        assert_eq!(sample(300, &[7]).get_only_set_bit(), OnlyBit::Single(7));
        assert_eq!(sample(300, &[250]).get_only_set_bit(), OnlyBit::Single(250));
        assert_eq!(sample(300, &[3, 4]).get_only_set_bit(), OnlyBit::Multiple);
        assert_eq!(sample(300, &[3, 250]).get_only_set_bit(), OnlyBit::Multiple);
    }

    // Tests counting stops early but stays exact below the cap
    #[test]
    fn test_count_set_bits_cap() {
        let full = BitSet::new(400, true);
        assert!(full.count_set_bits(1) > 1);
        assert!(full.count_set_bits(1) < 400);
        assert_eq!(sample(400, &[1, 399]).count_set_bits(5), 2);
        assert_eq!(full.count(), 400);
    }

    // Tests iteration visits set bits in order across inline and overflow words
    #[test]
    fn test_iteration_across_words() {
        let bits = [0, 63, 64, STATIC_BITS - 1, STATIC_BITS, 255, 256];
        let set = sample(257, &bits);
        assert_eq!(set.to_vec(), bits);

        let mut visited = Vec::new();
        set.for_each_set_bit(|bit| visited.push(bit));
        assert_eq!(visited, bits);
        assert_eq!((&set).into_iter().count(), bits.len());
    }

    // Tests small sets keep everything inline
    #[test]
    fn test_small_sets_have_no_overflow() {
        assert_eq!(BitSet::new(STATIC_BITS, true).to_words().len(), 2);
        assert_eq!(BitSet::new(STATIC_BITS + 1, true).to_words().len(), 3);
    }

    // Tests set_all after clearing restores every bit
    #[test]
    fn test_set_all() {
        let mut bits = BitSet::new(70, false);
        bits.set_all();
        assert_eq!(bits, BitSet::new(70, true));
    }

    // Tests display lists the set bits
    #[test]
    fn test_display() {
        assert_eq!(sample(4, &[1, 3]).to_string(), "BitSet(2/4: [1, 3])");
    }
}
