//! Shard-array encode/decode tests

use rs256::reed_solomon::{
    CodecChoice, ErrorKind, ReedSolomon, RsError, ShardMask, ShardSelection,
};

fn encoded(rs: &ReedSolomon, shard_length: usize) -> Vec<Vec<u8>> {
    let mut shards: Vec<Vec<u8>> = (0..rs.total_shard_count())
        .map(|i| {
            if i < rs.data_shard_count() {
                (0..shard_length).map(|j| (i * 41 + j * 7) as u8).collect()
            } else {
                vec![0u8; shard_length]
            }
        })
        .collect();
    rs.encode(&mut shards, 0, shard_length).unwrap();
    shards
}

// ============================================================================
// Encode
// ============================================================================

#[test]
fn test_concrete_vector_every_codec() {
    for codec in [CodecChoice::Scalar, CodecChoice::Unrolled, CodecChoice::Auto] {
        let rs = ReedSolomon::builder()
            .data_shards(5)
            .parity_shards(5)
            .codec(codec)
            .build()
            .unwrap();
        let mut shards = vec![
            vec![0u8, 1],
            vec![4, 5],
            vec![2, 3],
            vec![6, 7],
            vec![8, 9],
            vec![0, 0],
            vec![0, 0],
            vec![0, 0],
            vec![0, 0],
            vec![0, 0],
        ];
        rs.encode(&mut shards, 0, 2).unwrap();
        assert_eq!(
            &shards[5..],
            &[
                vec![12u8, 13],
                vec![10, 11],
                vec![14, 15],
                vec![90, 91],
                vec![94, 95]
            ]
        );
    }
}

#[test]
fn test_encode_is_pass_through_for_data() {
    let rs = ReedSolomon::new(7, 3).unwrap();
    let shards = encoded(&rs, 50);
    for (i, shard) in shards.iter().enumerate().take(7) {
        let expected: Vec<u8> = (0..50).map(|j| (i * 41 + j * 7) as u8).collect();
        assert_eq!(shard, &expected);
    }
}

#[test]
fn test_encode_leaves_bytes_outside_range() {
    let rs = ReedSolomon::new(3, 2).unwrap();
    let mut shards: Vec<Vec<u8>> = (0..5).map(|i| vec![i as u8 + 1; 20]).collect();
    shards[3] = vec![0xAB; 20];
    shards[4] = vec![0xCD; 20];
    rs.encode(&mut shards, 5, 10).unwrap();

    for parity in [3usize, 4] {
        let fill = if parity == 3 { 0xAB } else { 0xCD };
        assert!(shards[parity][..5].iter().all(|&b| b == fill));
        assert!(shards[parity][15..].iter().all(|&b| b == fill));
    }

    let mut scratch = vec![0u8; 20];
    assert!(rs.is_parity_correct(&shards, 5, 10, &mut scratch).unwrap());
    assert!(!rs.is_parity_correct(&shards, 0, 20, &mut scratch).unwrap());
}

#[test]
fn test_encode_validation_happens_before_writes() {
    let rs = ReedSolomon::new(2, 2).unwrap();
    let mut shards = vec![vec![1u8; 8], vec![2u8; 8], vec![3u8; 8], vec![4u8; 8]];
    let before = shards.clone();
    assert!(matches!(
        rs.encode(&mut shards, 4, 5),
        Err(RsError::InvalidRange {
            offset: 4,
            size: 5,
            length: 8
        })
    ));
    assert_eq!(shards, before);
}

#[test]
fn test_encode_accepts_slices_of_borrowed_buffers() {
    let rs = ReedSolomon::new(2, 1).unwrap();
    let mut a = [1u8, 2, 3];
    let mut b = [4u8, 5, 6];
    let mut p = [0u8; 3];
    let mut shards: Vec<&mut [u8]> = vec![&mut a[..], &mut b[..], &mut p[..]];
    rs.encode(&mut shards, 0, 3).unwrap();
    assert!(rs.is_parity_correct(&shards, 0, 3, &mut [0u8; 3]).unwrap());
}

// ============================================================================
// Decode
// ============================================================================

#[test]
fn test_decode_any_parity_count_of_erasures() {
    let rs = ReedSolomon::new(4, 3).unwrap();
    let expected = encoded(&rs, 33);

    // every erasure pattern of size 1..=3 over 7 shards
    for pattern in 1u32..(1 << 7) {
        if pattern.count_ones() > 3 {
            continue;
        }
        let mut shards = expected.clone();
        let present: Vec<bool> = (0..7).map(|i| pattern & (1 << i) == 0).collect();
        for (i, shard) in shards.iter_mut().enumerate() {
            if !present[i] {
                shard.fill(0x5A);
            }
        }
        rs.decode(&mut shards, 0, 33, &present).unwrap();
        assert_eq!(shards, expected, "pattern {pattern:07b}");
    }
}

#[test]
fn test_decode_partial_range_only_touches_range() {
    let rs = ReedSolomon::new(3, 2).unwrap();
    let expected = encoded(&rs, 24);
    let mut shards = expected.clone();
    shards[1].fill(0);
    shards[4].fill(0);

    rs.decode(&mut shards, 8, 8, &[true, false, true, true, false])
        .unwrap();

    assert_eq!(shards[1][8..16], expected[1][8..16]);
    assert_eq!(shards[4][8..16], expected[4][8..16]);
    assert!(shards[1][..8].iter().all(|&b| b == 0));
    assert!(shards[4][16..].iter().all(|&b| b == 0));
}

#[test]
fn test_decode_insufficient_shards_does_not_mutate() {
    let rs = ReedSolomon::new(4, 2).unwrap();
    let mut shards = encoded(&rs, 16);
    shards[0].fill(0);
    shards[1].fill(0);
    shards[2].fill(0);
    let before = shards.clone();

    let err = rs
        .decode(&mut shards, 0, 16, &[false, false, false, true, true, true])
        .unwrap_err();
    assert_eq!(
        err,
        RsError::InsufficientShards {
            needed: 4,
            present: 3
        }
    );
    assert_eq!(err.kind(), ErrorKind::Capacity);
    assert_eq!(shards, before);
}

#[test]
fn test_decode_selection_rejects_overlap_and_out_of_range() {
    let rs = ReedSolomon::new(3, 2).unwrap();
    let mut shards = encoded(&rs, 4);

    let overlap = ShardSelection::new(
        ShardMask::from_indices([0, 1, 2]).unwrap(),
        ShardMask::from_indices([2]).unwrap(),
    );
    assert_eq!(
        rs.decode_selection(&mut shards, 0, 4, &overlap),
        Err(RsError::SourcesAreTargets { index: 2 })
    );

    let outside = ShardSelection::new(
        ShardMask::from_indices([0, 1, 2]).unwrap(),
        ShardMask::from_indices([7]).unwrap(),
    );
    assert_eq!(
        rs.decode_selection(&mut shards, 0, 4, &outside),
        Err(RsError::ShardOutOfRange { index: 7, total: 5 })
    );
}

#[test]
fn test_decode_selection_too_many_targets_does_not_mutate() {
    let rs = ReedSolomon::new(3, 2).unwrap();
    let mut shards = encoded(&rs, 4);
    let before = shards.clone();
    let selection = ShardSelection::new(
        ShardMask::from_indices([3, 4]).unwrap(),
        ShardMask::from_indices([0, 1, 2]).unwrap(),
    );
    let err = rs.decode_selection(&mut shards, 0, 4, &selection).unwrap_err();
    assert_eq!(
        err,
        RsError::TooManyTargets {
            targets: 3,
            parity: 2
        }
    );
    assert_eq!(shards, before);
}

#[test]
fn test_decode_selection_with_voided_data_shard() {
    let rs = ReedSolomon::new(4, 2).unwrap();
    let expected = encoded(&rs, 12);
    let mut shards = expected.clone();

    // shard 1 is voided (neither source nor target), parity 5 is a target
    shards[1].fill(0x11);
    shards[5].fill(0x22);
    let selection = ShardSelection::new(
        ShardMask::from_indices([0, 2, 3, 4]).unwrap(),
        ShardMask::from_indices([5]).unwrap(),
    );
    rs.decode_selection(&mut shards, 0, 12, &selection).unwrap();
    assert_eq!(shards[5], expected[5]);
}

#[test]
fn test_decode_selection_data_only_uses_first_sources() {
    let rs = ReedSolomon::new(3, 3).unwrap();
    let expected = encoded(&rs, 10);
    let mut shards = expected.clone();
    shards[0].fill(0);

    // shard 5 is a source beyond the first three; it is not read
    shards[5].fill(0xFF);
    let selection = ShardSelection::new(
        ShardMask::from_indices([1, 2, 3, 5]).unwrap(),
        ShardMask::from_indices([0]).unwrap(),
    );
    rs.decode_selection(&mut shards, 0, 10, &selection).unwrap();
    assert_eq!(shards[0], expected[0]);
}

#[test]
fn test_decode_empty_targets_is_noop() {
    let rs = ReedSolomon::new(2, 2).unwrap();
    let mut shards = vec![vec![9u8; 3]; 4];
    let selection = ShardSelection::new(ShardMask::range(0..4).unwrap(), ShardMask::empty());
    rs.decode_selection(&mut shards, 0, 3, &selection).unwrap();
    assert_eq!(shards, vec![vec![9u8; 3]; 4]);
}

// ============================================================================
// Parity check
// ============================================================================

#[test]
fn test_parity_check_detects_single_byte_changes() {
    let rs = ReedSolomon::new(3, 2).unwrap();
    let shards = encoded(&rs, 9);
    let mut scratch = vec![0u8; 9];
    assert!(rs.is_parity_correct(&shards, 0, 9, &mut scratch).unwrap());

    for shard in 0..5 {
        for byte in 0..9 {
            let mut corrupted = shards.clone();
            corrupted[shard][byte] ^= 0x40;
            assert!(
                !rs.is_parity_correct(&corrupted, 0, 9, &mut scratch).unwrap(),
                "shard {shard} byte {byte}"
            );
        }
    }
}

#[test]
fn test_parity_check_does_not_mutate_shards() {
    let rs = ReedSolomon::new(3, 2).unwrap();
    let shards = encoded(&rs, 9);
    let before = shards.clone();
    let mut scratch = vec![0u8; 32];
    rs.is_parity_correct(&shards, 2, 5, &mut scratch).unwrap();
    assert_eq!(shards, before);
}
