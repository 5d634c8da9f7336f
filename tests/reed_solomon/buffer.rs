//! Packed-buffer calling convention tests

use rs256::reed_solomon::{BufferLayout, ReedSolomon, RsError, ShardLimit, ShardMask};

fn packed(rs: &ReedSolomon, prefix: usize, shard_length: usize) -> (Vec<u8>, BufferLayout) {
    let total = rs.total_shard_count();
    let mut buffer = vec![0xEEu8; prefix + shard_length * total + 3];
    for i in 0..rs.data_shard_count() * shard_length {
        buffer[prefix + i] = (i * 29 + 5) as u8;
    }
    let layout = BufferLayout {
        buffer_offset: prefix,
        buffer_size: shard_length * total,
        shard_length,
        shard_offset: 0,
        shard_size: shard_length,
    };
    rs.encode_buffer(&mut buffer, layout).unwrap();
    (buffer, layout)
}

#[test]
fn test_buffer_matches_shard_array() {
    let rs = ReedSolomon::new(4, 2).unwrap();
    let (buffer, layout) = packed(&rs, 5, 10);

    let mut shards: Vec<Vec<u8>> = buffer[layout.span()]
        .chunks(10)
        .map(|c| c.to_vec())
        .collect();
    for shard in &mut shards[4..] {
        shard.fill(0);
    }
    rs.encode(&mut shards, 0, 10).unwrap();
    assert_eq!(shards.concat(), buffer[layout.span()].to_vec());
}

#[test]
fn test_buffer_bytes_outside_span_untouched() {
    let rs = ReedSolomon::new(3, 2).unwrap();
    let (mut buffer, layout) = packed(&rs, 4, 8);
    assert!(buffer[..4].iter().all(|&b| b == 0xEE));
    assert!(buffer[layout.span().end..].iter().all(|&b| b == 0xEE));

    let targets = ShardMask::from_bits(0b00011).unwrap();
    rs.decode_buffer(&mut buffer, layout, targets).unwrap();
    assert!(buffer[..4].iter().all(|&b| b == 0xEE));
    assert!(buffer[layout.span().end..].iter().all(|&b| b == 0xEE));
}

#[test]
fn test_buffer_decode_with_mask31_engine() {
    let rs = ReedSolomon::builder()
        .data_shards(20)
        .parity_shards(11)
        .shard_limit(ShardLimit::Mask31)
        .build()
        .unwrap();
    let (expected, layout) = packed(&rs, 0, 7);
    let mut buffer = expected.clone();

    let erased = [0usize, 3, 9, 19, 20, 25, 30];
    for &i in &erased {
        buffer[i * 7..(i + 1) * 7].fill(0);
    }
    let targets = ShardMask::from_indices(erased).unwrap();
    rs.decode_buffer(&mut buffer, layout, targets).unwrap();
    assert_eq!(buffer, expected);
}

#[test]
fn test_buffer_partial_shard_range() {
    let rs = ReedSolomon::new(2, 2).unwrap();
    let (expected, full) = packed(&rs, 0, 16);
    let mut buffer = expected.clone();
    buffer[16..32].fill(0);

    let layout = BufferLayout {
        shard_offset: 4,
        shard_size: 8,
        ..full
    };
    rs.decode_buffer(&mut buffer, layout, ShardMask::from_bits(0b0010).unwrap())
        .unwrap();
    assert_eq!(buffer[20..28], expected[20..28]);
    assert!(buffer[16..20].iter().all(|&b| b == 0));
    assert!(buffer[28..32].iter().all(|&b| b == 0));
}

#[test]
fn test_buffer_argument_checks() {
    let rs = ReedSolomon::new(3, 2).unwrap();
    let (mut buffer, layout) = packed(&rs, 0, 4);

    let overflow = BufferLayout {
        buffer_offset: 10,
        ..layout
    };
    assert!(matches!(
        rs.encode_buffer(&mut buffer, overflow),
        Err(RsError::InvalidRange { .. })
    ));

    let wrong_size = BufferLayout {
        buffer_size: 16,
        ..layout
    };
    assert!(matches!(
        rs.encode_buffer(&mut buffer, wrong_size),
        Err(RsError::ShardLengthMismatch { .. })
    ));

    let past_shard = BufferLayout {
        shard_offset: 2,
        shard_size: 3,
        ..layout
    };
    assert!(matches!(
        rs.encode_buffer(&mut buffer, past_shard),
        Err(RsError::InvalidRange { .. })
    ));

    assert_eq!(
        rs.decode_buffer(&mut buffer, layout, ShardMask::from_bits(1 << 5).unwrap()),
        Err(RsError::ShardOutOfRange { index: 5, total: 5 })
    );
    assert_eq!(
        rs.decode_buffer(&mut buffer, layout, ShardMask::from_bits(0b111).unwrap()),
        Err(RsError::TooManyTargets {
            targets: 3,
            parity: 2
        })
    );
}

#[test]
fn test_buffer_parity_check() {
    let rs = ReedSolomon::new(3, 3).unwrap();
    let (mut buffer, layout) = packed(&rs, 2, 6);
    let mut scratch = vec![0u8; 6];
    assert!(rs
        .is_parity_correct_buffer(&buffer, layout, &mut scratch)
        .unwrap());

    buffer[2 + 6 * 4 + 1] ^= 1;
    assert!(!rs
        .is_parity_correct_buffer(&buffer, layout, &mut scratch)
        .unwrap());
    assert_eq!(
        rs.is_parity_correct_buffer(&buffer, layout, &mut [0u8; 5]),
        Err(RsError::ScratchTooSmall {
            needed: 6,
            actual: 5
        })
    );
}
