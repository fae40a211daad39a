use libplanar::{
    bitmap::{blit::CpuBlitter, memory::HeapAllocator},
    codec::{self, BmHeader, HEADER_LEN},
    planar::{read_pixel, write_pixel},
    BitMapStore, CreateOptions, Error, Layout,
};
use mktemp::Temp;

mod common;
use common::{encoded, fill, fill_pattern, snapshot};

const VERSION_OFFSET: usize = 5;

#[test]
fn bitmaps_survive_encode_and_decode() -> anyhow::Result<()> {
    let mut store = BitMapStore::new();
    for (width, height) in [(48, 5), (20, 3), (1, 7), (0, 4), (16, 0), (0, 0)] {
        for depth in 1..=8 {
            for interleaved in [false, true] {
                let options = CreateOptions::builder().interleaved(interleaved).build();
                let mut bitmap = store.create(width, height, depth, options)?;
                fill_pattern(&mut bitmap);
                let row_bytes = usize::from(width.div_ceil(8));

                let bytes = encoded(&bitmap);
                assert_eq!(
                    bytes.len(),
                    HEADER_LEN + row_bytes * usize::from(height) * usize::from(depth)
                );
                let header = BmHeader::from_reader(&mut bytes.as_slice())?;
                assert_eq!(
                    (header.width, header.height, header.depth),
                    (bitmap.width(), height, depth)
                );
                assert_eq!(header.version, 0);
                assert_eq!(header.is_interleaved(), bitmap.is_interleaved());

                let decoded = store.decode(bytes.as_slice())?;
                let context = format!("{width}x{height}@{depth}, interleaved: {interleaved}");
                assert_eq!(decoded.layout(), bitmap.layout(), "{context}");
                assert_eq!(decoded.stride(), bitmap.stride(), "{context}");
                assert_eq!(decoded.width(), bitmap.width(), "{context}");
                assert_eq!(decoded.rows(), bitmap.rows(), "{context}");
                assert_eq!(decoded.depth(), bitmap.depth(), "{context}");
                assert_eq!(snapshot(&decoded), snapshot(&bitmap), "{context}");
                store.destroy(decoded);
                store.destroy(bitmap);
            }
        }
    }
    assert_eq!(store.allocator().in_use(), 0);
    Ok(())
}

#[test]
fn oversized_headers_fail_to_allocate() {
    let mut store = BitMapStore::with_parts(HeapAllocator::with_budget(1 << 20), CpuBlitter::new());
    // 65528 x 65535 pixels with 8 planes, 512 MiB per plane
    let header = [0xf8, 0xff, 0xff, 0xff, 8, 0, 0, 0, 0];
    assert!(matches!(
        store.decode(header.as_slice()),
        Err(Error::AllocationFailure { size: 536_797_185 })
    ));

    let mut interleaved = header;
    interleaved[6] = 1;
    assert!(matches!(
        store.decode(interleaved.as_slice()),
        Err(Error::AllocationFailure { .. })
    ));
    assert_eq!(store.allocator().in_use(), 0);
}

#[test]
fn file_layout_matches_plane_order() -> anyhow::Result<()> {
    let mut store = BitMapStore::new();

    // separate: all rows of plane 0, then all rows of plane 1
    let mut separate = store.create(8, 2, 2, CreateOptions::default())?;
    separate.row_mut(0, 0).unwrap()[0] = 0x01;
    separate.row_mut(0, 1).unwrap()[0] = 0x02;
    separate.row_mut(1, 0).unwrap()[0] = 0x03;
    separate.row_mut(1, 1).unwrap()[0] = 0x04;
    assert_eq!(encoded(&separate)[HEADER_LEN..], [0x01, 0x02, 0x03, 0x04]);
    assert_eq!(encoded(&separate)[..HEADER_LEN], [8, 0, 2, 0, 2, 0, 0, 0, 0]);

    // interleaved: for every row, plane 0 then plane 1
    let options = CreateOptions::builder().interleaved(true).build();
    let mut interleaved = store.create(8, 2, 2, options)?;
    interleaved.row_mut(0, 0).unwrap()[0] = 0x01;
    interleaved.row_mut(0, 1).unwrap()[0] = 0x02;
    interleaved.row_mut(1, 0).unwrap()[0] = 0x03;
    interleaved.row_mut(1, 1).unwrap()[0] = 0x04;
    assert_eq!(encoded(&interleaved)[HEADER_LEN..], [0x01, 0x03, 0x02, 0x04]);
    assert_eq!(encoded(&interleaved)[6], 1);
    Ok(())
}

#[test]
fn bitmaps_survive_a_file_round_trip() -> anyhow::Result<()> {
    let mut store = BitMapStore::new();
    let options = CreateOptions::builder().interleaved(true).build();
    let mut bitmap = store.create(320, 16, 5, options)?;
    fill_pattern(&mut bitmap);
    write_pixel(&mut bitmap, 100, 10, 0b10110);

    let tmp = Temp::new_file()?;
    codec::save(&bitmap, &tmp)?;
    let loaded = store.load(&tmp)?;
    assert!(loaded.is_interleaved());
    assert_eq!(read_pixel(&loaded, 100, 10), Some(0b10110));
    assert_eq!(snapshot(&loaded), snapshot(&bitmap));
    Ok(())
}

#[test]
fn unknown_versions_are_rejected() -> anyhow::Result<()> {
    let mut store = BitMapStore::new();
    let source = store.create(8, 8, 2, CreateOptions::default())?;
    let mut bytes = encoded(&source);
    bytes[VERSION_OFFSET] = 1;

    assert!(matches!(
        store.decode(bytes.as_slice()),
        Err(Error::UnsupportedVersion(1))
    ));
    assert_eq!(store.allocator().in_use(), 8 * 2);

    let mut target = store.create(64, 64, 2, CreateOptions::default())?;
    fill(&mut target, 0xa5);
    let before = snapshot(&target);
    assert!(matches!(
        codec::decode_into(&mut target, bytes.as_slice(), 0, 0),
        Err(Error::UnsupportedVersion(1))
    ));
    assert_eq!(snapshot(&target), before);
    Ok(())
}

#[test]
fn overlay_writes_only_the_covered_bytes() -> anyhow::Result<()> {
    let mut store = BitMapStore::new();
    for interleaved in [false, true] {
        let options = CreateOptions::builder().interleaved(interleaved).build();
        let mut tile = store.create(16, 3, 2, options)?;
        fill(&mut tile, 0xff);
        let bytes = encoded(&tile);

        let mut target = store.create(64, 10, 2, options)?;
        codec::decode_into(&mut target, bytes.as_slice(), 24, 4)?;

        for plane in 0..2 {
            for row in 0..10 {
                let expected: Vec<u8> = (0..8)
                    .map(|column| {
                        let covered = (4..7).contains(&row) && (3..5).contains(&column);
                        if covered {
                            0xff
                        } else {
                            0x00
                        }
                    })
                    .collect();
                assert_eq!(
                    target.row(plane, row).unwrap(),
                    expected,
                    "interleaved: {interleaved}, plane {plane}, row {row}"
                );
            }
        }
        store.destroy(target);
        store.destroy(tile);
    }
    Ok(())
}

#[test]
fn overlay_keeps_planes_beyond_the_source_depth() -> anyhow::Result<()> {
    let mut store = BitMapStore::new();
    for interleaved in [false, true] {
        let options = CreateOptions::builder().interleaved(interleaved).build();
        let mut tile = store.create(8, 2, 2, options)?;
        fill(&mut tile, 0xff);
        let mut target = store.create(16, 4, 4, options)?;
        fill(&mut target, 0x11);

        codec::decode_into(&mut target, encoded(&tile).as_slice(), 8, 1)?;
        assert_eq!(target.row(0, 1).unwrap(), [0x11, 0xff]);
        assert_eq!(target.row(1, 2).unwrap(), [0x11, 0xff]);
        assert_eq!(target.row(2, 1).unwrap(), [0x11, 0x11]);
        assert_eq!(target.row(3, 2).unwrap(), [0x11, 0x11]);
        assert_eq!(target.row(0, 3).unwrap(), [0x11, 0x11]);
        // 0x11 sets the bits of pixels 3 and 7 of every byte
        assert_eq!(read_pixel(&target, 9, 2), Some(0b0011));
        assert_eq!(read_pixel(&target, 11, 2), Some(0b1111));
    }
    Ok(())
}

#[test]
fn overlay_outside_of_the_target_is_rejected() -> anyhow::Result<()> {
    let mut store = BitMapStore::new();
    for interleaved in [false, true] {
        let options = CreateOptions::builder().interleaved(interleaved).build();
        let mut tile = store.create(16, 8, 2, options)?;
        fill_pattern(&mut tile);
        let bytes = encoded(&tile);

        let mut target = store.create(32, 16, 2, options)?;
        fill(&mut target, 0x3c);
        let before = snapshot(&target);

        for (x, y) in [(17, 0), (0, 9), (32, 16), (u16::MAX, 0), (0, u16::MAX)] {
            let result = codec::decode_into(&mut target, bytes.as_slice(), x, y);
            assert!(
                matches!(result, Err(Error::OutOfBounds { width: 16, height: 8, .. })),
                "interleaved: {interleaved}, {x},{y}: {result:?}"
            );
            assert_eq!(snapshot(&target), before);
        }
        // right at the edge fits
        codec::decode_into(&mut target, bytes.as_slice(), 16, 8)?;
        assert_ne!(snapshot(&target), before);
        store.destroy(target);
        store.destroy(tile);
    }
    Ok(())
}

#[test]
fn overlay_with_more_planes_is_rejected() -> anyhow::Result<()> {
    let mut store = BitMapStore::new();
    for interleaved in [false, true] {
        let options = CreateOptions::builder().interleaved(interleaved).build();
        let mut tile = store.create(8, 8, 3, options)?;
        fill(&mut tile, 0xff);
        let mut target = store.create(32, 32, 2, options)?;
        let before = snapshot(&target);

        let result = codec::decode_into(&mut target, encoded(&tile).as_slice(), 0, 0);
        assert!(
            matches!(
                result,
                Err(Error::DepthExceeded {
                    source_depth: 3,
                    destination_depth: 2
                })
            ),
            "interleaved: {interleaved}: {result:?}"
        );
        assert_eq!(snapshot(&target), before);
    }
    Ok(())
}

#[test]
fn overlay_with_a_different_layout_is_rejected() -> anyhow::Result<()> {
    let mut store = BitMapStore::new();
    let interleaved = CreateOptions::builder().interleaved(true).build();
    let mut tile = store.create(8, 8, 2, interleaved)?;
    fill(&mut tile, 0xff);
    let mut target = store.create(32, 32, 2, CreateOptions::default())?;
    let before = snapshot(&target);

    let result = codec::decode_into(&mut target, encoded(&tile).as_slice(), 0, 0);
    assert!(matches!(
        result,
        Err(Error::LayoutMismatch {
            source_layout: Layout::Interleaved,
            destination_layout: Layout::Separate
        })
    ));
    assert_eq!(snapshot(&target), before);

    // the layout check comes before the depth check
    let mut deep = store.create(8, 8, 3, interleaved)?;
    fill(&mut deep, 0xff);
    let result = codec::decode_into(&mut target, encoded(&deep).as_slice(), 0, 0);
    assert!(matches!(result, Err(Error::LayoutMismatch { .. })));
    assert_eq!(snapshot(&target), before);
    Ok(())
}

#[test]
fn truncated_files_are_rejected() -> anyhow::Result<()> {
    let mut store = BitMapStore::with_parts(HeapAllocator::new(), CpuBlitter::new());
    let mut tile = store.create(16, 4, 2, CreateOptions::default())?;
    fill(&mut tile, 0xff);
    let bytes = encoded(&tile);
    let in_use = store.allocator().in_use();
    let short = &bytes[..bytes.len() - 1];

    assert!(matches!(
        store.decode(short),
        Err(Error::Truncated { expected: 16 })
    ));
    // the partially read bitmap is released
    assert_eq!(store.allocator().in_use(), in_use);

    let mut target = store.create(32, 8, 2, CreateOptions::default())?;
    let before = snapshot(&target);
    assert!(matches!(
        codec::decode_into(&mut target, short, 8, 2),
        Err(Error::Truncated { .. })
    ));
    assert_eq!(snapshot(&target), before);

    assert!(matches!(
        store.decode(&bytes[..4]),
        Err(Error::Truncated { expected: HEADER_LEN })
    ));
    Ok(())
}

#[test]
fn missing_files_are_reported() -> anyhow::Result<()> {
    let mut store = BitMapStore::new();
    let missing = std::env::temp_dir().join("libplanar-this-file-does-not-exist.bm");
    assert!(matches!(store.load(&missing), Err(Error::FileNotFound(p)) if p == missing));

    let mut target = store.create(8, 8, 1, CreateOptions::default())?;
    assert!(matches!(
        codec::load_into(&mut target, &missing, 0, 0),
        Err(Error::FileNotFound(_))
    ));
    Ok(())
}

#[test]
fn overlay_from_a_file() -> anyhow::Result<()> {
    let mut store = BitMapStore::new();
    let mut tile = store.create(8, 1, 1, CreateOptions::default())?;
    fill(&mut tile, 0x81);
    let tmp = Temp::new_file()?;
    codec::save(&tile, &tmp)?;

    let mut target = store.create(16, 2, 1, CreateOptions::default())?;
    codec::load_into(&mut target, &tmp, 8, 1)?;
    assert_eq!(target.row(0, 1).unwrap(), [0x00, 0x81]);
    assert_eq!(target.row(0, 0).unwrap(), [0x00, 0x00]);
    Ok(())
}
