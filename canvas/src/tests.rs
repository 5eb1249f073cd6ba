use alloc::rc::Rc;
use alloc::string::ToString;

use image_tag::{Alpha, Format, Precision, Tag};

use crate::{AutoAlloc, Canvas, CanvasError, PortionError, RefCounts, RefStats, Storage};

fn rgba() -> Tag {
    Tag::new(Precision::U8, Format::Rgb, Alpha::Yes)
}

const STORAGES: [Storage; 2] = [Storage::Flat, Storage::Tiled];

#[test]
fn tiled_grid() -> Result<(), CanvasError> {
    let canvas = Canvas::new(rgba(), 200, 150, Storage::Tiled)?;
    let tiles = canvas.tiles().expect("tiled storage");
    assert_eq!(tiles.tiles_per_row(), 4);
    assert_eq!(tiles.tile_count(), 4 * 3);
    assert!(canvas.flat().is_none());
    Ok(())
}

#[test]
fn construction_failures() {
    assert_eq!(
        Canvas::new(rgba(), 10, 10, Storage::Shared).err(),
        Some(CanvasError::UnsupportedStorage(Storage::Shared))
    );
    assert_eq!(
        Canvas::new(Tag::null(), 10, 10, Storage::Flat).err(),
        Some(CanvasError::InvalidTag(Tag::null()))
    );
    assert_eq!(
        Canvas::new(rgba(), 0, 10, Storage::Tiled).err(),
        Some(CanvasError::Empty {
            width: 0,
            height: 10
        })
    );

    for storage in STORAGES {
        assert_eq!(
            Canvas::new(rgba(), u32::MAX, u32::MAX, storage).err(),
            Some(CanvasError::TooLarge {
                width: u32::MAX,
                height: u32::MAX
            }),
            "{storage:?}"
        );
    }
}

#[test]
fn accessors() -> Result<(), CanvasError> {
    let tag = Tag::new(Precision::U16, Format::Gray, Alpha::Yes);
    let canvas = Canvas::new(tag, 33, 17, Storage::Flat)?;
    assert_eq!(canvas.tag(), tag);
    assert_eq!(canvas.precision(), Precision::U16);
    assert_eq!(canvas.format(), Format::Gray);
    assert_eq!(canvas.alpha(), Alpha::Yes);
    assert_eq!(canvas.storage(), Storage::Flat);
    assert_eq!(canvas.width(), 33);
    assert_eq!(canvas.height(), 17);
    assert_eq!(canvas.bytes(), 4);
    assert_eq!(canvas.autoalloc(), AutoAlloc::On);
    Ok(())
}

#[test]
fn allocation_lifecycle() -> Result<(), CanvasError> {
    for storage in STORAGES {
        let mut canvas = Canvas::new(rgba(), 130, 70, storage)?;
        for (x, y) in [(0, 0), (129, 0), (64, 65), (129, 69)] {
            assert!(!canvas.portion_alloced(x, y), "{storage:?} ({x}, {y})");

            canvas.portion_alloc(x, y).unwrap();
            assert!(canvas.portion_alloced(x, y));

            canvas.portion_unalloc(x, y).unwrap();
            assert!(!canvas.portion_alloced(x, y));

            canvas.portion_ref(x, y).unwrap();
            assert!(canvas.portion_alloced(x, y));
            canvas.portion_unref(x, y).unwrap();
            canvas.portion_unalloc(x, y).unwrap();
            assert!(!canvas.portion_alloced(x, y));
        }
    }

    Ok(())
}

#[test]
fn ref_count_balance() -> Result<(), CanvasError> {
    for storage in STORAGES {
        let mut canvas = Canvas::new(rgba(), 100, 100, storage)?;
        canvas.portion_ref(70, 70).unwrap();
        let before = canvas.portion_refs(70, 70);

        for i in 0..5 {
            if i % 2 == 0 {
                canvas.portion_ref(70, 70).unwrap();
            } else {
                canvas.portion_ref_rw(99, 99).unwrap();
            }
        }
        for _ in 0..5 {
            canvas.portion_unref(64, 64).unwrap();
        }

        assert_eq!(canvas.portion_refs(70, 70), before);
        assert_eq!(before, Some(1));
    }

    Ok(())
}

#[test]
fn unalloc_while_referenced_is_refused() -> Result<(), CanvasError> {
    for storage in STORAGES {
        let mut canvas = Canvas::new(rgba(), 80, 80, storage)?;
        canvas.portion_ref_rw(10, 10).unwrap();
        canvas.portion_data_mut(10, 10).unwrap()[0] = 42;

        assert_eq!(
            canvas.portion_unalloc(10, 10),
            Err(PortionError::Referenced { refs: 1 })
        );
        assert!(canvas.portion_alloced(10, 10));
        assert_eq!(canvas.portion_data(10, 10).unwrap()[0], 42);
        assert_eq!(canvas.stats().snapshot().unalloc_refused, 1);

        canvas.portion_unref(10, 10).unwrap();
        assert_eq!(canvas.portion_unalloc(10, 10), Ok(()));
    }

    Ok(())
}

#[test]
fn alloc_zero_fills() -> Result<(), CanvasError> {
    for storage in STORAGES {
        let mut canvas = Canvas::new(rgba(), 90, 90, storage)?;
        canvas.portion_alloc(80, 80).unwrap();
        canvas.portion_data_mut(80, 80).unwrap().fill(0xaa);
        canvas.portion_unalloc(80, 80).unwrap();

        canvas.portion_alloc(80, 80).unwrap();
        let origin = canvas.portion(80, 80).unwrap();
        let data = canvas.portion_data(origin.x, origin.y).unwrap();
        assert!(data.iter().all(|&b| b == 0), "{storage:?}");
    }

    Ok(())
}

#[test]
fn alloc_keeps_existing_memory() -> Result<(), CanvasError> {
    let mut canvas = Canvas::new(rgba(), 10, 10, Storage::Flat)?;
    canvas.portion_alloc(0, 0).unwrap();
    canvas.portion_data_mut(0, 0).unwrap()[0] = 1;
    canvas.portion_alloc(5, 5).unwrap();
    assert_eq!(canvas.portion_data(0, 0).unwrap()[0], 1);

    canvas.portion_init(9, 9).unwrap();
    assert_eq!(canvas.portion_data(0, 0).unwrap()[0], 0);
    Ok(())
}

#[test]
fn init_needs_memory() -> Result<(), CanvasError> {
    for storage in STORAGES {
        let mut canvas = Canvas::new(rgba(), 10, 10, storage)?;
        assert_eq!(canvas.portion_init(0, 0), Err(PortionError::Unallocated));
        assert_eq!(
            canvas.portion_init(10, 0),
            Err(PortionError::OutOfBounds { x: 10, y: 0 })
        );
    }

    Ok(())
}

#[test]
fn flat_geometry_is_remaining_extent() -> Result<(), CanvasError> {
    let canvas = Canvas::new(rgba(), 50, 40, Storage::Flat)?;
    assert_eq!(canvas.portion_x(10, 5), 0);
    assert_eq!(canvas.portion_y(10, 5), 0);
    assert_eq!(canvas.portion_width(10, 5), 50 - 10);
    assert_eq!(canvas.portion_height(10, 5), 40 - 5);
    assert_eq!(canvas.portion_rowstride(10, 5), 50 * 4);
    Ok(())
}

#[test]
fn tiled_geometry_is_aligned_tile() -> Result<(), CanvasError> {
    let canvas = Canvas::new(rgba(), 200, 150, Storage::Tiled)?;
    let portion = canvas.portion(199, 149).unwrap();
    assert_eq!((portion.x, portion.y), (192, 128));
    assert_eq!((portion.width, portion.height), (8, 22));
    assert_eq!(portion.rowstride, 64 * 4);
    assert!(!portion.alloced);

    assert_eq!(canvas.portion_width(10, 5), 64);
    assert_eq!(canvas.portion_x(70, 5), 64);
    Ok(())
}

#[test]
fn out_of_bounds_sentinels() -> Result<(), CanvasError> {
    for storage in STORAGES {
        let mut canvas = Canvas::new(rgba(), 20, 20, storage)?;
        assert_eq!(
            canvas.portion_ref(20, 0),
            Err(PortionError::OutOfBounds { x: 20, y: 0 })
        );
        assert!(canvas.portion_unref(0, 20).is_err());
        assert_eq!(canvas.portion_width(20, 0), 0);
        assert_eq!(canvas.portion_height(0, 20), 0);
        assert_eq!(canvas.portion_rowstride(20, 20), 0);
        assert!(canvas.portion_data(20, 20).is_none());
        assert!(canvas.portion(20, 0).is_none());
        assert!(!canvas.portion_alloced(21, 0));

        let counts = canvas.stats().snapshot();
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.unref_failed, 1);
    }

    Ok(())
}

#[test]
fn flat_unbalanced_unref() -> Result<(), CanvasError> {
    let mut canvas = Canvas::new(rgba(), 10, 10, Storage::Flat)?;
    assert_eq!(canvas.portion_ref(0, 0), Ok(()));
    assert!(canvas.portion_data(0, 0).is_some());

    assert_eq!(canvas.portion_unref(0, 0), Ok(()));
    assert_eq!(canvas.portion_unref(0, 0), Ok(()));
    assert_eq!(canvas.portion_refs(0, 0), Some(0));

    let counts = canvas.stats().snapshot();
    assert_eq!(counts.unref, 1);
    assert_eq!(counts.unref_failed, 1);
    Ok(())
}

#[test]
fn explicit_alloc_without_autoalloc() -> Result<(), CanvasError> {
    let mut canvas = Canvas::new(rgba(), 10, 10, Storage::Flat)?;
    assert_eq!(canvas.set_autoalloc(AutoAlloc::Off), AutoAlloc::Off);

    assert_eq!(canvas.portion_ref(0, 0), Err(PortionError::Unallocated));
    assert!(!canvas.portion_alloced(0, 0));

    assert_eq!(canvas.portion_alloc(0, 0), Ok(()));
    assert_eq!(canvas.portion_ref(0, 0), Ok(()));
    assert_eq!(canvas.portion_refs(0, 0), Some(1));
    Ok(())
}

#[test]
fn failed_ref_holds_nothing() -> Result<(), CanvasError> {
    for storage in STORAGES {
        let mut canvas = Canvas::new(rgba(), 100, 100, storage)?;

        canvas.set_autoalloc(AutoAlloc::Off);
        assert_eq!(canvas.portion_ref_rw(0, 0), Err(PortionError::Unallocated));
        assert_eq!(canvas.portion_refs(0, 0), Some(0));

        canvas.set_autoalloc(AutoAlloc::On);
        assert_eq!(
            canvas.portion_ref(100, 0),
            Err(PortionError::OutOfBounds { x: 100, y: 0 })
        );

        // A successful ref after the failures sees initialized memory and holds exactly one.
        canvas.portion_ref(0, 0).unwrap();
        assert_eq!(canvas.portion_refs(0, 0), Some(1));
        assert!(canvas.portion_data(0, 0).unwrap().iter().all(|&b| b == 0));

        let counts = canvas.stats().snapshot();
        assert_eq!((counts.read, counts.read_write, counts.failed), (1, 0, 2));
    }
    Ok(())
}

#[test]
fn shared_stats() -> Result<(), CanvasError> {
    let stats = Rc::new(RefStats::new());
    let mut a = Canvas::with_stats(rgba(), 10, 10, Storage::Flat, stats.clone())?;
    let mut b = Canvas::with_stats(rgba(), 100, 10, Storage::Tiled, stats.clone())?;

    a.portion_ref(0, 0).unwrap();
    b.portion_ref_rw(99, 0).unwrap();
    b.set_autoalloc(AutoAlloc::Off);
    assert!(b.portion_ref(0, 0).is_err());
    a.portion_unref(0, 0).unwrap();

    assert_eq!(
        stats.snapshot(),
        RefCounts {
            read: 1,
            read_write: 1,
            unref: 1,
            failed: 1,
            ..RefCounts::default()
        }
    );
    Ok(())
}

#[test]
fn texel_views() -> Result<(), CanvasError> {
    let tag = Tag::new(Precision::U16, Format::Rgb, Alpha::No);
    let mut canvas = Canvas::new(tag, 70, 10, Storage::Tiled)?;
    canvas.portion_ref_rw(65, 2).unwrap();

    let values = canvas.portion_texels_mut::<[u16; 3]>(65, 2).unwrap();
    values[0] = [1, 2, 0xffff];
    assert_eq!(
        canvas.portion_texels::<u16>(65, 2).unwrap()[..3],
        [1, 2, 0xffff]
    );
    // Channels are 16 bits, a 32-bit view does not divide the pixel.
    assert!(canvas.portion_texels::<u32>(65, 2).is_none());

    canvas.portion_unref(65, 2).unwrap();
    Ok(())
}

#[test]
fn realloc_reuses_matching() -> Result<(), CanvasError> {
    let mut canvas = Canvas::new(rgba(), 10, 10, Storage::Flat)?;
    canvas.portion_alloc(0, 0).unwrap();
    canvas.portion_data_mut(0, 0).unwrap()[0] = 9;

    let canvas = Canvas::realloc(Some(canvas), rgba(), 10, 10, Storage::Flat)?;
    assert_eq!(canvas.portion_data(0, 0).unwrap()[0], 9);

    let stats = canvas.stats().clone();
    let canvas = Canvas::realloc(Some(canvas), rgba(), 20, 10, Storage::Flat)?;
    assert_eq!(canvas.width(), 20);
    assert!(!canvas.portion_alloced(0, 0));
    assert!(Rc::ptr_eq(canvas.stats(), &stats));

    let canvas = Canvas::realloc(None, rgba(), 5, 5, Storage::Tiled)?;
    assert_eq!(canvas.storage(), Storage::Tiled);
    Ok(())
}

#[test]
fn autoalloc_from_integers() {
    assert_eq!(AutoAlloc::try_from(0i32), Ok(AutoAlloc::Off));
    assert_eq!(AutoAlloc::try_from(1i32), Ok(AutoAlloc::On));
    assert_eq!(AutoAlloc::try_from(7i32), Err(crate::BadAutoAlloc(7)));
}

#[test]
fn info_dump() -> Result<(), CanvasError> {
    let mut canvas = Canvas::new(rgba(), 200, 150, Storage::Tiled)?;
    canvas.portion_ref(130, 70).unwrap();
    let dump = canvas.info().to_string();
    assert!(dump.starts_with("canvas 200x150 rgb/u8+alpha (4 bytes), Tiled storage"));
    assert!(dump.contains("4x3 tiles, 1 of 12 alloced"));
    assert!(dump.contains("tile 6: alloced true, 1 refs"));

    let canvas = Canvas::new(rgba(), 10, 10, Storage::Flat)?;
    let dump = canvas.info().to_string();
    assert!(dump.contains("flatbuf 10x10, 400 bytes, invalid, 0 refs"));
    Ok(())
}
