//! Benchmarks walking a canvas portion by portion.
use brunch::Bench;

use image_tag::{Alpha, Format, Precision, Tag};
use tile_canvas::{Canvas, CanvasError, Storage};

struct Walk {
    tag: Tag,
    storage: Storage,
    sz: u32,
    /// Free every portion after visiting it, so each pass allocates again.
    unalloc: bool,
}

impl Walk {
    fn name(&self) -> String {
        format!(
            "{:?}, {:?}, {}{}",
            self.tag,
            self.storage,
            self.sz,
            if self.unalloc { ", unalloc" } else { "" },
        )
    }

    fn prepare(self) -> Result<impl FnMut(), CanvasError> {
        let mut canvas = Canvas::new(self.tag, self.sz, self.sz, self.storage)?;
        let unalloc = self.unalloc;

        Ok(move || {
            let mut y = 0;
            while y < canvas.height() {
                let mut x = 0;
                while x < canvas.width() {
                    canvas.portion_ref_rw(x, y).unwrap();
                    let width = canvas.portion_width(x, y);
                    if let Some(data) = canvas.portion_data_mut(x, y) {
                        data[0] = data[0].wrapping_add(1);
                    }
                    canvas.portion_unref(x, y).unwrap();
                    if unalloc {
                        canvas.portion_unalloc(x, y).unwrap();
                    }
                    x += width;
                }
                y += canvas.portion_height(0, y);
            }
        })
    }
}

fn main() {
    let rgba = Tag::new(Precision::U8, Format::Rgb, Alpha::Yes);
    let gray16 = Tag::new(Precision::U16, Format::Gray, Alpha::No);

    let tests = [
        // Memory stays, only the reference protocol is measured.
        Walk {
            tag: rgba,
            storage: Storage::Flat,
            sz: 1024,
            unalloc: false,
        },
        Walk {
            tag: rgba,
            storage: Storage::Tiled,
            sz: 1024,
            unalloc: false,
        },
        Walk {
            tag: gray16,
            storage: Storage::Tiled,
            sz: 1000,
            unalloc: false,
        },
        // Allocation and zero-filling on every pass.
        Walk {
            tag: rgba,
            storage: Storage::Flat,
            sz: 1024,
            unalloc: true,
        },
        Walk {
            tag: rgba,
            storage: Storage::Tiled,
            sz: 1024,
            unalloc: true,
        },
    ];

    let mut benches = brunch::Benches::default();
    benches.extend(tests.map(|walk| {
        Bench::new(format!("canvas::portion::walk({})", walk.name()))
            .run(walk.prepare().expect("Failed to setup benchmark"))
    }));
    benches.finish();
}
