use core::fmt;

use crate::canvas::Canvas;

/// Human readable dump of a canvas, its storage and its statistics.
///
/// Meant for debugging only, the format is not stable. Created by [`Canvas::info`].
pub struct Info<'a> {
    canvas: &'a Canvas,
}

impl<'a> Info<'a> {
    pub(crate) fn new(canvas: &'a Canvas) -> Self {
        Info { canvas }
    }
}

impl fmt::Display for Info<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let canvas = self.canvas;
        writeln!(
            f,
            "canvas {}x{} {}, {:?} storage, autoalloc {:?}",
            canvas.width(),
            canvas.height(),
            canvas.tag(),
            canvas.storage(),
            canvas.autoalloc(),
        )?;
        writeln!(f, "refs: {}", canvas.stats().snapshot())?;
        canvas.backing().store().fmt_info(f)
    }
}
