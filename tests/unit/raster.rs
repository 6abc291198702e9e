use super::*;

#[path = "../support/mod.rs"]
mod support;
use support::test_font;

fn coverage(s: &Surface) -> usize {
    s.data().chunks_exact(4).filter(|px| px[3] != 0).count()
}

#[test]
fn fill_pass_is_tight_premultiplied_and_inked() {
    let Some(path) = test_font() else {
        eprintln!("skipping: no system font found (set RENDER_TEXT_TEST_FONT)");
        return;
    };
    let mut font = FontHandle::open(&path, 32).unwrap();
    let mut r = VelloRasterizer::new();

    let s = r.rasterize(&mut font, "Hello", Rgb::WHITE).unwrap();
    assert!(s.width() > 0 && s.height() > 0);
    assert_eq!(s.format(), PixelFormat::Rgba8Premul);
    assert_eq!(s.pitch(), s.width() as usize * 4);
    assert_eq!(s.data().len(), s.pitch() * s.height() as usize);
    assert!(coverage(&s) > 0);
}

#[test]
fn outline_mode_grows_the_box_by_thickness_on_each_side() {
    let Some(path) = test_font() else {
        eprintln!("skipping: no system font found (set RENDER_TEXT_TEST_FONT)");
        return;
    };
    let mut fill_font = FontHandle::open(&path, 32).unwrap();
    let mut outline_font = FontHandle::open(&path, 32).unwrap();
    outline_font.set_outline(3);
    let mut r = VelloRasterizer::new();

    let fill = r.rasterize(&mut fill_font, "Wq", Rgb::WHITE).unwrap();
    let stroke = r.rasterize(&mut outline_font, "Wq", Rgb::BLACK).unwrap();
    assert_eq!(stroke.width(), fill.width() + 6);
    assert_eq!(stroke.height(), fill.height() + 6);
    assert!(coverage(&stroke) > 0);
}

#[test]
fn empty_text_is_rasterize_error() {
    let Some(path) = test_font() else {
        eprintln!("skipping: no system font found (set RENDER_TEXT_TEST_FONT)");
        return;
    };
    let mut font = FontHandle::open(&path, 16).unwrap();
    let err = VelloRasterizer::default()
        .rasterize(&mut font, "", Rgb::WHITE)
        .unwrap_err();
    assert!(matches!(err, RenderTextError::Rasterize(_)), "{err}");
}

#[test]
fn rasterize_is_deterministic() {
    let Some(path) = test_font() else {
        eprintln!("skipping: no system font found (set RENDER_TEXT_TEST_FONT)");
        return;
    };
    let mut font = FontHandle::open(&path, 20).unwrap();
    let mut r = VelloRasterizer::new();
    let a = r.rasterize(&mut font, "abc", Rgb::new(200, 10, 10)).unwrap();
    let b = r.rasterize(&mut font, "abc", Rgb::new(200, 10, 10)).unwrap();
    assert_eq!(a, b);
}

/// Inclusive pixel box `(x0, y0, x1, y1)` of every pixel with non-zero alpha.
fn ink_box(s: &Surface) -> Option<(u32, u32, u32, u32)> {
    let mut b: Option<(u32, u32, u32, u32)> = None;
    for y in 0..s.height() {
        for x in 0..s.width() {
            if s.pixel(x, y).is_some_and(|px| px[3] != 0) {
                b = Some(match b {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                });
            }
        }
    }
    b
}

fn column_alpha(s: &Surface, x: u32) -> u32 {
    (0..s.height())
        .filter_map(|y| s.pixel(x, y))
        .map(|px| u32::from(px[3]))
        .sum()
}

#[test]
fn overhanging_ink_is_not_clipped() {
    let Some(path) = test_font() else {
        eprintln!("skipping: no system font found (set RENDER_TEXT_TEST_FONT)");
        return;
    };
    let mut font = FontHandle::open(&path, 96).unwrap();
    let mut r = VelloRasterizer::new();

    for text in ["j", "ƒ", "fj"] {
        let s = r.rasterize(&mut font, text, Rgb::WHITE).unwrap();
        assert!(coverage(&s) > 0, "{text:?}");
        assert_eq!(column_alpha(&s, 0), 0, "{text:?} has ink in its first column");
        assert_eq!(
            column_alpha(&s, s.width() - 1),
            0,
            "{text:?} has ink in its last column"
        );
    }
}

#[test]
fn fill_ink_sits_inside_the_stroke_ring() {
    let Some(path) = test_font() else {
        eprintln!("skipping: no system font found (set RENDER_TEXT_TEST_FONT)");
        return;
    };
    let t = 3u32;
    let mut fill_font = FontHandle::open(&path, 48).unwrap();
    let mut outline_font = FontHandle::open(&path, 48).unwrap();
    outline_font.set_outline(t);
    let mut r = VelloRasterizer::new();

    for text in ["I", "jI"] {
        let fill = r.rasterize(&mut fill_font, text, Rgb::WHITE).unwrap();
        let stroke = r.rasterize(&mut outline_font, text, Rgb::BLACK).unwrap();
        let (fx0, fy0, fx1, fy1) = ink_box(&fill).unwrap();
        let (sx0, sy0, sx1, sy1) = ink_box(&stroke).unwrap();

        // fill pass placed at (t, t) on the stroke pass
        let (fx0, fy0, fx1, fy1) = (fx0 + t, fy0 + t, fx1 + t, fy1 + t);
        assert!(sx0 < fx0 && fx1 < sx1, "{text:?}: x {sx0}..{sx1} vs {fx0}..{fx1}");
        assert!(sy0 < fy0 && fy1 < sy1, "{text:?}: y {sy0}..{sy1} vs {fy0}..{fy1}");
    }
}

#[test]
fn whitespace_advances_are_kept_on_both_sides() {
    let Some(path) = test_font() else {
        eprintln!("skipping: no system font found (set RENDER_TEXT_TEST_FONT)");
        return;
    };
    let mut font = FontHandle::open(&path, 32).unwrap();
    let mut r = VelloRasterizer::new();

    let plain = r.rasterize(&mut font, "Hi", Rgb::WHITE).unwrap().width();
    let leading = r.rasterize(&mut font, "   Hi", Rgb::WHITE).unwrap().width();
    let trailing = r.rasterize(&mut font, "Hi   ", Rgb::WHITE).unwrap().width();
    assert!(leading > plain, "{leading} <= {plain}");
    assert!(trailing > plain, "{trailing} <= {plain}");
    assert!(leading.abs_diff(trailing) <= 1, "{leading} vs {trailing}");
}
