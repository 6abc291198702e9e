use super::*;
use crate::foundation::core::PixelFormat;
use crate::foundation::math::premultiply;

const RED: Rgb = Rgb::new(255, 0, 0);
const BLUE: Rgb = Rgb::new(0, 0, 255);
const GLYPH_W: u32 = 4;
const GLYPH_H: u32 = 8;

struct MockFont {
    outline: u32,
}

/// Draws every glyph as a solid `GLYPH_W x GLYPH_H` block; outline mode pads the box by the
/// outline width on each side.
#[derive(Default)]
struct MockRasterizer {
    calls: Vec<(u32, String)>,
}

impl GlyphRasterizer for MockRasterizer {
    type Font = MockFont;

    fn rasterize(
        &mut self,
        font: &mut MockFont,
        text: &str,
        color: Rgb,
    ) -> RenderTextResult<Surface> {
        self.calls.push((font.outline, text.to_string()));
        if text.is_empty() {
            return Err(RenderTextError::rasterize("text has zero width"));
        }
        let w = text.chars().count() as u32 * GLYPH_W + 2 * font.outline;
        let h = GLYPH_H + 2 * font.outline;
        let data = premultiply(color.to_rgba8()).repeat((w * h) as usize);
        Surface::from_raw(data, w, h, w as usize * 4, PixelFormat::Rgba8Premul)
    }
}

fn composite(
    r: &mut MockRasterizer,
    thickness: u32,
    text: &str,
    opts: CompositorOpts,
) -> RenderTextResult<Surface> {
    composite_outlined(
        r,
        &mut MockFont { outline: 0 },
        &mut MockFont { outline: thickness },
        thickness,
        text,
        RED,
        BLUE,
        opts,
    )
}

#[test]
fn outline_pass_runs_before_fill_pass() {
    let mut r = MockRasterizer::default();
    composite(&mut r, 2, "abc", CompositorOpts::default()).unwrap();
    assert_eq!(r.calls, vec![(2, "abc".to_string()), (0, "abc".to_string())]);
}

#[test]
fn canvas_is_power_of_two_and_centered() {
    let mut r = MockRasterizer::default();
    // fill 12x8, stroke 16x12, canvas 16x16, stroke placed at (0, 2), fill at (2, 4).
    let s = composite(&mut r, 2, "abc", CompositorOpts::default()).unwrap();

    assert_eq!((s.width(), s.height()), (16, 16));
    assert_eq!(s.format(), PixelFormat::Rgba8888);
    assert_eq!(s.pitch(), 16 * 4);
    assert_eq!(s.blend_mode(), BlendMode::None);

    assert_eq!(s.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(s.pixel(0, 1), Some([0, 0, 0, 0]));
    assert_eq!(s.pixel(0, 2), Some([0, 0, 255, 255]));
    assert_eq!(s.pixel(15, 13), Some([0, 0, 255, 255]));
    assert_eq!(s.pixel(15, 14), Some([0, 0, 0, 0]));

    assert_eq!(s.pixel(1, 4), Some([0, 0, 255, 255]));
    assert_eq!(s.pixel(2, 4), Some([255, 0, 0, 255]));
    assert_eq!(s.pixel(13, 11), Some([255, 0, 0, 255]));
    assert_eq!(s.pixel(14, 11), Some([0, 0, 255, 255]));
    assert_eq!(s.pixel(13, 12), Some([0, 0, 255, 255]));
}

#[test]
fn zero_thickness_is_fill_only() {
    let mut r = MockRasterizer::default();
    // fill and stroke both 12x8, canvas 16x8, placed at (2, 0).
    let s = composite(&mut r, 0, "abc", CompositorOpts::default()).unwrap();

    assert_eq!((s.width(), s.height()), (16, 8));
    assert_eq!(s.pixel(1, 0), Some([0, 0, 0, 0]));
    assert_eq!(s.pixel(2, 0), Some([255, 0, 0, 255]));
    assert_eq!(s.pixel(13, 7), Some([255, 0, 0, 255]));
    assert_eq!(s.pixel(14, 7), Some([0, 0, 0, 0]));
}

#[test]
fn fill_offset_override_moves_the_fill_pass() {
    let mut r = MockRasterizer::default();
    let opts = CompositorOpts::default().with_fill_offset(Some((0, 0)));
    assert_eq!(opts.fill_offset(), Some((0, 0)));
    let s = composite(&mut r, 2, "abc", opts).unwrap();

    assert_eq!((s.width(), s.height()), (16, 16));
    assert_eq!(s.pixel(0, 2), Some([255, 0, 0, 255]));
    assert_eq!(s.pixel(11, 9), Some([255, 0, 0, 255]));
    assert_eq!(s.pixel(12, 2), Some([0, 0, 255, 255]));
    assert_eq!(s.pixel(0, 10), Some([0, 0, 255, 255]));
}

#[test]
fn rasterize_failure_propagates() {
    let mut r = MockRasterizer::default();
    let err = composite(&mut r, 1, "", CompositorOpts::default()).unwrap_err();
    assert!(matches!(err, RenderTextError::Rasterize(_)), "{err}");
    assert_eq!(r.calls.len(), 1);
}

#[test]
fn parse_offset_accepts_pairs_only() {
    assert_eq!(parse_offset("3,4"), Some((3, 4)));
    assert_eq!(parse_offset(" -1 , 2 "), Some((-1, 2)));
    assert_eq!(parse_offset("3"), None);
    assert_eq!(parse_offset("a,b"), None);
    assert_eq!(parse_offset(""), None);
}

#[test]
fn default_opts_have_no_offset_override() {
    assert_eq!(CompositorOpts::default().fill_offset(), None);
}

#[test]
fn compositor_renders_batches_in_input_order() {
    let mut c = TextCompositor::new(
        MockRasterizer::default(),
        MockFont { outline: 0 },
        MockFont { outline: 2 },
        2,
    );
    assert_eq!(c.thickness(), 2);

    // "a": stroke 8x12 -> 8x16; "abcd": stroke 20x12 -> 32x16.
    let out = c.render_all(["a", "abcd", "ab"], RED, BLUE).unwrap();
    let sizes: Vec<_> = out.iter().map(|s| (s.width(), s.height())).collect();
    assert_eq!(sizes, vec![(8, 16), (32, 16), (16, 16)]);

    let single = c.render("abcd", RED, BLUE).unwrap();
    assert_eq!(single, out[1]);
}

#[test]
fn compositor_batch_stops_at_first_failure() {
    let mut c = TextCompositor::new(
        MockRasterizer::default(),
        MockFont { outline: 0 },
        MockFont { outline: 1 },
        1,
    );
    let err = c
        .render_all(vec!["ok".to_string(), String::new(), "never".to_string()], RED, BLUE)
        .unwrap_err();
    assert!(matches!(err, RenderTextError::Rasterize(_)));
    assert!(c.rasterizer.calls.iter().all(|(_, t)| t != "never"));
}
