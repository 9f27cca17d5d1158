use std::ops::{Deref, DerefMut};

use crate::foundation::core::{BezPath, Canvas, Point, Rect, Rgba8, Vec2};
use crate::foundation::error::{BannerError, BannerResult};
use crate::render::blur::{blur_margin, blur_rgba8_premul};
use crate::render::composite;
use crate::render::gradient::Gradient;
use crate::render::text::{GlyphSpan, TextRun};

/// A finished frame copied out of a [`Surface`].
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Straight-alpha copy of the pixel data.
    pub fn straight_rgba(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            composite::unpremultiply_in_place(&mut out);
        }
        out
    }

    /// Straight-alpha pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        let mut px = [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ];
        if self.premultiplied {
            composite::unpremultiply_in_place(&mut px);
        }
        Some(px)
    }
}

/// Drop shadow applied to every draw while set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    pub color: Rgba8,
    /// Blur radius in canvas units; the Gaussian sigma is half of it.
    pub blur: f32,
    pub offset: Vec2,
}

impl Shadow {
    pub const NONE: Shadow = Shadow {
        color: Rgba8::TRANSPARENT,
        blur: 0.0,
        offset: Vec2::ZERO,
    };

    /// Centered shadow, the building block of every glow.
    pub fn glow(color: Rgba8, blur: f32) -> Self {
        Self {
            color,
            blur,
            offset: Vec2::ZERO,
        }
    }

    pub fn offset_by(self, dx: f64, dy: f64) -> Self {
        Self {
            offset: Vec2::new(dx, dy),
            ..self
        }
    }

    /// A shadow is only drawn when it has color and is either blurred or displaced.
    pub fn is_visible(&self) -> bool {
        self.color.a > 0 && (self.blur > 0.0 || self.offset != Vec2::ZERO)
    }
}

/// Mutable drawing state consulted by every draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawState {
    pub shadow: Shadow,
    pub global_alpha: f32,
    pub line_width: f64,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            shadow: Shadow::NONE,
            global_alpha: 1.0,
            line_width: 1.0,
        }
    }
}

/// Premultiplied RGBA8 drawing surface of a fixed canvas size.
///
/// Every draw is rasterized into a scratch pixmap first, so a shadow can be derived from its
/// coverage before the shape itself is composited with source-over at the global alpha.
pub struct Surface {
    canvas: Canvas,
    width: u16,
    height: u16,
    pixels: Vec<u8>,
    scratch: vello_cpu::Pixmap,
    state: DrawState,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("canvas", &self.canvas)
            .field("state", &self.state)
            .finish()
    }
}

impl Surface {
    pub fn new(canvas: Canvas) -> BannerResult<Self> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(BannerError::render("surface dimensions must be non-zero"));
        }
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| BannerError::render("surface width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| BannerError::render("surface height exceeds u16"))?;

        Ok(Self {
            canvas,
            width,
            height,
            pixels: vec![0u8; canvas.rgba_len()],
            scratch: vello_cpu::Pixmap::new(width, height),
            state: DrawState::default(),
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Premultiplied pixel bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Remove all content. Draw state is left alone.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    pub fn state(&self) -> DrawState {
        self.state
    }

    pub fn set_shadow(&mut self, shadow: Shadow) {
        self.state.shadow = shadow;
    }

    pub fn clear_shadow(&mut self) {
        self.state.shadow = Shadow::NONE;
    }

    pub fn set_global_alpha(&mut self, alpha: f32) {
        if alpha.is_finite() {
            self.state.global_alpha = alpha.clamp(0.0, 1.0);
        }
    }

    pub fn set_line_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.state.line_width = width;
        }
    }

    pub fn reset_state(&mut self) {
        self.state = DrawState::default();
    }

    /// Borrow the surface with a guard that resets the draw state when it goes out of scope.
    pub fn scoped_state(&mut self) -> ScopedState<'_> {
        ScopedState { surface: self }
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Rgba8) -> BannerResult<()> {
        self.paint_layer(|ctx| {
            ctx.set_paint(cpu_color(color));
            ctx.fill_rect(&rect_to_cpu(rect));
        })
    }

    /// Fill `rect` with a gradient, sampled at pixel centers.
    pub fn fill_rect_gradient(&mut self, rect: Rect, gradient: &Gradient) -> BannerResult<()> {
        let (w, h) = (self.canvas.width, self.canvas.height);
        let rect = rect.abs();
        let span = |lo: f64, hi: f64, max: u32| -> (u32, u32) {
            let a = (lo - 0.5).ceil().clamp(0.0, f64::from(max)) as u32;
            let b = (hi - 0.5).ceil().clamp(0.0, f64::from(max)) as u32;
            (a, b)
        };
        let (x0, x1) = span(rect.x0, rect.x1, w);
        let (y0, y1) = span(rect.y0, rect.y1, h);

        let data = self.scratch.data_as_u8_slice_mut();
        data.fill(0);
        for y in y0..y1 {
            for x in x0..x1 {
                let c = gradient.sample(Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5));
                let i = ((y * w + x) * 4) as usize;
                data[i..i + 4].copy_from_slice(&c.to_array());
            }
        }
        self.composite_scratch()
    }

    pub fn fill_path(&mut self, path: &BezPath, color: Rgba8) -> BannerResult<()> {
        self.paint_layer(|ctx| {
            ctx.set_paint(cpu_color(color));
            ctx.fill_path(&bezpath_to_cpu(path));
        })
    }

    /// Stroke `path` at the current line width (butt caps, miter joins).
    pub fn stroke_path(&mut self, path: &BezPath, color: Rgba8) -> BannerResult<()> {
        let stroke = cpu_stroke(self.state.line_width);
        self.paint_layer(|ctx| {
            ctx.set_paint(cpu_color(color));
            ctx.set_stroke(stroke);
            ctx.stroke_path(&bezpath_to_cpu(path));
        })
    }

    /// Fill `run` with its layout box's top-left corner at `origin`.
    pub fn fill_text(&mut self, run: &TextRun, origin: Point, color: Rgba8) -> BannerResult<()> {
        self.paint_layer(|ctx| fill_glyphs(ctx, run, origin, color))
    }

    /// Stroke the glyph outlines of `run` at the current line width.
    pub fn stroke_text(&mut self, run: &TextRun, origin: Point, color: Rgba8) -> BannerResult<()> {
        if run.is_empty() {
            return Ok(());
        }
        let stroke = cpu_stroke(self.state.line_width);
        self.paint_layer(|ctx| {
            ctx.set_paint(cpu_color(color));
            ctx.set_stroke(stroke);
            for span in &run.spans {
                ctx.glyph_run(&span.font)
                    .font_size(span.font_size)
                    .stroke_glyphs(placed_glyphs(span, origin));
            }
        })
    }

    /// Draw several solid shapes as one layer. Shadow and global alpha apply to the layer as a
    /// whole.
    pub fn batch(&mut self, draw: impl FnOnce(&mut Batch<'_>)) -> BannerResult<()> {
        self.paint_layer(|ctx| {
            let mut batch = Batch { ctx };
            draw(&mut batch);
        })
    }

    /// Copy the current pixels out.
    pub fn to_frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.pixels.clone(),
            premultiplied: true,
        }
    }

    fn paint_layer(
        &mut self,
        draw: impl FnOnce(&mut vello_cpu::RenderContext),
    ) -> BannerResult<()> {
        let mut ctx = vello_cpu::RenderContext::new(self.width, self.height);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        draw(&mut ctx);
        ctx.flush();
        self.scratch.data_as_u8_slice_mut().fill(0);
        ctx.render_to_pixmap(&mut self.scratch);
        self.composite_scratch()
    }

    fn composite_scratch(&mut self) -> BannerResult<()> {
        let (w, h) = (self.canvas.width, self.canvas.height);
        let layer = self.scratch.data_as_u8_slice();
        let Some(bounds) = composite::alpha_bounds(layer, w, h) else {
            return Ok(());
        };
        let DrawState {
            shadow,
            global_alpha,
            ..
        } = self.state;

        if shadow.is_visible() {
            let sigma = shadow.blur.max(0.0) / 2.0;
            let region = bounds.inflate(blur_margin(sigma) as i32);
            let mask = composite::tinted_coverage(
                layer,
                w,
                h,
                region,
                shadow.color.premultiplied().to_array(),
            );
            let blurred = blur_rgba8_premul(&mask, region.width(), region.height(), sigma)?;
            composite::over_region(
                &mut self.pixels,
                w,
                h,
                &blurred,
                region.width(),
                region.height(),
                region.x0 + shadow.offset.x.round() as i32,
                region.y0 + shadow.offset.y.round() as i32,
                global_alpha,
            )?;
        }

        let shape = composite::crop(layer, w, bounds);
        composite::over_region(
            &mut self.pixels,
            w,
            h,
            &shape,
            bounds.width(),
            bounds.height(),
            bounds.x0,
            bounds.y0,
            global_alpha,
        )
    }
}

/// Solid draws collected into one layer by [`Surface::batch`].
pub struct Batch<'a> {
    ctx: &'a mut vello_cpu::RenderContext,
}

impl Batch<'_> {
    pub fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        self.ctx.set_paint(cpu_color(color));
        self.ctx.fill_rect(&rect_to_cpu(rect));
    }

    pub fn fill_path(&mut self, path: &BezPath, color: Rgba8) {
        self.ctx.set_paint(cpu_color(color));
        self.ctx.fill_path(&bezpath_to_cpu(path));
    }

    pub fn fill_text(&mut self, run: &TextRun, origin: Point, color: Rgba8) {
        fill_glyphs(self.ctx, run, origin, color);
    }
}

/// Resets the surface's draw state on drop, whichever way the scope is left.
pub struct ScopedState<'a> {
    surface: &'a mut Surface,
}

impl Deref for ScopedState<'_> {
    type Target = Surface;

    fn deref(&self) -> &Surface {
        self.surface
    }
}

impl DerefMut for ScopedState<'_> {
    fn deref_mut(&mut self) -> &mut Surface {
        self.surface
    }
}

impl Drop for ScopedState<'_> {
    fn drop(&mut self) {
        self.surface.reset_state();
    }
}

fn fill_glyphs(ctx: &mut vello_cpu::RenderContext, run: &TextRun, origin: Point, color: Rgba8) {
    if run.is_empty() {
        return;
    }
    ctx.set_paint(cpu_color(color));
    for span in &run.spans {
        ctx.glyph_run(&span.font)
            .font_size(span.font_size)
            .fill_glyphs(placed_glyphs(span, origin));
    }
}

fn placed_glyphs(span: &GlyphSpan, origin: Point) -> impl Iterator<Item = vello_cpu::Glyph> + '_ {
    let (ox, oy) = (origin.x as f32, origin.y as f32);
    span.glyphs.iter().map(move |g| vello_cpu::Glyph {
        id: g.id,
        x: ox + g.x,
        y: oy + g.y,
    })
}

fn cpu_color(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn cpu_stroke(width: f64) -> vello_cpu::kurbo::Stroke {
    vello_cpu::kurbo::Stroke::new(width)
        .with_caps(vello_cpu::kurbo::Cap::Butt)
        .with_join(vello_cpu::kurbo::Join::Miter)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
