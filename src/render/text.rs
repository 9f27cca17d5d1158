use std::collections::HashMap;

use usvg::fontdb;

use crate::foundation::core::{Point, Vec2};
use crate::foundation::error::{BannerError, BannerResult};
use crate::render::fonts::{FontCatalog, FontFace, FontSources, GenericFamily};

/// Glyph positioned relative to the top-left corner of its layout box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedGlyph {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

/// Glyphs of one shaping run, all drawn from the same face.
#[derive(Clone, Debug)]
pub struct GlyphSpan {
    pub(crate) font: vello_cpu::peniko::FontData,
    pub(crate) font_size: f32,
    pub(crate) glyphs: Vec<PlacedGlyph>,
}

/// A shaped single line of text, ready to be drawn at any origin.
#[derive(Clone, Debug)]
pub struct TextRun {
    pub(crate) spans: Vec<GlyphSpan>,
    font_size: f32,
    width: f32,
    height: f32,
    family: String,
}

impl TextRun {
    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Family of the face the run was shaped with.
    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn glyph_count(&self) -> usize {
        self.spans.iter().map(|s| s.glyphs.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub(crate) fn glyphs(&self) -> impl Iterator<Item = &PlacedGlyph> {
        self.spans.iter().flat_map(|s| s.glyphs.iter())
    }

    /// Top-left corner that centers the run horizontally and vertically on `anchor`.
    pub fn origin_centered_on(&self, anchor: Point) -> Point {
        anchor - Vec2::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }
}

/// Stateful helper for building Parley layouts from registered font bytes.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Register font bytes with the layout collection, returning the family name Parley knows
    /// them by.
    pub fn register(&mut self, font_bytes: &[u8]) -> BannerResult<String> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| BannerError::font("no font families registered from font bytes"))?;

        self.font_ctx
            .collection
            .family_name(family_id)
            .map(str::to_string)
            .ok_or_else(|| BannerError::font("registered font family has no name"))
    }

    /// Shape `text` as a single unwrapped line in a previously registered family.
    pub fn layout_line(
        &mut self,
        text: &str,
        family_name: &str,
        size_px: f32,
    ) -> BannerResult<parley::Layout<()>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(BannerError::render("text size_px must be finite and > 0"));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name.to_string())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));

        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

struct RegisteredFace {
    layout_family: String,
    family: String,
}

/// `.notdef`: the face has no outline for the character.
const MISSING_GLYPH: u32 = 0;

/// Font catalog plus layout engine: turns (text, family, size) into a drawable [`TextRun`].
pub struct Typesetter {
    catalog: FontCatalog,
    engine: TextLayoutEngine,
    registered: HashMap<fontdb::ID, RegisteredFace>,
    /// Draw-side copies of the faces Parley shaped with, keyed by (blob id, face index).
    draw_fonts: HashMap<(u64, u32), vello_cpu::peniko::FontData>,
}

impl std::fmt::Debug for Typesetter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Typesetter")
            .field("catalog", &self.catalog)
            .field("registered", &self.registered.len())
            .finish()
    }
}

impl Typesetter {
    pub fn new(sources: &FontSources) -> BannerResult<Self> {
        Ok(Self {
            catalog: FontCatalog::load(sources)?,
            engine: TextLayoutEngine::new(),
            registered: HashMap::new(),
            draw_fonts: HashMap::new(),
        })
    }

    /// Resolve a family without shaping anything.
    pub fn resolve(&mut self, family: &str, generic: GenericFamily) -> BannerResult<FontFace> {
        self.catalog.resolve(family, generic)
    }

    pub fn layout(
        &mut self,
        text: &str,
        family: &str,
        generic: GenericFamily,
        size_px: f32,
    ) -> BannerResult<TextRun> {
        let face = self.catalog.resolve(family, generic)?;
        if !self.registered.contains_key(&face.id) {
            let layout_family = self.engine.register(&face.data)?;
            self.registered.insert(
                face.id,
                RegisteredFace {
                    layout_family,
                    family: face.family.clone(),
                },
            );
        }
        let registered = self
            .registered
            .get(&face.id)
            .ok_or_else(|| BannerError::font("font face registration was lost"))?;

        let layout = self
            .engine
            .layout_line(text, &registered.layout_family, size_px)?;

        let mut spans = Vec::new();
        let mut font_size = size_px;
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                font_size = run.run().font_size();
                let mut glyphs: Vec<PlacedGlyph> = run
                    .positioned_glyphs()
                    .map(|g| PlacedGlyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    })
                    .collect();
                let shaped_count = glyphs.len();
                glyphs.retain(|g| g.id != MISSING_GLYPH);
                if glyphs.len() < shaped_count {
                    tracing::debug!(family, "dropped glyphs missing from the shaping face");
                }
                if glyphs.is_empty() {
                    continue;
                }

                // Glyph ids index into the face Parley picked for this run, which may be a
                // fallback rather than the requested face.
                let shaped = run.run().font();
                let font = self
                    .draw_fonts
                    .entry((shaped.data.id(), shaped.index))
                    .or_insert_with(|| {
                        vello_cpu::peniko::FontData::new(
                            vello_cpu::peniko::Blob::from(shaped.data.data().to_vec()),
                            shaped.index,
                        )
                    })
                    .clone();
                spans.push(GlyphSpan {
                    font,
                    font_size: run.run().font_size(),
                    glyphs,
                });
            }
        }

        Ok(TextRun {
            spans,
            font_size,
            width: layout.width(),
            height: layout.height(),
            family: registered.family.clone(),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
