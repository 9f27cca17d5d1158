use crate::effects::{EffectContext, EffectProcedure};
use crate::foundation::core::Rgba8;
use crate::foundation::error::BannerResult;
use crate::render::fonts::GenericFamily;
use crate::render::surface::Shadow;

/// Glowing outline, white core, then a wide translucent halo in the text color.
pub(crate) struct Neon;

impl EffectProcedure for Neon {
    fn draw(&self, cx: &mut EffectContext<'_>) -> BannerResult<()> {
        let run = cx.banner_run(cx.font_size, GenericFamily::SansSerif)?;
        let origin = cx.centered(&run);

        cx.surface.set_line_width(3.0);
        cx.surface.set_shadow(Shadow::glow(cx.color, 15.0));
        cx.surface.stroke_text(&run, origin, cx.color)?;

        cx.surface.set_shadow(Shadow::glow(cx.color, 10.0));
        cx.surface.fill_text(&run, origin, Rgba8::WHITE)?;

        cx.surface.set_shadow(Shadow::glow(cx.color, 25.0));
        cx.surface.set_global_alpha(0.7);
        cx.surface.fill_text(&run, origin, cx.color)
    }
}
