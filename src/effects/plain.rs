use crate::effects::{EffectContext, EffectProcedure};
use crate::foundation::core::Rgba8;
use crate::foundation::error::BannerResult;
use crate::render::fonts::GenericFamily;
use crate::render::surface::Shadow;

/// Flat fill with a soft drop shadow down and to the right.
pub(crate) struct Plain;

impl EffectProcedure for Plain {
    fn draw(&self, cx: &mut EffectContext<'_>) -> BannerResult<()> {
        let run = cx.banner_run(cx.font_size, GenericFamily::SansSerif)?;
        let origin = cx.centered(&run);

        cx.surface
            .set_shadow(Shadow::glow(Rgba8::BLACK.with_alpha(0.5), 4.0).offset_by(2.0, 2.0));
        cx.surface.fill_text(&run, origin, cx.color)
    }
}
