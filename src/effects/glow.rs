use crate::effects::{EffectContext, EffectProcedure};
use crate::foundation::error::BannerResult;
use crate::render::fonts::GenericFamily;
use crate::render::surface::Shadow;

/// (blur, alpha) of the halo passes, widest first.
const HALO: [(f32, f32); 4] = [(20.0, 0.8), (15.0, 0.6), (10.0, 0.4), (5.0, 0.3)];

pub(crate) struct Glow;

impl EffectProcedure for Glow {
    fn draw(&self, cx: &mut EffectContext<'_>) -> BannerResult<()> {
        let run = cx.banner_run(cx.font_size, GenericFamily::SansSerif)?;
        let origin = cx.centered(&run);

        for (blur, alpha) in HALO {
            cx.surface.set_shadow(Shadow::glow(cx.color, blur));
            cx.surface.set_global_alpha(alpha);
            cx.surface.fill_text(&run, origin, cx.color)?;
        }

        cx.surface.set_global_alpha(1.0);
        cx.surface.clear_shadow();
        cx.surface.fill_text(&run, origin, cx.color)
    }
}
