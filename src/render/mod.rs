pub(crate) mod blur;
pub(crate) mod composite;
pub(crate) mod fonts;
pub(crate) mod gradient;
pub(crate) mod surface;
pub(crate) mod text;
