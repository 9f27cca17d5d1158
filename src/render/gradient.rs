use smallvec::SmallVec;

use crate::foundation::core::{Point, Rgba8, Rgba8Premul};

/// One color stop, `offset` in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    pub offset: f64,
    pub color: Rgba8,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GradientKind {
    /// Interpolates along the line from `start` to `end`.
    Linear { start: Point, end: Point },
    /// Interpolates by distance from `center`, reaching the last stop at `radius`.
    Radial { center: Point, radius: f64 },
}

/// Gradient paint with ordered color stops.
///
/// Colors are interpolated in premultiplied space; positions before the first stop or past the
/// last take the nearest stop's color.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    kind: GradientKind,
    stops: SmallVec<[ColorStop; 4]>,
}

impl Gradient {
    pub fn linear(start: Point, end: Point) -> Self {
        Self {
            kind: GradientKind::Linear { start, end },
            stops: SmallVec::new(),
        }
    }

    pub fn radial(center: Point, radius: f64) -> Self {
        Self {
            kind: GradientKind::Radial { center, radius },
            stops: SmallVec::new(),
        }
    }

    /// Append a stop. Stops are kept sorted by offset; equal offsets keep insertion order.
    pub fn with_stop(mut self, offset: f64, color: Rgba8) -> Self {
        let offset = if offset.is_finite() {
            offset.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let at = self.stops.partition_point(|s| s.offset <= offset);
        self.stops.insert(at, ColorStop { offset, color });
        self
    }

    pub fn kind(&self) -> GradientKind {
        self.kind
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Gradient parameter at `p`, clamped to `0.0..=1.0`.
    pub fn position(&self, p: Point) -> f64 {
        let t = match self.kind {
            GradientKind::Linear { start, end } => {
                let d = end - start;
                let len2 = d.hypot2();
                if len2 <= f64::EPSILON {
                    return 0.0;
                }
                (p - start).dot(d) / len2
            }
            GradientKind::Radial { center, radius } => {
                if radius <= f64::EPSILON {
                    return 1.0;
                }
                (p - center).hypot() / radius
            }
        };
        t.clamp(0.0, 1.0)
    }

    /// Premultiplied color at `p`.
    pub fn sample(&self, p: Point) -> Rgba8Premul {
        let t = self.position(p);
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return Rgba8Premul::transparent(),
        };
        if t <= first.offset {
            return first.color.premultiplied();
        }
        if t >= last.offset {
            return last.color.premultiplied();
        }

        let hi = self.stops.partition_point(|s| s.offset <= t);
        let a = self.stops[hi - 1];
        let b = self.stops[hi];
        let span = b.offset - a.offset;
        let u = if span <= f64::EPSILON {
            1.0
        } else {
            (t - a.offset) / span
        };
        lerp_premul(a.color.premultiplied(), b.color.premultiplied(), u)
    }
}

fn lerp_premul(a: Rgba8Premul, b: Rgba8Premul, u: f64) -> Rgba8Premul {
    let mix = |x: u8, y: u8| -> u8 {
        (f64::from(x) + (f64::from(y) - f64::from(x)) * u)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    Rgba8Premul {
        r: mix(a.r, b.r),
        g: mix(a.g, b.g),
        b: mix(a.b, b.b),
        a: mix(a.a, b.a),
    }
}
