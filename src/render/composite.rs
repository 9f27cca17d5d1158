use crate::foundation::error::{BannerError, BannerResult};
use crate::foundation::math::{mul_div255_u8, mul_div255_u16};

pub type PremulRgba8 = [u8; 4];

/// Integer pixel rectangle, half-open on the right and bottom edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelBounds {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl PixelBounds {
    pub fn width(self) -> u32 {
        (self.x1 - self.x0).max(0) as u32
    }

    pub fn height(self) -> u32 {
        (self.y1 - self.y0).max(0) as u32
    }

    pub fn inflate(self, by: i32) -> Self {
        Self {
            x0: self.x0 - by,
            y0: self.y0 - by,
            x1: self.x1 + by,
            y1: self.y1 + by,
        }
    }
}

/// Source-over of one premultiplied pixel, with `opacity` applied to the source.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Composite a `src_w`×`src_h` premultiplied buffer onto `dst` with its top-left corner at
/// `(at_x, at_y)`. Parts falling outside `dst` are clipped.
#[allow(clippy::too_many_arguments)]
pub fn over_region(
    dst: &mut [u8],
    dst_w: u32,
    dst_h: u32,
    src: &[u8],
    src_w: u32,
    src_h: u32,
    at_x: i32,
    at_y: i32,
    opacity: f32,
) -> BannerResult<()> {
    if dst.len() != (dst_w as usize) * (dst_h as usize) * 4
        || src.len() != (src_w as usize) * (src_h as usize) * 4
    {
        return Err(BannerError::render(
            "over_region expects buffers matching their dimensions",
        ));
    }
    if opacity <= 0.0 {
        return Ok(());
    }

    let x_start = at_x.max(0);
    let y_start = at_y.max(0);
    let x_end = (at_x + src_w as i32).min(dst_w as i32);
    let y_end = (at_y + src_h as i32).min(dst_h as i32);
    if x_start >= x_end || y_start >= y_end {
        return Ok(());
    }

    for y in y_start..y_end {
        let sy = (y - at_y) as usize;
        for x in x_start..x_end {
            let sx = (x - at_x) as usize;
            let si = (sy * src_w as usize + sx) * 4;
            let s = [src[si], src[si + 1], src[si + 2], src[si + 3]];
            if s[3] == 0 {
                continue;
            }
            let di = (y as usize * dst_w as usize + x as usize) * 4;
            let d = [dst[di], dst[di + 1], dst[di + 2], dst[di + 3]];
            dst[di..di + 4].copy_from_slice(&over(d, s, opacity));
        }
    }
    Ok(())
}

/// Tight bounds of the non-transparent pixels in a premultiplied buffer.
pub fn alpha_bounds(buf: &[u8], width: u32, height: u32) -> Option<PixelBounds> {
    let w = width as usize;
    let mut bounds: Option<PixelBounds> = None;
    for y in 0..height as usize {
        let row = &buf[y * w * 4..(y + 1) * w * 4];
        let first = row.chunks_exact(4).position(|px| px[3] != 0);
        let Some(first) = first else {
            continue;
        };
        let last = row.chunks_exact(4).rposition(|px| px[3] != 0).unwrap_or(first);
        let (x0, x1, y) = (first as i32, last as i32 + 1, y as i32);
        bounds = Some(match bounds {
            None => PixelBounds {
                x0,
                y0: y,
                x1,
                y1: y + 1,
            },
            Some(b) => PixelBounds {
                x0: b.x0.min(x0),
                y0: b.y0,
                x1: b.x1.max(x1),
                y1: y + 1,
            },
        });
    }
    bounds
}

/// Copy `region` out of a `width`×`height` buffer as a tinted coverage mask: every pixel becomes
/// `tint` scaled by the source alpha. Pixels of `region` outside the buffer are transparent.
pub fn tinted_coverage(
    buf: &[u8],
    width: u32,
    height: u32,
    region: PixelBounds,
    tint: PremulRgba8,
) -> Vec<u8> {
    let rw = region.width() as usize;
    let rh = region.height() as usize;
    let mut out = vec![0u8; rw * rh * 4];
    for ry in 0..rh {
        let y = region.y0 + ry as i32;
        if y < 0 || y >= height as i32 {
            continue;
        }
        for rx in 0..rw {
            let x = region.x0 + rx as i32;
            if x < 0 || x >= width as i32 {
                continue;
            }
            let a = buf[(y as usize * width as usize + x as usize) * 4 + 3];
            if a == 0 {
                continue;
            }
            let oi = (ry * rw + rx) * 4;
            for c in 0..4 {
                out[oi + c] = mul_div255_u16(u16::from(tint[c]), u16::from(a)) as u8;
            }
        }
    }
    out
}

/// Crop `region` (clipped to the buffer) out of a `width`×`height` buffer.
pub fn crop(buf: &[u8], width: u32, region: PixelBounds) -> Vec<u8> {
    let rw = region.width() as usize;
    let mut out = Vec::with_capacity(rw * region.height() as usize * 4);
    for y in region.y0..region.y1 {
        let start = (y as usize * width as usize + region.x0 as usize) * 4;
        out.extend_from_slice(&buf[start..start + rw * 4]);
    }
    out
}

/// Convert premultiplied RGBA8 into straight alpha in place.
pub fn unpremultiply_in_place(buf: &mut [u8]) {
    for px in buf.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        match a {
            0 => px[..3].fill(0),
            255 => {}
            _ => {
                for c in px.iter_mut().take(3) {
                    *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
                }
            }
        }
    }
}
