use crate::foundation::error::{BannerError, BannerResult};

/// Gaussian blur of a premultiplied RGBA8 buffer, approximated with three box passes per axis.
///
/// Pixels outside the buffer count as transparent, so callers blurring a shadow should pad the
/// buffer by [`blur_margin`] on each side.
pub fn blur_rgba8_premul(src: &[u8], width: u32, height: u32, sigma: f32) -> BannerResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| BannerError::render("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(BannerError::render(
            "blur_rgba8_premul expects src matching width*height*4",
        ));
    }
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(BannerError::render("blur sigma must be finite and >= 0"));
    }
    if sigma < 0.5 || width == 0 || height == 0 {
        return Ok(src.to_vec());
    }

    let radii = box_radii(sigma);
    let mut a = src.to_vec();
    let mut b = vec![0u8; expected_len];
    for &r in &radii {
        horizontal_pass(&a, &mut b, width, height, r);
        vertical_pass(&b, &mut a, width, height, r);
    }
    Ok(a)
}

/// Padding (in pixels) needed around content so a blur with `sigma` is not clipped.
pub fn blur_margin(sigma: f32) -> u32 {
    if !sigma.is_finite() || sigma < 0.5 {
        return 0;
    }
    (sigma * 3.0).ceil() as u32
}

/// Box radii whose three successive passes approximate a Gaussian of `sigma`.
fn box_radii(sigma: f32) -> [usize; 3] {
    const PASSES: f64 = 3.0;
    let sigma = f64::from(sigma);
    let w_ideal = ((12.0 * sigma * sigma / PASSES) + 1.0).sqrt();
    let mut wl = w_ideal.floor() as i64;
    if wl % 2 == 0 {
        wl -= 1;
    }
    let wl = wl.max(1);
    let wu = wl + 2;
    let wlf = wl as f64;
    let m_ideal = (12.0 * sigma * sigma - PASSES * wlf * wlf - 4.0 * PASSES * wlf - 3.0 * PASSES)
        / (-4.0 * wlf - 4.0);
    let m = m_ideal.round().clamp(0.0, PASSES) as usize;

    let mut out = [0usize; 3];
    for (i, r) in out.iter_mut().enumerate() {
        let size = if i < m { wl } else { wu };
        *r = ((size - 1) / 2) as usize;
    }
    out
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, radius: usize) {
    let w = width as usize;
    let window = (2 * radius + 1) as u32;
    for y in 0..height as usize {
        let row = y * w * 4;
        let mut acc = [0u32; 4];
        for x in 0..=radius.min(w - 1) {
            for c in 0..4 {
                acc[c] += u32::from(src[row + x * 4 + c]);
            }
        }
        for x in 0..w {
            let out = row + x * 4;
            for c in 0..4 {
                dst[out + c] = div_round(acc[c], window);
            }
            let enter = x + radius + 1;
            if enter < w {
                for c in 0..4 {
                    acc[c] += u32::from(src[row + enter * 4 + c]);
                }
            }
            if x >= radius {
                let leave = x - radius;
                for c in 0..4 {
                    acc[c] -= u32::from(src[row + leave * 4 + c]);
                }
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, radius: usize) {
    let w = width as usize;
    let h = height as usize;
    let window = (2 * radius + 1) as u32;
    for x in 0..w {
        let col = x * 4;
        let mut acc = [0u32; 4];
        for y in 0..=radius.min(h - 1) {
            for c in 0..4 {
                acc[c] += u32::from(src[y * w * 4 + col + c]);
            }
        }
        for y in 0..h {
            let out = y * w * 4 + col;
            for c in 0..4 {
                dst[out + c] = div_round(acc[c], window);
            }
            let enter = y + radius + 1;
            if enter < h {
                for c in 0..4 {
                    acc[c] += u32::from(src[enter * w * 4 + col + c]);
                }
            }
            if y >= radius {
                let leave = y - radius;
                for c in 0..4 {
                    acc[c] -= u32::from(src[leave * w * 4 + col + c]);
                }
            }
        }
    }
}

fn div_round(acc: u32, window: u32) -> u8 {
    ((acc + window / 2) / window).min(255) as u8
}
