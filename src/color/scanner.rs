use image::RgbaImage;

use crate::color::palette::{hue_bucket, Palette, GRAY_ANCHORS, HUE_BUCKET_COUNT};
use crate::color::space::rgb_to_lch;
use crate::color::terms::{GRAY_ANCHOR_COUNT, OPTION_COUNT};

// Grid density targets a few thousand samples per image no matter the
// resolution.
const TARGET_SAMPLE_AREA: f64 = 4000.0;
const MIN_STEP: u32 = 4;
const MAX_STEP: u32 = 32;

// Samples this close to invisible are not classified at all.
const ALPHA_FLOOR: u8 = 8;

// General tone thresholds on chroma.
const BOLD_CHROMA: f32 = 0.10;
const PALE_CHROMA: f32 = 0.01;
// Classification switches to the gray anchors a little earlier than the
// general-bucket gray line.
const GRAY_CLASSIFY_CHROMA: f32 = 0.015;

// Short-circuit radii.
const GRAY_SNAP_DISTANCE: f32 = 0.02;
const EXACT_MATCH_DIST_SQ: f32 = 0.0004;

// Anchors further than 4x the nearest squared distance are ignored.
const NEIGHBOR_CUTOFF: f32 = 4.0;
const CHROMA_STRETCH: f32 = 3.0;

pub const TONE_BOLD: usize = 0;
pub const TONE_PALE: usize = 1;
pub const TONE_GRAY: usize = 2;
pub const SHADE_DARK: usize = 0;
pub const SHADE_LIGHT: usize = 1;

// Per-image accumulator; built by one scan, consumed by the scorer.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub total_samples: u64,
    pub opaque_samples: u64,
    // Summed alpha (0-255) over every grid point, skipped ones included.
    pub opacity_sum: f64,
    pub gray_sums: [f64; GRAY_ANCHOR_COUNT],
    pub hue_sums: [[f64; OPTION_COUNT]; HUE_BUCKET_COUNT],
    // [tone][shade]: bold/pale/gray crossed with dark/light.
    pub general_sums: [[f64; 2]; 3],
}

pub fn sample_step(width: u32, height: u32) -> u32 {
    let area = width as f64 * height as f64;
    let step = (area / TARGET_SAMPLE_AREA).sqrt().round() as u32;
    let step = step - step % 2;
    step.clamp(MIN_STEP, MAX_STEP)
}

pub fn scan(img: &RgbaImage, palette: &Palette) -> ScanReport {
    let (width, height) = img.dimensions();
    let mut report = ScanReport::default();
    if width == 0 || height == 0 {
        return report;
    }

    let step = sample_step(width, height);
    let half = step / 2;

    // Staggered grid: odd rows shift half a step so samples form a 45
    // degree lattice instead of raster lines.
    let mut row = 0u32;
    let mut y = 0u32;
    while y < height {
        let mut x = if row % 2 == 0 { 0 } else { half };
        while x < width {
            sample_pixel(img, x, y, palette, &mut report);
            x += step;
        }
        y += half;
        row += 1;
    }
    report
}

fn sample_pixel(img: &RgbaImage, x: u32, y: u32, palette: &Palette, report: &mut ScanReport) {
    let px = img.get_pixel(x, y);
    let [r, g, b, alpha] = px.0;

    report.total_samples += 1;
    report.opacity_sum += alpha as f64;
    if alpha < ALPHA_FLOOR {
        return;
    }
    report.opaque_samples += 1;
    let weight = alpha as f64 / 255.0;

    let lch = rgb_to_lch(r, g, b);

    let tone = if lch.c > BOLD_CHROMA {
        TONE_BOLD
    } else if lch.c > PALE_CHROMA {
        TONE_PALE
    } else {
        TONE_GRAY
    };
    let shade = if lch.l <= 0.5 { SHADE_DARK } else { SHADE_LIGHT };
    report.general_sums[tone][shade] += weight;

    match lch.h {
        Some(h) if lch.c >= GRAY_CLASSIFY_CHROMA => {
            let bucket = hue_bucket(h).index();
            assign_hue(lch.l, lch.c, palette.slice_for_hue(h), weight, &mut report.hue_sums[bucket]);
        }
        _ => assign_gray(lch.l, weight, &mut report.gray_sums),
    }
}

fn assign_gray(l: f32, weight: f64, sums: &mut [f64; GRAY_ANCHOR_COUNT]) {
    let mut nearest = 0;
    for (i, anchor) in GRAY_ANCHORS.iter().enumerate() {
        if (l - anchor).abs() < (l - GRAY_ANCHORS[nearest]).abs() {
            nearest = i;
        }
    }
    let d_nearest = (l - GRAY_ANCHORS[nearest]).abs();
    if d_nearest <= GRAY_SNAP_DISTANCE {
        sums[nearest] += weight;
        return;
    }

    // Split between the two closest anchors by inverse distance.
    let mut second = if nearest == 0 { 1 } else { nearest - 1 };
    for (i, anchor) in GRAY_ANCHORS.iter().enumerate() {
        if i != nearest && (l - anchor).abs() < (l - GRAY_ANCHORS[second]).abs() {
            second = i;
        }
    }
    let d_second = (l - GRAY_ANCHORS[second]).abs();
    let w_nearest = 1.0 / d_nearest as f64;
    let w_second = 1.0 / d_second as f64;
    let total = w_nearest + w_second;
    sums[nearest] += weight * w_nearest / total;
    sums[second] += weight * w_second / total;
}

fn assign_hue(
    l: f32,
    c: f32,
    slice: &crate::color::palette::HueSlice,
    weight: f64,
    sums: &mut [f64; OPTION_COUNT],
) {
    // Squared distances in (L, 3C) space; chroma is stretched so the two
    // axes carry comparable spread.
    let mut dist_sq = [0f32; OPTION_COUNT];
    for (i, point) in slice.points.iter().enumerate() {
        let dl = l - point.l;
        let dc = CHROMA_STRETCH * (c - point.c);
        dist_sq[i] = dl * dl + dc * dc;
    }

    let mut order: [usize; OPTION_COUNT] = [0, 1, 2, 3, 4, 5];
    order.sort_by(|&a, &b| dist_sq[a].total_cmp(&dist_sq[b]));

    let nearest_sq = dist_sq[order[0]];
    if nearest_sq <= EXACT_MATCH_DIST_SQ {
        sums[order[0]] += weight;
        return;
    }

    let mut picked = 0usize;
    let mut weights = [0f64; 3];
    for &i in order.iter().take(3) {
        if dist_sq[i] > nearest_sq * NEIGHBOR_CUTOFF {
            break;
        }
        weights[picked] = 1.0 / (dist_sq[i] as f64).sqrt();
        picked += 1;
    }
    let total: f64 = weights[..picked].iter().sum();
    for (slot, &i) in order.iter().take(picked).enumerate() {
        sums[i] += weight * weights[slot] / total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::terms::{OPT_EXTREME_LIGHT, OPT_LIGHT, OPT_SATURATED};
    use image::Rgba;

    fn solid_image(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(rgba))
    }

    #[test]
    fn test_sample_step_bounds() {
        assert_eq!(sample_step(100, 100), MIN_STEP);
        assert_eq!(sample_step(10_000, 10_000), MAX_STEP);
        let step = sample_step(2000, 1500);
        assert!(step % 2 == 0 && (MIN_STEP..=MAX_STEP).contains(&step));
    }

    #[test]
    fn test_sample_count_stays_in_band() {
        for (w, h) in [(640, 480), (1024, 768), (1920, 1080), (2560, 1600)] {
            let img = solid_image(w, h, [120, 130, 140, 255]);
            let report = scan(&img, &Palette::build());
            assert!(
                (3000..=12000).contains(&report.total_samples),
                "{w}x{h} produced {} samples",
                report.total_samples
            );
        }
    }

    #[test]
    fn test_white_image_hits_the_white_anchor() {
        let palette = Palette::build();
        let report = scan(&solid_image(100, 100, [255, 255, 255, 255]), &palette);
        assert_eq!(report.total_samples, report.opaque_samples);
        let white_sum = report.gray_sums[GRAY_ANCHOR_COUNT - 1];
        assert!(
            white_sum >= 0.99 * report.opaque_samples as f64,
            "white mass went elsewhere: {:?}",
            report.gray_sums
        );
        let hue_total: f64 = report.hue_sums.iter().flatten().sum();
        assert_eq!(hue_total, 0.0, "white image produced hue mass");
    }

    #[test]
    fn test_transparent_image_is_all_skips() {
        let palette = Palette::build();
        let report = scan(&solid_image(50, 50, [10, 20, 30, 0]), &palette);
        assert!(report.total_samples > 0);
        assert_eq!(report.opaque_samples, 0);
        assert_eq!(report.opacity_sum, 0.0);
        let classified: f64 = report.gray_sums.iter().sum::<f64>()
            + report.hue_sums.iter().flatten().sum::<f64>();
        assert_eq!(classified, 0.0);
    }

    #[test]
    fn test_saturated_red_lands_in_red_bucket() {
        let palette = Palette::build();
        let report = scan(&solid_image(200, 200, [255, 0, 0, 255]), &palette);
        let red_bucket: f64 = report.hue_sums[0].iter().sum();
        let everything: f64 = report.hue_sums.iter().flatten().sum();
        assert!(
            red_bucket >= 0.99 * everything,
            "red mass leaked: {red_bucket} of {everything}"
        );
        // Pure red is as saturated as the ramp peak; the saturated and
        // light-leaning anchors should own nearly all of it.
        let sat = report.hue_sums[0][OPT_SATURATED];
        assert!(sat > 0.0, "saturated anchor empty: {:?}", report.hue_sums[0]);
    }

    #[test]
    fn test_gray_weights_conserve_mass() {
        let mut sums = [0.0; GRAY_ANCHOR_COUNT];
        // 0.3 is not within snap range of any anchor (0.15 and 0.5 both
        // further than 0.02 away).
        assign_gray(0.3, 1.0, &mut sums);
        let total: f64 = sums.iter().sum();
        assert!((total - 1.0).abs() < 1e-9, "gray weights sum to {total}");
        assert!(sums[1] > sums[2], "0.3 sits closer to the 0.15 anchor");
    }

    #[test]
    fn test_hue_weights_conserve_mass() {
        let palette = Palette::build();
        let lch = rgb_to_lch(180, 60, 40);
        let h = lch.h.expect("test color must be chromatic");
        let slice = palette.slice_for_hue(h);
        let mut sums = [0.0; OPTION_COUNT];
        assign_hue(lch.l, lch.c, slice, 1.0, &mut sums);
        let total: f64 = sums.iter().sum();
        assert!((total - 1.0).abs() < 1e-9, "hue weights sum to {total}");
    }

    #[test]
    fn test_near_white_tint_prefers_extreme_light() {
        let palette = Palette::build();
        // Barely-pink white: chromatic, but hugging the light end.
        let lch = rgb_to_lch(250, 235, 235);
        if lch.c < GRAY_CLASSIFY_CHROMA {
            return; // too gray to classify as a hue at all
        }
        let slice = palette.slice_for_hue(lch.h.unwrap());
        let mut sums = [0.0; OPTION_COUNT];
        assign_hue(lch.l, lch.c, slice, 1.0, &mut sums);
        assert!(
            sums[OPT_EXTREME_LIGHT] + sums[OPT_LIGHT] > 0.5,
            "light-side anchors lost to {sums:?}"
        );
    }

    #[test]
    fn test_general_buckets_split_dark_and_light() {
        let palette = Palette::build();
        let dark = scan(&solid_image(64, 64, [20, 20, 20, 255]), &palette);
        assert!(dark.general_sums[TONE_GRAY][SHADE_DARK] > 0.0);
        assert_eq!(dark.general_sums[TONE_GRAY][SHADE_LIGHT], 0.0);

        let light = scan(&solid_image(64, 64, [240, 240, 240, 255]), &palette);
        assert!(light.general_sums[TONE_GRAY][SHADE_LIGHT] > 0.0);
        assert_eq!(light.general_sums[TONE_GRAY][SHADE_DARK], 0.0);
    }
}
