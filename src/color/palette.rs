use crate::color::space::{hsl_to_rgb, rgb_to_lch};
use crate::color::terms::{GRAY_ANCHOR_COUNT, HUE_COUNT, OPTION_COUNT};

// The palette is built once at startup and shared read-only; every scanner
// borrows the same instance.

pub const SLICE_COUNT: usize = 90;
const SLICE_DEGREES: f32 = 4.0;

pub const GRAY_ANCHORS: [f32; GRAY_ANCHOR_COUNT] = [0.0, 0.15, 0.5, 0.85, 1.0];

// Saturation ramp swept while hunting each slice's chroma peak.
const RAMP_HUE_STEPS: usize = 1440;
const RAMP_LIGHTNESS_STEPS: usize = 11;
const RAMP_LIGHTNESS_MIN: f32 = 0.45;
const RAMP_LIGHTNESS_STEP: f32 = 0.01;

const SATURATED_MARGIN: f32 = 0.02;
// Dark/Light sit 55% of the way out from the black/white corner toward the
// peak; the extreme pair sits at 20%, close to the lightness axis.
const TONE_FRACTION: f32 = 0.55;
const EXTREME_FRACTION: f32 = 0.20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HueBucket {
    Primary(usize),
    Transitional(usize),
}

impl HueBucket {
    // Flat accumulator index: primaries on even slots, transitionals on odd.
    pub fn index(self) -> usize {
        match self {
            HueBucket::Primary(i) => 2 * i,
            HueBucket::Transitional(i) => 2 * i + 1,
        }
    }
}

pub const HUE_BUCKET_COUNT: usize = 2 * HUE_COUNT;

// Upper angular limits, first match wins. Widths are uneven on purpose:
// warm hues crowd a narrow part of the circle, greens and blues sprawl.
// Even entries are primaries (R O Y L G C A B V M in order), odd entries
// the transitional band toward the next primary; the tail band wraps to red.
#[rustfmt::skip]
const HUE_BOUNDS: [(f32, HueBucket); 20] = [
    (40.0,  HueBucket::Primary(0)),
    (52.0,  HueBucket::Transitional(0)),
    (72.0,  HueBucket::Primary(1)),
    (90.0,  HueBucket::Transitional(1)),
    (118.0, HueBucket::Primary(2)),
    (126.0, HueBucket::Transitional(2)),
    (136.0, HueBucket::Primary(3)),
    (140.0, HueBucket::Transitional(3)),
    (165.0, HueBucket::Primary(4)),
    (185.0, HueBucket::Transitional(4)),
    (205.0, HueBucket::Primary(5)),
    (225.0, HueBucket::Transitional(5)),
    (245.0, HueBucket::Primary(6)),
    (255.0, HueBucket::Transitional(6)),
    (275.0, HueBucket::Primary(7)),
    (290.0, HueBucket::Transitional(7)),
    (310.0, HueBucket::Primary(8)),
    (322.0, HueBucket::Transitional(8)),
    (352.0, HueBucket::Primary(9)),
    (360.0, HueBucket::Transitional(9)),
];

pub fn hue_bucket(h: f32) -> HueBucket {
    for &(limit, bucket) in &HUE_BOUNDS {
        if h < limit {
            return bucket;
        }
    }
    HueBucket::Primary(0)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RefPoint {
    pub l: f32,
    pub c: f32,
}

// One anchor per classification option, indexed by the OPT_* constants.
#[derive(Debug, Clone, Copy, Default)]
pub struct HueSlice {
    pub points: [RefPoint; OPTION_COUNT],
}

pub struct Palette {
    slices: [HueSlice; SLICE_COUNT],
}

impl Palette {
    pub fn build() -> Palette {
        let mut peaks: [Option<RefPoint>; SLICE_COUNT] = [None; SLICE_COUNT];
        for i in 0..RAMP_HUE_STEPS {
            let ramp_hue = i as f32 * 360.0 / RAMP_HUE_STEPS as f32;
            for j in 0..RAMP_LIGHTNESS_STEPS {
                let lightness = RAMP_LIGHTNESS_MIN + RAMP_LIGHTNESS_STEP * j as f32;
                let [r, g, b] = hsl_to_rgb(ramp_hue, 1.0, lightness);
                let lch = rgb_to_lch(r, g, b);
                let Some(h) = lch.h else { continue };
                let slice = (h / SLICE_DEGREES) as usize % SLICE_COUNT;
                if peaks[slice].is_none_or(|p| lch.c > p.c) {
                    peaks[slice] = Some(RefPoint { l: lch.l, c: lch.c });
                }
            }
        }

        let mut slices = [HueSlice::default(); SLICE_COUNT];
        for (i, slice) in slices.iter_mut().enumerate() {
            let peak = peaks[i].unwrap_or_else(|| nearest_peak(&peaks, i));
            slice.points = anchors_from_peak(peak);
        }
        Palette { slices }
    }

    pub fn slice_for_hue(&self, h: f32) -> &HueSlice {
        &self.slices[(h / SLICE_DEGREES) as usize % SLICE_COUNT]
    }
}

// The ramp sweep is fine enough to hit every 4-degree slice, but hue
// mapping is nonlinear; a skipped slice borrows its nearest neighbor.
fn nearest_peak(peaks: &[Option<RefPoint>; SLICE_COUNT], slice: usize) -> RefPoint {
    for d in 1..SLICE_COUNT {
        if let Some(p) = peaks[(slice + d) % SLICE_COUNT] {
            return p;
        }
        if let Some(p) = peaks[(slice + SLICE_COUNT - d) % SLICE_COUNT] {
            return p;
        }
    }
    RefPoint { l: 0.5, c: 0.1 }
}

fn anchors_from_peak(peak: RefPoint) -> [RefPoint; OPTION_COUNT] {
    let saturated = RefPoint {
        l: peak.l,
        c: (peak.c - SATURATED_MARGIN).max(0.0),
    };
    let pale = RefPoint {
        l: peak.l,
        c: peak.c / 3.0,
    };
    let dark = RefPoint {
        l: peak.l * TONE_FRACTION,
        c: peak.c * TONE_FRACTION,
    };
    let light = RefPoint {
        l: 1.0 - (1.0 - peak.l) * TONE_FRACTION,
        c: peak.c * TONE_FRACTION,
    };
    let extreme_dark = RefPoint {
        l: peak.l * EXTREME_FRACTION,
        c: peak.c * EXTREME_FRACTION,
    };
    let extreme_light = RefPoint {
        l: 1.0 - (1.0 - peak.l) * EXTREME_FRACTION,
        c: peak.c * EXTREME_FRACTION,
    };
    [saturated, pale, dark, light, extreme_dark, extreme_light]
}
