// Device RGB <-> cylindrical perceptual color, via:
// sRGB <-> linear RGB <-> CIE XYZ (D65) <-> Oklab <-> (L, C, H).
// Hue is reported as None below HUE_EPSILON chroma; near-gray pixels have
// no meaningful angle.

// Chroma below this is treated as hueless.
pub const HUE_EPSILON: f32 = 0.0002;

// IEC 61966-2-1 sRGB primaries, D65 white point.
const LINEAR_TO_XYZ: [[f32; 3]; 3] = [
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.1191920, 0.9503041],
];

const XYZ_TO_LINEAR: [[f32; 3]; 3] = [
    [3.2404542, -1.5371385, -0.4985314],
    [-0.9692660, 1.8760108, 0.0415560],
    [0.0556434, -0.2040259, 1.0572252],
];

// Oklab: XYZ into non-linear LMS, then LMS' into Lab (Ottosson 2020).
const XYZ_TO_LMS: [[f32; 3]; 3] = [
    [0.8189330101, 0.3618667424, -0.1288597137],
    [0.0329845436, 0.9293118715, 0.0361456387],
    [0.0482003018, 0.2643662691, 0.6338517070],
];

const LMS_TO_XYZ: [[f32; 3]; 3] = [
    [1.2270138511, -0.5577999807, 0.2812561490],
    [-0.0405801784, 1.1122568696, -0.0716766787],
    [-0.0763812845, -0.4214819784, 1.5861632204],
];

const LMS_TO_LAB: [[f32; 3]; 3] = [
    [0.2104542553, 0.7936177850, -0.0040720468],
    [1.9779984951, -2.4285922050, 0.4505937099],
    [0.0259040371, 0.7827717662, -0.8086757660],
];

const LAB_TO_LMS: [[f32; 3]; 3] = [
    [1.0, 0.3963377774, 0.2158037573],
    [1.0, -0.1055613458, -0.0638541728],
    [1.0, -0.0894841775, -1.2914855480],
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lch {
    pub l: f32,
    pub c: f32,
    // Degrees in [0, 360); None when the color is effectively gray.
    pub h: Option<f32>,
}

impl Lch {
    pub fn new(l: f32, c: f32, h: Option<f32>) -> Self {
        Lch { l, c, h }
    }
}

fn mul3(m: &[[f32; 3]; 3], v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

pub fn rgb_to_lch(r: u8, g: u8, b: u8) -> Lch {
    let linear = [
        srgb_to_linear(r as f32 / 255.0),
        srgb_to_linear(g as f32 / 255.0),
        srgb_to_linear(b as f32 / 255.0),
    ];
    let xyz = mul3(&LINEAR_TO_XYZ, linear);
    let lms = mul3(&XYZ_TO_LMS, xyz);
    let lms_prime = [lms[0].cbrt(), lms[1].cbrt(), lms[2].cbrt()];
    let lab = mul3(&LMS_TO_LAB, lms_prime);

    let chroma = (lab[1] * lab[1] + lab[2] * lab[2]).sqrt();
    let hue = if chroma < HUE_EPSILON {
        None
    } else {
        let mut deg = lab[2].atan2(lab[1]).to_degrees();
        if deg < 0.0 {
            deg += 360.0;
        }
        // atan2 can land exactly on 360.0 after the wrap-up
        if deg >= 360.0 {
            deg = 0.0;
        }
        Some(deg)
    };
    Lch::new(lab[0], chroma, hue)
}

pub fn lch_to_rgb(lch: Lch) -> [u8; 3] {
    let (a, b) = match lch.h {
        Some(h) => {
            let rad = h.to_radians();
            (lch.c * rad.cos(), lch.c * rad.sin())
        }
        None => (0.0, 0.0),
    };
    let lms_prime = mul3(&LAB_TO_LMS, [lch.l, a, b]);
    let lms = [
        lms_prime[0] * lms_prime[0] * lms_prime[0],
        lms_prime[1] * lms_prime[1] * lms_prime[1],
        lms_prime[2] * lms_prime[2] * lms_prime[2],
    ];
    let xyz = mul3(&LMS_TO_XYZ, lms);
    let linear = mul3(&XYZ_TO_LINEAR, xyz);

    let to_byte = |c: f32| (linear_to_srgb(c).clamp(0.0, 1.0) * 255.0).round() as u8;
    [to_byte(linear[0]), to_byte(linear[1]), to_byte(linear[2])]
}

// HSL ramp generator used when building the hue reference palette.
pub(crate) fn hsl_to_rgb(h_deg: f32, s: f32, l: f32) -> [u8; 3] {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = (h_deg.rem_euclid(360.0)) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_byte = |v: f32| ((v + m).clamp(0.0, 1.0) * 255.0).round() as u8;
    [to_byte(r1), to_byte(g1), to_byte(b1)]
}
