// The persisted tag vocabulary. Term codes are a wire contract shared with
// the search engine; they are case-sensitive and must never be renamed.
//
// Groups:
//   - luma codes, one per gray anchor, darkest to lightest
//   - hue-option codes: uppercase hue letter x lowercase option letter
//   - weak-tone codes: washed-out color split by darkness
//   - summary codes: whole-image ratios

pub const GRAY_ANCHOR_COUNT: usize = 5;
pub const HUE_COUNT: usize = 10;
pub const OPTION_COUNT: usize = 6;

// "@" is the black anchor, "_" the white anchor.
pub const LUMA_TERMS: [&str; GRAY_ANCHOR_COUNT] = ["@", "#", "+", "-", "_"];

// Red, Orange, Yellow, Lime, Green, Cyan, Azure, Blue, Violet, Magenta.
pub const HUE_LETTERS: [char; HUE_COUNT] = ['R', 'O', 'Y', 'L', 'G', 'C', 'A', 'B', 'V', 'M'];

// Saturated, Pale, Dark, Light, ExtremeDark (k), ExtremeLight (w).
pub const OPTION_LETTERS: [char; OPTION_COUNT] = ['s', 'p', 'd', 'l', 'k', 'w'];

pub const OPT_SATURATED: usize = 0;
pub const OPT_PALE: usize = 1;
pub const OPT_DARK: usize = 2;
pub const OPT_LIGHT: usize = 3;
pub const OPT_EXTREME_DARK: usize = 4;
pub const OPT_EXTREME_LIGHT: usize = 5;

#[rustfmt::skip]
const HUE_OPTION_TERMS: [[&str; OPTION_COUNT]; HUE_COUNT] = [
    ["Rs", "Rp", "Rd", "Rl", "Rk", "Rw"],
    ["Os", "Op", "Od", "Ol", "Ok", "Ow"],
    ["Ys", "Yp", "Yd", "Yl", "Yk", "Yw"],
    ["Ls", "Lp", "Ld", "Ll", "Lk", "Lw"],
    ["Gs", "Gp", "Gd", "Gl", "Gk", "Gw"],
    ["Cs", "Cp", "Cd", "Cl", "Ck", "Cw"],
    ["As", "Ap", "Ad", "Al", "Ak", "Aw"],
    ["Bs", "Bp", "Bd", "Bl", "Bk", "Bw"],
    ["Vs", "Vp", "Vd", "Vl", "Vk", "Vw"],
    ["Ms", "Mp", "Md", "Ml", "Mk", "Mw"],
];

// pale/gray crossed with dark/light.
pub const WEAK_PALE_DARK: &str = "pd";
pub const WEAK_PALE_LIGHT: &str = "pl";
pub const WEAK_GRAY_DARK: &str = "gd";
pub const WEAK_GRAY_LIGHT: &str = "gl";

pub const SUMMARY_TRANSPARENT: &str = "t";
pub const SUMMARY_GRAY: &str = "g";
pub const SUMMARY_BOLD: &str = "b";
pub const SUMMARY_PALE: &str = "p";
pub const SUMMARY_DARK: &str = "d";
pub const SUMMARY_LIGHT: &str = "l";

pub fn hue_option_term(hue: usize, option: usize) -> &'static str {
    HUE_OPTION_TERMS[hue][option]
}

pub fn all_terms() -> Vec<&'static str> {
    let mut terms = Vec::with_capacity(75);
    terms.extend(LUMA_TERMS);
    for row in &HUE_OPTION_TERMS {
        terms.extend(row.iter().copied());
    }
    terms.extend([WEAK_PALE_DARK, WEAK_PALE_LIGHT, WEAK_GRAY_DARK, WEAK_GRAY_LIGHT]);
    terms.extend([
        SUMMARY_TRANSPARENT,
        SUMMARY_GRAY,
        SUMMARY_BOLD,
        SUMMARY_PALE,
        SUMMARY_DARK,
        SUMMARY_LIGHT,
    ]);
    terms
}
