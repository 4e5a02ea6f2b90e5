use crate::color::palette::HUE_BUCKET_COUNT;
use crate::color::scanner::{
    ScanReport, SHADE_DARK, SHADE_LIGHT, TONE_BOLD, TONE_GRAY, TONE_PALE,
};
use crate::color::terms::{self, HUE_COUNT, LUMA_TERMS, OPTION_COUNT};

pub const MAX_SCORE: i64 = 10_000;

// Summary tags only reward clearly dominant properties: nothing below a
// quarter of the image, full score only at total coverage.
const SUMMARY_FLOOR: f64 = 0.25;
const SUMMARY_CURVE_BASE: f64 = 0.0001;

pub fn score_report(report: &ScanReport) -> Vec<(&'static str, i64)> {
    let mut tags = Vec::new();
    if report.total_samples == 0 {
        return tags;
    }

    let noise = noise_threshold(report.total_samples);
    let opaque = report.opaque_samples as f64;

    if report.opaque_samples > 0 {
        for (i, &sum) in report.gray_sums.iter().enumerate() {
            push(&mut tags, LUMA_TERMS[i], linear_score(sum, opaque, noise));
        }

        let folded = fold_hue_buckets(&report.hue_sums);
        for (hue, options) in folded.iter().enumerate() {
            for (opt, &sum) in options.iter().enumerate() {
                // Folding gives every chromatic sample total weight 2;
                // halve the sum so a single-hue image tops out at 10000.
                push(
                    &mut tags,
                    terms::hue_option_term(hue, opt),
                    linear_score(sum / 2.0, opaque, noise),
                );
            }
        }

        let weak = [
            (terms::WEAK_PALE_DARK, report.general_sums[TONE_PALE][SHADE_DARK]),
            (terms::WEAK_PALE_LIGHT, report.general_sums[TONE_PALE][SHADE_LIGHT]),
            (terms::WEAK_GRAY_DARK, report.general_sums[TONE_GRAY][SHADE_DARK]),
            (terms::WEAK_GRAY_LIGHT, report.general_sums[TONE_GRAY][SHADE_LIGHT]),
        ];
        for (term, sum) in weak {
            push(&mut tags, term, linear_score(sum, opaque, noise));
        }

        let tone_total = |tone: usize| {
            report.general_sums[tone][SHADE_DARK] + report.general_sums[tone][SHADE_LIGHT]
        };
        let shade_total = |shade: usize| {
            report.general_sums[TONE_BOLD][shade]
                + report.general_sums[TONE_PALE][shade]
                + report.general_sums[TONE_GRAY][shade]
        };
        push(&mut tags, terms::SUMMARY_GRAY, curve_score(tone_total(TONE_GRAY) / opaque));
        push(&mut tags, terms::SUMMARY_BOLD, curve_score(tone_total(TONE_BOLD) / opaque));
        push(&mut tags, terms::SUMMARY_PALE, curve_score(tone_total(TONE_PALE) / opaque));
        push(&mut tags, terms::SUMMARY_DARK, curve_score(shade_total(SHADE_DARK) / opaque));
        push(&mut tags, terms::SUMMARY_LIGHT, curve_score(shade_total(SHADE_LIGHT) / opaque));
    }

    let mean_opacity = report.opacity_sum / report.total_samples as f64;
    let transparency = 1.0 - mean_opacity / 255.0;
    push(&mut tags, terms::SUMMARY_TRANSPARENT, curve_score(transparency));

    tags
}

// A primary bucket counts double toward its own hue; a transitional bucket
// counts once toward each neighboring primary, wrapping at the ends.
fn fold_hue_buckets(
    hue_sums: &[[f64; OPTION_COUNT]; HUE_BUCKET_COUNT],
) -> [[f64; OPTION_COUNT]; HUE_COUNT] {
    let mut folded = [[0.0; OPTION_COUNT]; HUE_COUNT];
    for (hue, options) in folded.iter_mut().enumerate() {
        let primary = &hue_sums[2 * hue];
        let right = &hue_sums[2 * hue + 1];
        let left = &hue_sums[(2 * hue + HUE_BUCKET_COUNT - 1) % HUE_BUCKET_COUNT];
        for opt in 0..OPTION_COUNT {
            options[opt] = 2.0 * primary[opt] + right[opt] + left[opt];
        }
    }
    folded
}

fn noise_threshold(total_samples: u64) -> f64 {
    (total_samples as f64 / 1000.0).log2().max(0.0)
}

fn linear_score(sum: f64, opaque: f64, noise: f64) -> i64 {
    if sum <= noise {
        return 0;
    }
    ((MAX_SCORE as f64 * sum / opaque).round() as i64).min(MAX_SCORE)
}

fn curve_score(ratio: f64) -> i64 {
    let ratio = ratio.clamp(0.0, 1.0);
    if ratio < SUMMARY_FLOOR {
        return 0;
    }
    ((MAX_SCORE as f64 * SUMMARY_CURVE_BASE.powf(1.0 - ratio)).round() as i64).min(MAX_SCORE)
}

fn push(tags: &mut Vec<(&'static str, i64)>, term: &'static str, score: i64) {
    if score > 0 {
        tags.push((term, score));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::terms::GRAY_ANCHOR_COUNT;

    fn base_report(total: u64, opaque: u64) -> ScanReport {
        ScanReport {
            total_samples: total,
            opaque_samples: opaque,
            opacity_sum: opaque as f64 * 255.0,
            ..ScanReport::default()
        }
    }

    #[test]
    fn test_empty_report_scores_nothing() {
        assert!(score_report(&ScanReport::default()).is_empty());
    }

    #[test]
    fn test_white_report_scores_white_anchor_high() {
        let mut report = base_report(5000, 5000);
        report.gray_sums[GRAY_ANCHOR_COUNT - 1] = 5000.0;
        report.general_sums[TONE_GRAY][SHADE_LIGHT] = 5000.0;

        let tags = score_report(&report);
        let score = |term: &str| tags.iter().find(|(t, _)| *t == term).map(|(_, s)| *s);

        assert!(score("_").unwrap() >= 9000, "white anchor too weak: {tags:?}");
        assert_eq!(score("g"), Some(MAX_SCORE));
        assert_eq!(score("l"), Some(MAX_SCORE));
        assert_eq!(score("t"), None, "opaque image scored transparent");
        assert!(
            tags.iter().all(|(t, _)| !t.starts_with(char::is_uppercase)),
            "white image grew hue tags: {tags:?}"
        );
    }

    #[test]
    fn test_fully_transparent_report_scores_only_transparency() {
        let mut report = base_report(2500, 0);
        report.opacity_sum = 0.0;

        let tags = score_report(&report);
        assert_eq!(tags, vec![("t", MAX_SCORE)]);
    }

    #[test]
    fn test_all_scores_in_bounds() {
        let mut report = base_report(8000, 8000);
        report.gray_sums = [500.0, 700.0, 900.0, 1100.0, 800.0];
        report.hue_sums[0] = [2000.0, 300.0, 100.0, 50.0, 10.0, 5.0];
        report.hue_sums[1] = [800.0, 200.0, 90.0, 40.0, 8.0, 2.0];
        report.general_sums = [[1500.0, 900.0], [700.0, 400.0], [2500.0, 2000.0]];

        for (term, score) in score_report(&report) {
            assert!(
                (0..=MAX_SCORE).contains(&score),
                "{term} scored out of bounds: {score}"
            );
        }
    }

    #[test]
    fn test_single_hue_image_tops_out_at_max() {
        let mut report = base_report(4000, 4000);
        report.hue_sums[0][0] = 4000.0; // everything in the red primary
        report.general_sums[TONE_BOLD][SHADE_DARK] = 4000.0;

        let tags = score_report(&report);
        let rs = tags.iter().find(|(t, _)| *t == "Rs").map(|(_, s)| *s);
        assert_eq!(rs, Some(MAX_SCORE));
    }

    #[test]
    fn test_transitional_bucket_splits_between_neighbors() {
        let mut report = base_report(4000, 4000);
        report.hue_sums[1][0] = 4000.0; // red/orange transitional
        report.general_sums[TONE_BOLD][SHADE_DARK] = 4000.0;

        let tags = score_report(&report);
        let score = |term: &str| tags.iter().find(|(t, _)| *t == term).map(|(_, s)| *s);
        assert_eq!(score("Rs"), Some(MAX_SCORE / 2));
        assert_eq!(score("Os"), Some(MAX_SCORE / 2));
    }

    #[test]
    fn test_transitional_wraps_from_magenta_back_to_red() {
        let mut report = base_report(4000, 4000);
        report.hue_sums[19][0] = 4000.0; // magenta/red transitional
        report.general_sums[TONE_BOLD][SHADE_DARK] = 4000.0;

        let tags = score_report(&report);
        let score = |term: &str| tags.iter().find(|(t, _)| *t == term).map(|(_, s)| *s);
        assert_eq!(score("Ms"), Some(MAX_SCORE / 2));
        assert_eq!(score("Rs"), Some(MAX_SCORE / 2));
    }

    #[test]
    fn test_noise_floor_suppresses_trace_buckets() {
        let mut report = base_report(8000, 8000);
        // log2(8000/1000) = 3; a sum of 3 must vanish, 4 must survive.
        report.gray_sums[0] = 3.0;
        report.gray_sums[1] = 4.0;

        let tags = score_report(&report);
        let score = |term: &str| tags.iter().find(|(t, _)| *t == term).map(|(_, s)| *s);
        assert_eq!(score("@"), None, "trace bucket leaked through noise floor");
        assert!(score("#").is_some());
    }

    #[test]
    fn test_summary_curve_shape() {
        assert_eq!(curve_score(0.0), 0);
        assert_eq!(curve_score(0.24), 0);
        assert_eq!(curve_score(0.25), 10);
        assert_eq!(curve_score(0.5), 100);
        assert_eq!(curve_score(0.75), 1000);
        assert_eq!(curve_score(1.0), MAX_SCORE);

        let mut last = 0;
        for i in 0..=100 {
            let score = curve_score(i as f64 / 100.0);
            assert!(score >= last, "curve dipped at ratio {}", i as f64 / 100.0);
            last = score;
        }
    }
}
