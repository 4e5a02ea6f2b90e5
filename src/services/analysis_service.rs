use std::path::Path;

use crate::color::palette::Palette;
use crate::color::{scanner, scorer};
use crate::error::AppError;
use crate::services::decode_cache::DecodeCache;

// One file through the analysis stage: shared decode, grid scan, scoring,
// caller-facing cutoff. The path must already be booked in the cache.
pub async fn analyze_file(
    cache: &DecodeCache,
    palette: &Palette,
    path: &Path,
    min_tag_score: i64,
) -> Result<Vec<(&'static str, i64)>, AppError> {
    let img = cache.load(path).await?;
    let report = scanner::scan(&img, palette);
    let mut tags = scorer::score_report(&report);
    if min_tag_score > 0 {
        tags.retain(|(_, score)| *score >= min_tag_score);
    }
    Ok(tags)
}
