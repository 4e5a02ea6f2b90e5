use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use image::RgbaImage;
use tokio::sync::OnceCell;

use crate::error::AppError;

// Shares decoded pixels between pipeline stages. Every stage books the
// paths it will need, loads them at its own pace, and releases them when
// done; the entry (and the decoded image) lives until the last booking is
// released. Concurrent loads of one path share a single decode, faults
// included.
//
// One coarse lock guards the map. Lock hold times are map operations only;
// decoding happens outside it, inside the per-entry once-cell.

type DecodeSlot = Arc<OnceCell<Result<Arc<RgbaImage>, String>>>;

struct CacheEntry {
    refs: usize,
    slot: DecodeSlot,
}

#[derive(Default)]
pub struct DecodeCache {
    entries: Mutex<HashMap<PathBuf, CacheEntry>>,
}

impl DecodeCache {
    pub fn new() -> Self {
        DecodeCache::default()
    }

    pub fn book<I>(&self, paths: I)
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for path in paths {
            entries
                .entry(path)
                .and_modify(|entry| entry.refs += 1)
                .or_insert_with(|| CacheEntry {
                    refs: 1,
                    slot: Arc::new(OnceCell::new()),
                });
        }
    }

    pub async fn load(&self, path: &Path) -> Result<Arc<RgbaImage>, AppError> {
        let slot = {
            let entries = self
                .entries
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let entry = entries.get(path).ok_or_else(|| {
                AppError::Decode(format!("load before booking: {}", path.display()))
            })?;
            entry.slot.clone()
        };

        let decoded = slot
            .get_or_init(|| {
                let path = path.to_path_buf();
                async move {
                    match tokio::task::spawn_blocking(move || decode_rgba(&path)).await {
                        Ok(result) => result.map(Arc::new).map_err(|err| err.to_string()),
                        Err(err) => Err(format!("decode task aborted: {err}")),
                    }
                }
            })
            .await;
        decoded.clone().map_err(AppError::Decode)
    }

    pub fn release(&self, path: &Path) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match entries.get_mut(path) {
            Some(entry) if entry.refs > 1 => entry.refs -= 1,
            Some(_) => {
                entries.remove(path);
            }
            None => {
                debug_assert!(false, "release without booking: {}", path.display());
                log::error!("decode cache released unbooked path: {}", path.display());
            }
        }
    }

    pub fn booked_count(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

fn decode_rgba(path: &Path) -> Result<RgbaImage, AppError> {
    let img = image::open(path)?;
    Ok(img.to_rgba8())
}
