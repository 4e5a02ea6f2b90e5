use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::color::palette::Palette;
use crate::config::Config;
use crate::data::repository;
use crate::error::AppError;
use crate::services::decode_cache::DecodeCache;
use crate::services::{analysis_service, thumbnail_service};

// A flush writes at most this many queued requests in one transaction.
pub const WRITE_BATCH_SIZE: usize = 16;

#[derive(Debug)]
pub enum WriteRequest {
    Analysis {
        file_id: i64,
        tags: Vec<(&'static str, i64)>,
        analyzed_at: String,
    },
    Thumbnail {
        file_id: i64,
        width: u32,
        height: u32,
        thumbed_at: String,
    },
}

enum Trigger {
    FilesChanged,
    Shutdown,
}

pub struct Pipeline {
    db_path: PathBuf,
    thumbs_dir: PathBuf,
    min_tag_score: i64,
    palette: Palette,
    cache: DecodeCache,
}

impl Pipeline {
    pub fn new(config: &Config) -> Pipeline {
        Pipeline {
            db_path: config.paths.db_path.clone(),
            thumbs_dir: config.paths.thumbs_dir.clone(),
            min_tag_score: config.analysis.min_tag_score,
            palette: Palette::build(),
            cache: DecodeCache::new(),
        }
    }

    // One full pass: the analysis and thumbnail jobs run concurrently,
    // each over its own pending set, each strictly sequential inside.
    pub async fn run_pass(&self, write_tx: &mpsc::UnboundedSender<WriteRequest>) {
        let run_id = Uuid::new_v4();
        let (analysis, thumbs) = tokio::join!(
            self.run_analysis_job(run_id, write_tx),
            self.run_thumbnail_job(run_id, write_tx),
        );
        if let Err(err) = analysis {
            log::error!("[{run_id}] analysis job failed: {err}");
        }
        if let Err(err) = thumbs {
            log::error!("[{run_id}] thumbnail job failed: {err}");
        }
    }

    // Runs a single pass with its own writer and drains the queue before
    // returning. For callers that do not keep the trigger loop around.
    pub async fn run_once(&self) -> Result<(), AppError> {
        let (write_tx, writer) = start_writer(self.db_path.clone());
        self.run_pass(&write_tx).await;
        drop(write_tx);
        writer
            .await
            .map_err(|err| AppError::Pipeline(format!("writer task failed: {err}")))
    }

    async fn run_analysis_job(
        &self,
        run_id: Uuid,
        write_tx: &mpsc::UnboundedSender<WriteRequest>,
    ) -> Result<(), AppError> {
        let pending = {
            let conn = Connection::open(&self.db_path)?;
            repository::files_pending_analysis(&conn)?
        };
        if pending.is_empty() {
            return Ok(());
        }
        log::info!("[{run_id}] analyzing {} files", pending.len());

        // Booking the whole set up front lets the thumbnail job share
        // decodes for paths both jobs will touch.
        self.cache.book(pending.iter().map(|f| PathBuf::from(&f.path)));
        for file in &pending {
            let path = Path::new(&file.path);
            match analysis_service::analyze_file(&self.cache, &self.palette, path, self.min_tag_score)
                .await
            {
                Ok(tags) => {
                    let request = WriteRequest::Analysis {
                        file_id: file.id,
                        tags,
                        analyzed_at: chrono::Utc::now().to_rfc3339(),
                    };
                    if write_tx.send(request).is_err() {
                        log::error!("[{run_id}] write queue closed; result for {} lost", file.path);
                    }
                }
                Err(err) => {
                    log::warn!("[{run_id}] analysis failed for {}: {err}", file.path);
                }
            }
            self.cache.release(path);
        }
        Ok(())
    }

    async fn run_thumbnail_job(
        &self,
        run_id: Uuid,
        write_tx: &mpsc::UnboundedSender<WriteRequest>,
    ) -> Result<(), AppError> {
        let pending = {
            let conn = Connection::open(&self.db_path)?;
            repository::files_pending_thumbnail(&conn)?
        };
        if pending.is_empty() {
            return Ok(());
        }
        log::info!("[{run_id}] thumbnailing {} files", pending.len());

        self.cache.book(pending.iter().map(|f| PathBuf::from(&f.path)));
        for file in &pending {
            let path = Path::new(&file.path);
            match thumbnail_service::thumbnail_file(&self.cache, path, &self.thumbs_dir, file.id)
                .await
            {
                Ok((width, height)) => {
                    let request = WriteRequest::Thumbnail {
                        file_id: file.id,
                        width,
                        height,
                        thumbed_at: chrono::Utc::now().to_rfc3339(),
                    };
                    if write_tx.send(request).is_err() {
                        log::error!("[{run_id}] write queue closed; result for {} lost", file.path);
                    }
                }
                Err(err) => {
                    log::warn!("[{run_id}] thumbnail failed for {}: {err}", file.path);
                }
            }
            self.cache.release(path);
        }
        Ok(())
    }
}

pub struct PipelineHandle {
    trigger_tx: mpsc::UnboundedSender<Trigger>,
    runner: JoinHandle<()>,
}

impl PipelineHandle {
    // The registrar's "files changed" signal. Cheap and non-blocking.
    pub fn files_changed(&self) {
        let _ = self.trigger_tx.send(Trigger::FilesChanged);
    }

    pub async fn shutdown(self) {
        let _ = self.trigger_tx.send(Trigger::Shutdown);
        let _ = self.runner.await;
    }
}

pub fn start_pipeline(config: &Config) -> PipelineHandle {
    let pipeline = Pipeline::new(config);
    let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
    let runner = tokio::spawn(run_trigger_loop(pipeline, trigger_rx));
    PipelineHandle { trigger_tx, runner }
}

async fn run_trigger_loop(pipeline: Pipeline, mut trigger_rx: mpsc::UnboundedReceiver<Trigger>) {
    let (write_tx, writer) = start_writer(pipeline.db_path.clone());
    while let Some(trigger) = trigger_rx.recv().await {
        match trigger {
            Trigger::FilesChanged => pipeline.run_pass(&write_tx).await,
            Trigger::Shutdown => break,
        }
    }
    drop(write_tx);
    let _ = writer.await;
}

pub fn start_writer(db_path: PathBuf) -> (mpsc::UnboundedSender<WriteRequest>, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(run_writer(db_path, rx));
    (tx, handle)
}

async fn run_writer(db_path: PathBuf, mut rx: mpsc::UnboundedReceiver<WriteRequest>) {
    while let Some(first) = rx.recv().await {
        let mut batch = Vec::with_capacity(WRITE_BATCH_SIZE);
        batch.push(first);
        while batch.len() < WRITE_BATCH_SIZE {
            match rx.try_recv() {
                Ok(request) => batch.push(request),
                Err(_) => break,
            }
        }
        if let Err(err) = flush_batch(&db_path, &batch) {
            // No retry: the affected files keep a stale or absent
            // timestamp, stay pending, and are redone on the next trigger.
            log::error!("write flush failed, {} requests dropped: {err}", batch.len());
        }
    }
}

fn flush_batch(db_path: &Path, batch: &[WriteRequest]) -> Result<(), AppError> {
    let mut conn = Connection::open(db_path)?;
    let tx = conn.transaction()?;
    for request in batch {
        match request {
            WriteRequest::Analysis {
                file_id,
                tags,
                analyzed_at,
            } => {
                // Tags land before the timestamp. A crash between the two
                // re-selects the file, and the inserts are idempotent.
                repository::insert_tags(&tx, *file_id, tags)?;
                repository::mark_analyzed(&tx, *file_id, analyzed_at)?;
            }
            WriteRequest::Thumbnail {
                file_id,
                width,
                height,
                thumbed_at,
            } => {
                repository::set_dimensions_and_mark_thumbed(
                    &tx, *file_id, *width, *height, thumbed_at,
                )?;
            }
        }
    }
    tx.commit()?;
    Ok(())
}
