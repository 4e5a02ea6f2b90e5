use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: i64,
    pub dir_id: i64,
    pub name: String,
    pub size: i64,
    pub created_at: Option<String>,
    pub modified_at: String,
    pub analyzed_at: Option<String>,
    pub thumbed_at: Option<String>,
    pub image_w: Option<i64>,
    pub image_h: Option<i64>,
}

// A file selected for reprocessing, with its path reassembled from the
// dirs table.
#[derive(Debug, Clone)]
pub struct PendingFile {
    pub id: i64,
    pub path: String,
}
