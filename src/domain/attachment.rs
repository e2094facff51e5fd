//! File attachments on repair requests.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: i64,
    pub repair_request_id: i64,
    pub file_name: String,
    pub file_path: Option<String>,
    pub file_size: Option<u64>,
    pub uploader_name: Option<String>,
    pub created_at: String,
}

impl Attachment {
    /// Human-readable file size.
    pub fn size_display(&self) -> String {
        match self.file_size {
            Some(bytes) if bytes >= 1024 * 1024 => {
                format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
            }
            Some(bytes) if bytes >= 1024 => format!("{:.1} KB", bytes as f64 / 1024.0),
            Some(bytes) => format!("{} B", bytes),
            None => "-".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_display() {
        let mut att = Attachment {
            id: 1,
            repair_request_id: 1,
            file_name: "photo.jpg".to_string(),
            file_path: None,
            file_size: Some(512),
            uploader_name: None,
            created_at: String::new(),
        };
        assert_eq!(att.size_display(), "512 B");
        att.file_size = Some(2048);
        assert_eq!(att.size_display(), "2.0 KB");
        att.file_size = Some(5 * 1024 * 1024);
        assert_eq!(att.size_display(), "5.0 MB");
        att.file_size = None;
        assert_eq!(att.size_display(), "-");
    }
}
