use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub max_body_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
            max_body_bytes: 20 * 1024 * 1024,
        }
    }
}

impl UploadConfig {
    pub fn init_from_env(&mut self) -> Result<(), String> {
        if let Ok(dir) = env::var("UPLOAD_DIR") {
            self.dir = PathBuf::from(dir);
        }

        if let Ok(limit) = env::var("MAX_BODY_BYTES") {
            self.max_body_bytes = limit
                .parse::<usize>()
                .map_err(|_| "MAX_BODY_BYTES is not a valid usize".to_string())?;
        }

        Ok(())
    }
}
