use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// On-disk cache for frames fetched over HTTP, keyed by URL
#[derive(Debug, Clone)]
pub struct FrameDiskCache {
    dir: PathBuf,
}

impl FrameDiskCache {
    pub fn new(dir: &Path) -> std::io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn url_to_filename(url: &str) -> String {
        let mut hasher = DefaultHasher::new();
        url.hash(&mut hasher);
        let hash = hasher.finish();

        let ext = url
            .rsplit('/')
            .next()
            .and_then(|segment| segment.split('?').next())
            .and_then(|segment| segment.rsplit_once('.'))
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| ["jpg", "jpeg", "png", "gif", "webp"].contains(&ext.as_str()))
            .unwrap_or_else(|| "bin".to_string());

        format!("{:016x}.{}", hash, ext)
    }

    pub fn cache_path(&self, url: &str) -> PathBuf {
        self.dir.join(Self::url_to_filename(url))
    }

    pub fn is_cached(&self, url: &str) -> bool {
        self.cache_path(url).exists()
    }

    /// Raw bytes for `url`, if cached
    pub async fn load(&self, url: &str) -> Option<Vec<u8>> {
        tokio::fs::read(self.cache_path(url)).await.ok()
    }

    pub async fn save(&self, url: &str, data: &[u8]) -> std::io::Result<()> {
        tokio::fs::write(self.cache_path(url), data).await
    }
}
