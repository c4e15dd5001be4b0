use std::path::PathBuf;

use dog_blob::BlobConfig;

struct StreamDefaults;

impl StreamDefaults {
    const HTTP_HOST: &'static str = "127.0.0.1";
    const HTTP_PORT: u16 = 3030;
    const UPLOAD_DIR: &'static str = "uploads";
    const READ_CHUNK_KB: usize = 64;
    const CONTENT_TYPE: &'static str = "audio/mpeg";
    const STREAM_BUFFER: usize = 8;
}

/// Service settings, read once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSettings {
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub read_chunk_kb: usize,
    pub content_type: String,
    pub stream_buffer: usize,
    pub static_dir: Option<PathBuf>,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            host: StreamDefaults::HTTP_HOST.to_string(),
            port: StreamDefaults::HTTP_PORT,
            upload_dir: PathBuf::from(StreamDefaults::UPLOAD_DIR),
            read_chunk_kb: StreamDefaults::READ_CHUNK_KB,
            content_type: StreamDefaults::CONTENT_TYPE.to_string(),
            stream_buffer: StreamDefaults::STREAM_BUFFER,
            static_dir: None,
        }
    }
}

impl StreamSettings {
    pub fn from_env() -> Self {
        Self {
            host: env_var_or("HTTP_HOST", StreamDefaults::HTTP_HOST.to_string()),
            port: env_var_or("HTTP_PORT", StreamDefaults::HTTP_PORT),
            upload_dir: PathBuf::from(env_var_or(
                "MUSIC_UPLOAD_DIR",
                StreamDefaults::UPLOAD_DIR.to_string(),
            )),
            read_chunk_kb: env_var_or("MUSIC_READ_CHUNK_KB", StreamDefaults::READ_CHUNK_KB),
            content_type: env_var_or("MUSIC_CONTENT_TYPE", StreamDefaults::CONTENT_TYPE.to_string()),
            stream_buffer: env_var_or("MUSIC_STREAM_BUFFER", StreamDefaults::STREAM_BUFFER),
            static_dir: std::env::var("STATIC_DIR").ok().map(PathBuf::from),
        }
    }

    pub fn with_upload_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.upload_dir = dir.into();
        self
    }

    pub fn with_read_chunk_kb(mut self, kb: usize) -> Self {
        self.read_chunk_kb = kb;
        self
    }

    pub fn with_static_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn read_chunk_bytes(&self) -> usize {
        self.read_chunk_kb.max(1) * 1024
    }

    pub fn blob_config(&self) -> BlobConfig {
        BlobConfig::new()
            .with_read_chunk_bytes(self.read_chunk_bytes())
            .with_default_content_type(self.content_type.clone())
    }
}

fn env_var_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
    T::Err: std::fmt::Debug,
{
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = StreamSettings::default();
        assert_eq!(settings.addr(), "127.0.0.1:3030");
        assert_eq!(settings.read_chunk_bytes(), 64 * 1024);
        assert_eq!(settings.blob_config().default_content_type, "audio/mpeg");
        assert!(settings.static_dir.is_none());
    }

    #[test]
    fn zero_chunk_size_still_reads() {
        let settings = StreamSettings::default().with_read_chunk_kb(0);
        assert_eq!(settings.read_chunk_bytes(), 1024);
    }

    #[test]
    fn unparsable_env_value_falls_back() {
        std::env::set_var("MUSIC_STREAM_TEST_PORT", "not-a-port");
        assert_eq!(env_var_or("MUSIC_STREAM_TEST_PORT", 3030u16), 3030);
        std::env::remove_var("MUSIC_STREAM_TEST_PORT");
    }
}
