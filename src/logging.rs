//! 日志模块 - 提供文件日志和大小管理功能

use crate::config::{merge_config_value, read_config_value};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;

pub const LOG_FILE: &str = "sorteo.log";

/// 有效的日志级别
pub const VALID_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogConfig {
    /// 是否启用日志记录
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// 最大日志文件大小（MB）
    #[serde(default = "default_max_size_mb")]
    pub max_size_mb: u32,
    /// 日志级别: "error", "warn", "info", "debug", "trace"
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_enabled() -> bool {
    true
}

fn default_max_size_mb() -> u32 {
    5
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_size_mb: default_max_size_mb(),
            level: default_level(),
        }
    }
}

impl LogConfig {
    /// 从配置文件的 `log` 键加载
    pub fn load(config_dir: &Path) -> Self {
        read_config_value(config_dir)
            .get("log")
            .and_then(|v| serde_json::from_value::<LogConfig>(v.clone()).ok())
            .unwrap_or_default()
    }

    /// 保存到配置文件的 `log` 键
    pub fn save(&self, config_dir: &Path) -> io::Result<()> {
        let mut entries = serde_json::Map::new();
        entries.insert(
            "log".to_string(),
            serde_json::to_value(self).map_err(io::Error::other)?,
        );
        merge_config_value(config_dir, entries)
    }

    /// 设置日志级别，无效级别返回错误
    pub fn set_level(&mut self, level: &str) -> Result<(), String> {
        let level = level.to_lowercase();
        if VALID_LEVELS.contains(&level.as_str()) {
            self.level = level;
            Ok(())
        } else {
            Err(format!("invalid log level: {}", level))
        }
    }

    /// 设置最大文件大小，限制在 1-100 MB
    pub fn set_max_size_mb(&mut self, size: u32) {
        self.max_size_mb = size.clamp(1, 100);
    }

    /// 将配置的日志级别转换为 tracing Level
    pub fn tracing_level(&self) -> tracing::Level {
        match self.level.to_lowercase().as_str() {
            "error" => tracing::Level::ERROR,
            "warn" => tracing::Level::WARN,
            "debug" => tracing::Level::DEBUG,
            "trace" => tracing::Level::TRACE,
            _ => tracing::Level::INFO,
        }
    }
}

/// 带大小限制的日志写入器
///
/// 超过上限后把当前文件改名为 `*.old`（覆盖旧备份）并重新开始写入。
pub struct SizeRotatingWriter {
    file_path: PathBuf,
    max_size: u64,
    written: u64,
    writer: BufWriter<File>,
}

impl SizeRotatingWriter {
    pub fn new(log_dir: &Path, max_size_mb: u32) -> io::Result<Self> {
        fs::create_dir_all(log_dir)?;
        let file_path = log_dir.join(LOG_FILE);
        let max_size = u64::from(max_size_mb) * 1024 * 1024;

        let existing = fs::metadata(&file_path).map(|m| m.len()).unwrap_or(0);
        if existing > max_size {
            Self::rotate_log(&file_path)?;
        }
        let written = fs::metadata(&file_path).map(|m| m.len()).unwrap_or(0);

        Ok(Self {
            writer: Self::open_file(&file_path)?,
            file_path,
            max_size,
            written,
        })
    }

    fn open_file(file_path: &Path) -> io::Result<BufWriter<File>> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        Ok(BufWriter::new(file))
    }

    /// 轮转日志文件: sorteo.log -> sorteo.log.old
    fn rotate_log(file_path: &Path) -> io::Result<()> {
        let backup_path = file_path.with_extension("log.old");
        if backup_path.exists() {
            fs::remove_file(&backup_path)?;
        }
        fs::rename(file_path, &backup_path)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.writer.flush()?;
        Self::rotate_log(&self.file_path)?;
        self.writer = Self::open_file(&self.file_path)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for SizeRotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_size {
            self.rotate()?;
        }
        let n = self.writer.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// 初始化日志系统
///
/// 返回的 guard 需要保持到进程结束，否则缓冲中的日志会丢失。
pub fn init_logging(config_dir: &Path) -> Option<WorkerGuard> {
    let config = LogConfig::load(config_dir);

    if !config.enabled {
        let _ = tracing::subscriber::set_global_default(tracing_subscriber::registry());
        return None;
    }

    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(config.tracing_level().into())
        .from_env_lossy();

    // debug 构建同时输出到 stderr，stdout 留给运行日志
    let console_layer = cfg!(debug_assertions).then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
    });

    // 文件日志创建失败时只保留控制台输出
    let (file_layer, guard) = match SizeRotatingWriter::new(config_dir, config.max_size_mb) {
        Ok(file_writer) => {
            let (writer, guard) = tracing_appender::non_blocking(file_writer);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        Err(e) => {
            eprintln!("cannot open log file in {}: {}", config_dir.display(), e);
            (None, None)
        }
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer);
    let _ = tracing::subscriber::set_global_default(subscriber);
    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_roundtrip_in_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LogConfig::default();
        config.set_level("DEBUG").unwrap();
        config.set_max_size_mb(500);
        config.save(dir.path()).unwrap();

        let loaded = LogConfig::load(dir.path());
        assert_eq!(loaded.level, "debug");
        assert_eq!(loaded.max_size_mb, 100);
        assert_eq!(loaded.tracing_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        let mut config = LogConfig::default();
        assert!(config.set_level("verbose").is_err());
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_writer_rotates_when_full() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = SizeRotatingWriter::new(dir.path(), 1).unwrap();
        let chunk = vec![b'x'; 700 * 1024];
        writer.write_all(&chunk).unwrap();
        writer.write_all(&chunk).unwrap();
        writer.flush().unwrap();

        let backup = dir.path().join("sorteo.log.old");
        assert!(backup.exists());
        assert_eq!(fs::metadata(&backup).unwrap().len(), 700 * 1024);
        assert_eq!(
            fs::metadata(dir.path().join(LOG_FILE)).unwrap().len(),
            700 * 1024
        );
    }

    #[test]
    fn test_init_logging_writes_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let guard = init_logging(dir.path());
        assert!(guard.is_some());
        assert!(dir.path().join(LOG_FILE).exists());

        let disabled = tempfile::tempdir().unwrap();
        LogConfig {
            enabled: false,
            ..LogConfig::default()
        }
        .save(disabled.path())
        .unwrap();
        assert!(init_logging(disabled.path()).is_none());
        assert!(!disabled.path().join(LOG_FILE).exists());
    }
}
