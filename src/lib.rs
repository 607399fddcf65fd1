use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;

pub use crate::core::{
    OperationMode, RunEvent, RunStatus, SortEngine, SortReport, SortSpec, Structure,
};
pub use error::{SortError, SortResult};

/// 应用状态，在各命令之间共享
#[derive(Clone)]
pub struct AppState {
    pub config_dir: PathBuf,
    /// 是否有整理任务正在运行（同一时间只允许一个）
    pub running: Arc<AtomicBool>,
}

impl AppState {
    /// 使用指定目录或默认配置目录
    pub fn new(config_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let config_dir = config_dir.unwrap_or_else(|| {
            dirs::config_dir()
                .map(|p| p.join("sorteo"))
                .unwrap_or_else(|| PathBuf::from(".sorteo"))
        });

        std::fs::create_dir_all(&config_dir)?;
        tracing::debug!("配置目录: {:?}", config_dir);

        Ok(Self {
            config_dir,
            running: Arc::new(AtomicBool::new(false)),
        })
    }
}

pub mod dirs {
    use std::path::PathBuf;

    pub fn config_dir() -> Option<PathBuf> {
        if cfg!(target_os = "windows") {
            std::env::var("APPDATA").ok().map(PathBuf::from)
        } else if cfg!(target_os = "macos") {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library").join("Application Support"))
        } else {
            // Linux: 优先 XDG_CONFIG_HOME
            std::env::var("XDG_CONFIG_HOME")
                .ok()
                .filter(|p| !p.is_empty())
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".config"))
                })
        }
    }
}
