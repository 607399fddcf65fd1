//! 应用配置模块
//!
//! 配置保存在 `config.json` 中。保存时只更新本模块管理的键，
//! 其他键（例如桌面前端写入的 `theme`、`color_theme`）保持不变。

use crate::core::file_types::DEFAULT_FILE_TYPES;
use crate::core::models::OperationMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";

/// 整理默认值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// 默认操作模式
    #[serde(default)]
    pub default_operation: OperationMode,
    /// 默认是否包含子文件夹
    #[serde(default = "default_subfolders")]
    pub default_subfolders: bool,
    /// 默认文件类型（逗号分隔）
    #[serde(default = "default_file_types")]
    pub file_types: String,
}

fn default_subfolders() -> bool {
    true
}

fn default_file_types() -> String {
    DEFAULT_FILE_TYPES.to_string()
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_operation: OperationMode::default(),
            default_subfolders: default_subfolders(),
            file_types: default_file_types(),
        }
    }
}

/// 读取整个配置文件，不存在或损坏时返回空对象
pub fn read_config_value(config_dir: &Path) -> serde_json::Value {
    fs::read_to_string(config_file(config_dir))
        .ok()
        .and_then(|content| serde_json::from_str::<serde_json::Value>(&content).ok())
        .filter(|v| v.is_object())
        .unwrap_or_else(|| serde_json::json!({}))
}

/// 把若干顶层键合并写回配置文件
pub fn merge_config_value(
    config_dir: &Path,
    entries: serde_json::Map<String, serde_json::Value>,
) -> io::Result<()> {
    fs::create_dir_all(config_dir)?;
    let mut config = read_config_value(config_dir);
    if let Some(object) = config.as_object_mut() {
        object.extend(entries);
    }
    let content = serde_json::to_string_pretty(&config).map_err(io::Error::other)?;
    fs::write(config_file(config_dir), content)
}

pub fn config_file(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE)
}

impl AppSettings {
    /// 从配置文件加载，单个字段无效时使用默认值
    pub fn load(config_dir: &Path) -> Self {
        let config = read_config_value(config_dir);
        let defaults = Self::default();
        Self {
            default_operation: config
                .get("default_operation")
                .and_then(|v| v.as_str())
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.default_operation),
            default_subfolders: config
                .get("default_subfolders")
                .and_then(|v| v.as_bool())
                .unwrap_or(defaults.default_subfolders),
            file_types: config
                .get("file_types")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or(defaults.file_types),
        }
    }

    /// 保存整理默认值
    pub fn save(&self, config_dir: &Path) -> io::Result<()> {
        match serde_json::to_value(self).map_err(io::Error::other)? {
            serde_json::Value::Object(entries) => merge_config_value(config_dir, entries),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(AppSettings::load(dir.path()), AppSettings::default());
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "{not json").unwrap();
        assert_eq!(AppSettings::load(dir.path()), AppSettings::default());
    }

    #[test]
    fn test_reads_desktop_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"theme": "Dark", "color_theme": "green", "default_operation": "Copy", "default_subfolders": false}"#,
        )
        .unwrap();
        let settings = AppSettings::load(dir.path());
        assert_eq!(settings.default_operation, OperationMode::Copy);
        assert!(!settings.default_subfolders);
        assert_eq!(settings.file_types, DEFAULT_FILE_TYPES);
    }

    #[test]
    fn test_save_keeps_foreign_keys() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), r#"{"theme": "Light"}"#).unwrap();

        let settings = AppSettings {
            default_operation: OperationMode::Copy,
            default_subfolders: false,
            file_types: "mp3".to_string(),
        };
        settings.save(dir.path()).unwrap();

        let value = read_config_value(dir.path());
        assert_eq!(value["theme"], "Light");
        assert_eq!(value["default_operation"], "Copy");
        assert_eq!(AppSettings::load(dir.path()), settings);
    }
}
