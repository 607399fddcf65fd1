use crate::core::file_types;
use crate::error::{SortError, SortResult};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// 文件扫描器配置
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// 仅包含的扩展名（小写、不带点）
    pub include_extensions: BTreeSet<String>,
    /// 是否递归子目录
    pub recursive: bool,
    /// 递归时跳过的目录（通常是目标目录）
    pub exclude_dir: Option<PathBuf>,
}

/// 扫描结果
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// 候选文件的绝对路径，按文件名排序
    pub files: Vec<PathBuf>,
    /// 被跳过的不可读条目
    pub warnings: Vec<String>,
}

/// 文件扫描器
pub struct FileScanner {
    config: ScanConfig,
}

impl FileScanner {
    pub fn with_config(config: ScanConfig) -> Self {
        Self { config }
    }

    /// 扫描源目录，返回所有匹配扩展名的文件
    pub fn scan(&self, origin: &Path) -> SortResult<ScanOutcome> {
        if !origin.is_dir() {
            return Err(SortError::NotADirectory(origin.to_path_buf()));
        }
        let origin = fs::canonicalize(origin)
            .map_err(|e| SortError::io(format!("cannot resolve {}", origin.display()), e))?;

        info!(
            "开始扫描: {:?}, 递归: {}, 扩展名: {:?}",
            origin, self.config.recursive, self.config.include_extensions
        );

        let outcome = if self.config.recursive {
            self.scan_recursive(&origin)
        } else {
            self.scan_flat(&origin)?
        };

        info!(
            "扫描完成: {} 个文件, {} 个条目被跳过",
            outcome.files.len(),
            outcome.warnings.len()
        );
        Ok(outcome)
    }

    fn scan_recursive(&self, origin: &Path) -> ScanOutcome {
        // 目标目录可能尚未创建，此时无需排除
        let excluded = self
            .config
            .exclude_dir
            .as_ref()
            .and_then(|d| fs::canonicalize(d).ok());

        let mut outcome = ScanOutcome::default();
        let walker = WalkDir::new(origin)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| match &excluded {
                Some(dir) if entry.file_type().is_dir() && entry.path() == dir => {
                    debug!("跳过目标目录: {:?}", entry.path());
                    false
                }
                _ => true,
            });

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    let path = e
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| origin.display().to_string());
                    warn!("跳过无法读取的条目 {}: {}", path, e);
                    outcome
                        .warnings
                        .push(format!("Warning: Skipped unreadable entry {}: {}", path, e));
                    continue;
                }
            };

            let is_file = entry.file_type().is_file()
                || (entry.path_is_symlink() && entry.path().is_file());
            if !is_file {
                continue;
            }

            if self.is_match(entry.file_name().to_string_lossy().as_ref()) {
                outcome.files.push(entry.into_path());
            }
        }

        outcome
    }

    fn scan_flat(&self, origin: &Path) -> SortResult<ScanOutcome> {
        let entries = fs::read_dir(origin)
            .map_err(|e| SortError::io(format!("cannot read {}", origin.display()), e))?;

        let mut outcome = ScanOutcome::default();
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("跳过无法读取的条目 {:?}: {}", origin, e);
                    outcome.warnings.push(format!(
                        "Warning: Skipped unreadable entry in {}: {}",
                        origin.display(),
                        e
                    ));
                    continue;
                }
            };

            let path = entry.path();
            // 与 os.path.isfile 一致：跟随符号链接判断是否为普通文件
            if !path.is_file() {
                continue;
            }
            if self.is_match(entry.file_name().to_string_lossy().as_ref()) {
                outcome.files.push(path);
            }
        }

        outcome.files.sort();
        Ok(outcome)
    }

    fn is_match(&self, file_name: &str) -> bool {
        file_types::matches(file_name, &self.config.include_extensions)
    }
}
