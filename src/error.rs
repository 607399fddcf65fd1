//! 整理任务的错误类型

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 整理过程中可能出现的错误
///
/// 显示文本会原样出现在运行日志中，因此保持英文。
#[derive(Debug, Error)]
pub enum SortError {
    /// 源目录不存在或不是目录
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// 无法读取文件日期（非致命，仅记录警告）
    #[error("could not read date of {}: {source}", .path.display())]
    MissingMetadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 目录创建或复制/移动失败，终止本次运行
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// 已有整理任务在运行
    #[error("a sort run is already in progress")]
    AlreadyRunning,

    /// 请求参数无效
    #[error("{0}")]
    Invalid(String),
}

impl SortError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        SortError::Io {
            context: context.into(),
            source,
        }
    }
}

pub type SortResult<T> = std::result::Result<T, SortError>;
