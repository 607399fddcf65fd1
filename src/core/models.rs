use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// 操作模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationMode {
    #[default]
    Move,
    Copy,
}

impl OperationMode {
    /// 实际执行后写入日志的动词
    pub fn done_verb(self) -> &'static str {
        match self {
            OperationMode::Copy => "Copied",
            OperationMode::Move => "Moved",
        }
    }

    /// 预演模式下的动词
    pub fn dry_verb(self) -> &'static str {
        match self {
            OperationMode::Copy => "Would copy",
            OperationMode::Move => "Would move",
        }
    }
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationMode::Move => write!(f, "Move"),
            OperationMode::Copy => write!(f, "Copy"),
        }
    }
}

impl std::str::FromStr for OperationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "move" => Ok(OperationMode::Move),
            "copy" => Ok(OperationMode::Copy),
            _ => Err(format!("invalid operation mode: {}", s)),
        }
    }
}

/// 目标目录结构
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Structure {
    #[default]
    YearMonth,
    YearMonthDay,
    FileType,
    FileTypeYearMonth,
    TopicYearMonth,
    Custom,
}

impl Structure {
    /// 运行日志中显示的名称
    pub fn label(self) -> &'static str {
        match self {
            Structure::YearMonth => "Year/Month",
            Structure::YearMonthDay => "Year/Month/Day",
            Structure::FileType => "File Type",
            Structure::FileTypeYearMonth => "File Type/Year/Month",
            Structure::TopicYearMonth => "Topic/Year/Month",
            Structure::Custom => "Custom...",
        }
    }

    pub fn uses_topic(self) -> bool {
        matches!(self, Structure::TopicYearMonth)
    }

    pub fn uses_type(self) -> bool {
        matches!(self, Structure::FileType | Structure::FileTypeYearMonth)
    }

    /// 是否需要读取文件日期（Custom 由模板决定）
    pub fn uses_date(self) -> bool {
        !matches!(self, Structure::FileType)
    }

    pub fn uses_day(self) -> bool {
        matches!(self, Structure::YearMonthDay)
    }
}

/// 文件日期来源
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateSource {
    /// 创建时间
    #[default]
    Created,
    /// 修改时间（适用于不记录创建时间的文件系统）
    Modified,
}

/// 一次整理运行的配置，运行期间只读
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub origin: PathBuf,
    pub destination: PathBuf,
    /// 小写、不带点的扩展名集合
    pub extensions: BTreeSet<String>,
    pub recursive: bool,
    pub mode: OperationMode,
    pub structure: Structure,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default)]
    pub date_source: DateSource,
}

impl SortSpec {
    pub fn new(origin: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            extensions: BTreeSet::new(),
            recursive: true,
            mode: OperationMode::default(),
            structure: Structure::default(),
            topic: None,
            template: None,
            date_source: DateSource::default(),
        }
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = crate::core::file_types::normalize_extensions(extensions);
        self
    }

    pub fn with_structure(mut self, structure: Structure) -> Self {
        self.structure = structure;
        self
    }

    pub fn with_mode(mut self, mode: OperationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn with_date_source(mut self, date_source: DateSource) -> Self {
        self.date_source = date_source;
        self
    }

    /// 去除首尾空白后的主题，空字符串视为未设置
    pub fn topic(&self) -> Option<&str> {
        self.topic
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// 运行日志中 "Structure:" 一行显示的内容
    pub fn structure_label(&self) -> String {
        match (self.structure, self.template.as_deref()) {
            (Structure::Custom, Some(template)) => template.to_string(),
            (structure, _) => structure.label().to_string(),
        }
    }

    /// 运行日志中 "File types:" 一行显示的内容
    pub fn extensions_label(&self) -> String {
        self.extensions
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// 单个文件的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferResult {
    pub source: PathBuf,
    /// 实际使用的目标路径（预演时为未去重的路径）
    pub destination: PathBuf,
    pub dry_run: bool,
    pub verb: &'static str,
}

impl TransferResult {
    /// 生成一行运行日志：`[DRY RUN] <Verb>: <filename> -> <dest>`
    pub fn log_line(&self) -> String {
        let prefix = if self.dry_run { "[DRY RUN] " } else { "" };
        let file_name = self
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!(
            "{}{}: {} -> {}",
            prefix,
            self.verb,
            file_name,
            self.destination.display()
        )
    }
}

/// 运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Completed,
    Failed,
}

/// 推送给展示层的运行事件
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// 一行运行日志
    Log(String),
    /// 进度，范围 [0, 1]
    Progress(f64),
}

/// 运行报告
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortReport {
    pub run_id: String,
    pub dry_run: bool,
    pub mode: OperationMode,
    pub status: RunStatus,
    pub files_found: usize,
    pub files_processed: usize,
    pub start_time: i64,
    pub end_time: i64,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
