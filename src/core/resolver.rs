//! 目标子目录计算
//!
//! 根据所选结构把候选文件映射为一组相对于目标根目录的路径段（不含文件名）。

use crate::core::models::{DateSource, SortSpec, Structure};
use crate::error::{SortError, SortResult};
use chrono::{DateTime, Local, NaiveDate, TimeDelta, TimeZone};
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Component, Path};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// 自定义模板支持的占位符
pub const TEMPLATE_TOKENS: &[&str] = &["type", "topic", "year", "month", "mon", "day"];

/// 需要文件日期的占位符
const DATE_TOKENS: &[&str] = &["year", "month", "mon", "day"];

/// 没有扩展名时使用的类型目录
pub const NO_EXTENSION: &str = "other";

/// 解析结果
#[derive(Debug)]
pub struct Resolution {
    pub segments: Vec<String>,
    /// 读取日期失败时的警告，日期相关的路径段已被省略
    pub warning: Option<SortError>,
}

/// 路径解析器
pub struct PathResolver<'a> {
    spec: &'a SortSpec,
    needs_date: bool,
}

impl<'a> PathResolver<'a> {
    pub fn new(spec: &'a SortSpec) -> Self {
        let needs_date = match spec.structure {
            Structure::Custom => spec
                .template
                .as_deref()
                .map(template_uses_date)
                .unwrap_or(false),
            structure => structure.uses_date(),
        };
        Self { spec, needs_date }
    }

    /// 计算候选文件的目标子目录
    pub fn resolve(&self, candidate: &Path) -> Resolution {
        let (date, warning) = if self.needs_date {
            match file_date(candidate, self.spec.date_source) {
                Ok(d) => (Some(d), None),
                Err(e) => (None, Some(e)),
            }
        } else {
            (None, None)
        };

        let file_name = candidate
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Resolution {
            segments: segments_for(&file_name, date, self.spec),
            warning,
        }
    }
}

/// 读取文件日期（本地时区）
pub fn file_date(path: &Path, source: DateSource) -> SortResult<NaiveDate> {
    let missing = |source| SortError::MissingMetadata {
        path: path.to_path_buf(),
        source,
    };

    let metadata = fs::metadata(path).map_err(missing)?;
    let time = match source {
        DateSource::Created => metadata.created(),
        DateSource::Modified => metadata.modified(),
    }
    .map_err(missing)?;

    local_date(time).ok_or_else(|| missing(io::Error::other("timestamp out of range")))
}

/// 系统时间转换为本地日期，超出 chrono 可表示范围时返回 None
pub fn local_date(time: SystemTime) -> Option<NaiveDate> {
    let utc = match time.duration_since(UNIX_EPOCH) {
        Ok(after) => {
            DateTime::from_timestamp(i64::try_from(after.as_secs()).ok()?, after.subsec_nanos())
        }
        Err(e) => {
            let before = e.duration();
            let secs = i64::try_from(before.as_secs()).ok()?;
            match before.subsec_nanos() {
                0 => DateTime::from_timestamp(-secs, 0),
                nanos => DateTime::from_timestamp(-secs - 1, 1_000_000_000 - nanos),
            }
        }
    }?
    .naive_utc();

    let offset = Local.offset_from_utc_datetime(&utc);
    let local = utc.checked_add_signed(TimeDelta::try_seconds(i64::from(
        offset.local_minus_utc(),
    ))?)?;
    Some(local.date())
}

/// 文件类型目录名：小写扩展名，没有扩展名时为 "other"
pub fn file_type(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| NO_EXTENSION.to_string())
}

/// 三字母大写月份，例如 "MAR"
pub fn month_abbrev(date: NaiveDate) -> String {
    date.format("%b").to_string().to_uppercase()
}

/// 纯函数部分：给定文件名和日期计算路径段
pub fn segments_for(file_name: &str, date: Option<NaiveDate>, spec: &SortSpec) -> Vec<String> {
    let mut segments = Vec::new();

    if spec.structure == Structure::Custom {
        let template = spec.template.as_deref().unwrap_or_default();
        let values = TemplateValues {
            file_type: file_type(file_name),
            topic: spec.topic().unwrap_or_default(),
            date,
        };
        for raw in template.replace('\\', "/").split('/') {
            if let Some(expanded) = expand_segment(raw, &values) {
                push_sanitized(&mut segments, &expanded);
            }
        }
        return segments;
    }

    if spec.structure.uses_topic() {
        if let Some(topic) = spec.topic() {
            push_sanitized(&mut segments, topic);
        }
    }

    if spec.structure.uses_type() {
        segments.push(file_type(file_name));
    }

    if spec.structure.uses_date() {
        if let Some(date) = date {
            segments.push(date.format("%Y").to_string());
            segments.push(month_abbrev(date));
            if spec.structure.uses_day() {
                segments.push(date.format("%d").to_string());
            }
        }
    }

    segments
}

/// 模板中出现的未知占位符（保持原样写入路径）
pub fn unknown_tokens(template: &str) -> Vec<String> {
    token_regex()
        .captures_iter(template)
        .map(|c| c[1].to_string())
        .filter(|name| !TEMPLATE_TOKENS.contains(&name.as_str()))
        .collect()
}

fn template_uses_date(template: &str) -> bool {
    token_regex()
        .captures_iter(template)
        .any(|c| DATE_TOKENS.contains(&&c[1]))
}

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^{}/\\]*)\}").expect("static token pattern"))
}

struct TemplateValues<'a> {
    file_type: String,
    topic: &'a str,
    date: Option<NaiveDate>,
}

enum TokenValue {
    Text(String),
    /// 日期占位符，但文件日期不可用
    NoDate,
}

impl TemplateValues<'_> {
    fn lookup(&self, name: &str) -> Option<TokenValue> {
        let dated = |fmt: &dyn Fn(NaiveDate) -> String| match self.date {
            Some(d) => TokenValue::Text(fmt(d)),
            None => TokenValue::NoDate,
        };
        let value = match name {
            "type" => TokenValue::Text(self.file_type.clone()),
            "topic" => TokenValue::Text(self.topic.to_string()),
            "year" => dated(&|d| d.format("%Y").to_string()),
            "month" => dated(&|d| d.format("%m").to_string()),
            "mon" => dated(&month_abbrev),
            "day" => dated(&|d| d.format("%d").to_string()),
            _ => return None,
        };
        Some(value)
    }
}

/// 单遍展开一个路径段；替换后的文本不会再被扫描。
/// 日期不可用且该段引用了日期时返回 None。
fn expand_segment(segment: &str, values: &TemplateValues) -> Option<String> {
    let mut out = String::with_capacity(segment.len());
    let mut rest = segment;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tail.find('}') else {
            out.push_str(tail);
            return Some(out);
        };

        match values.lookup(&tail[1..end]) {
            Some(TokenValue::Text(text)) => {
                out.push_str(&text);
                rest = &tail[end + 1..];
            }
            Some(TokenValue::NoDate) => return None,
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    Some(out)
}

/// 按分隔符拆分并丢弃空段、`.`、`..` 以及盘符等非普通路径段
fn push_sanitized(segments: &mut Vec<String>, raw: &str) {
    for part in raw.split(['/', '\\']) {
        let mut components = Path::new(part).components();
        if let (Some(Component::Normal(_)), None) = (components.next(), components.next()) {
            segments.push(part.to_string());
        }
    }
}
