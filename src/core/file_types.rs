//! 内置文件类型目录与扩展名列表解析

use std::collections::BTreeSet;

/// 默认选中的文件类型
pub const DEFAULT_FILE_TYPES: &str = "pdf, docx, xlsx, jpg, png, txt";

/// 按类别分组的常用文件类型
pub const CATALOG: &[(&str, &[&str])] = &[
    ("Documents", &["pdf", "docx", "xlsx", "pptx", "txt", "csv", "rtf"]),
    (
        "Images",
        &["jpg", "jpeg", "png", "gif", "bmp", "svg", "tiff", "heic"],
    ),
    ("Audio", &["mp3", "wav", "aac", "flac", "m4a"]),
    ("Video", &["mp4", "mov", "avi", "mkv", "wmv"]),
    ("Archives", &["zip", "rar", "7z", "tar", "gz"]),
];

/// 规范化单个扩展名：去空白、去前导点、转小写
pub fn normalize_extension(ext: &str) -> Option<String> {
    let ext = ext.trim().trim_start_matches('.').to_lowercase();
    if ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

pub fn normalize_extensions<I, S>(items: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .filter_map(|e| normalize_extension(e.as_ref()))
        .collect()
}

/// 解析逗号分隔的扩展名列表，例如 `"pdf, .DOCX, ,jpg"`
pub fn parse_list(list: &str) -> BTreeSet<String> {
    normalize_extensions(list.split(','))
}

/// 按类别名（不区分大小写）查找扩展名
pub fn category(name: &str) -> Option<&'static [&'static str]> {
    let name = name.trim();
    CATALOG
        .iter()
        .find(|(category, _)| category.eq_ignore_ascii_case(name))
        .map(|(_, types)| *types)
}

/// 文件名（小写后）是否以 `.` + 任一扩展名结尾
pub fn matches(file_name: &str, extensions: &BTreeSet<String>) -> bool {
    let name = file_name.to_lowercase();
    extensions
        .iter()
        .any(|ext| name.ends_with(&format!(".{}", ext)))
}
