//! 内置文件类型列表

use crate::core::file_types::{CATALOG, DEFAULT_FILE_TYPES};

/// 按分类输出内置文件类型，每行一个分类
pub fn list_types() -> Vec<String> {
    let mut lines: Vec<String> = CATALOG
        .iter()
        .map(|(category, types)| format!("{:<10} {}", category, types.join(", ")))
        .collect();
    lines.push(String::new());
    lines.push(format!("Default: {}", DEFAULT_FILE_TYPES));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_types() {
        let lines = list_types();
        assert_eq!(lines.len(), CATALOG.len() + 2);
        assert_eq!(lines[0], "Documents  pdf, docx, xlsx, pptx, txt, csv, rtf");
        assert_eq!(lines.last().unwrap(), "Default: pdf, docx, xlsx, jpg, png, txt");
    }
}
