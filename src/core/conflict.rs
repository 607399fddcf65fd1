//! 文件名冲突处理：目标已存在时追加数字后缀，绝不覆盖

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 生成冲突文件名：`name.ext` -> `name_{counter}.ext`
pub fn generate_conflict_name(file_name: &Path, counter: u32) -> OsString {
    let stem = file_name.file_stem().unwrap_or(file_name.as_os_str());
    let mut name = OsString::from(stem);
    name.push(format!("_{}", counter));
    if let Some(ext) = file_name.extension() {
        name.push(".");
        name.push(ext);
    }
    name
}

/// 路径上是否已有任何条目（包括失效的符号链接）
fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// 在 `target_dir` 中为 `file_name` 选择一个尚不存在的路径。
///
/// 每次循环都重新检查文件系统，不做预扫描或缓存。
pub fn resolve_collision(target_dir: &Path, file_name: &Path) -> PathBuf {
    let mut target = target_dir.join(file_name);
    let mut counter = 1;

    while occupied(&target) {
        target = target_dir.join(generate_conflict_name(file_name, counter));
        counter += 1;
    }

    if counter > 1 {
        debug!("目标已存在，重命名为: {:?}", target);
    }
    target
}
