//! 单个文件的复制/移动执行器

use crate::core::conflict::resolve_collision;
use crate::core::models::{OperationMode, TransferResult};
use crate::error::{SortError, SortResult};
use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 传输执行器
#[derive(Debug, Clone, Copy)]
pub struct TransferExecutor {
    mode: OperationMode,
    dry_run: bool,
}

impl TransferExecutor {
    pub fn new(mode: OperationMode, dry_run: bool) -> Self {
        Self { mode, dry_run }
    }

    /// 把候选文件放到 `destination_root/subpath/` 下
    ///
    /// 预演模式不触碰文件系统，返回未去重的目标路径。
    pub fn execute(
        &self,
        candidate: &Path,
        destination_root: &Path,
        subpath: &[String],
    ) -> SortResult<TransferResult> {
        let file_name = candidate.file_name().ok_or_else(|| {
            SortError::Invalid(format!("source has no file name: {}", candidate.display()))
        })?;

        let target_dir: PathBuf = subpath
            .iter()
            .fold(destination_root.to_path_buf(), |dir, seg| dir.join(seg));

        if self.dry_run {
            return Ok(TransferResult {
                source: candidate.to_path_buf(),
                destination: target_dir.join(file_name),
                dry_run: true,
                verb: self.mode.dry_verb(),
            });
        }

        fs::create_dir_all(&target_dir).map_err(|e| {
            SortError::io(format!("cannot create directory {}", target_dir.display()), e)
        })?;

        let target = resolve_collision(&target_dir, Path::new(file_name));

        match self.mode {
            OperationMode::Copy => copy_with_times(candidate, &target),
            OperationMode::Move => move_file(candidate, &target),
        }
        .map_err(|e| {
            SortError::io(
                format!(
                    "cannot {} {} to {}",
                    self.mode.to_string().to_lowercase(),
                    candidate.display(),
                    target.display()
                ),
                e,
            )
        })?;

        debug!("{}: {:?} -> {:?}", self.mode.done_verb(), candidate, target);

        Ok(TransferResult {
            source: candidate.to_path_buf(),
            destination: target,
            dry_run: false,
            verb: self.mode.done_verb(),
        })
    }
}

/// 复制文件内容和权限，并保留访问/修改时间
pub fn copy_with_times(src: &Path, dest: &Path) -> io::Result<()> {
    let metadata = fs::metadata(src)?;
    fs::copy(src, dest)?;

    let mut times = FileTimes::new();
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    set_file_times(dest, times)
}

/// 设置时间戳；只读文件需要临时放开写权限
#[allow(clippy::permissions_set_readonly_false)]
fn set_file_times(path: &Path, times: FileTimes) -> io::Result<()> {
    match File::options().write(true).open(path) {
        Ok(file) => file.set_times(times),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            let original = fs::metadata(path)?.permissions();
            let mut writable = original.clone();
            writable.set_readonly(false);
            fs::set_permissions(path, writable)?;
            let result = File::options()
                .write(true)
                .open(path)
                .and_then(|file| file.set_times(times));
            fs::set_permissions(path, original)?;
            result
        }
        Err(e) => Err(e),
    }
}

/// 移动文件；跨设备等 rename 失败的情况回退为复制后删除源文件
pub fn move_file(src: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(e) => {
            if !src.exists() {
                return Err(e);
            }
            warn!("重命名失败，回退为复制+删除: {:?} ({})", src, e);
            copy_then_remove(src, dest)
        }
    }
}

/// 复制后删除源文件；删除失败时清理已写入的副本
fn copy_then_remove(src: &Path, dest: &Path) -> io::Result<()> {
    copy_with_times(src, dest)?;
    fs::remove_file(src).inspect_err(|_| {
        let _ = fs::remove_file(dest);
    })
}
