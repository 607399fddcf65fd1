use crate::core::models::{RunEvent, RunStatus, SortReport, SortSpec};
use crate::core::resolver::PathResolver;
use crate::core::scanner::{FileScanner, ScanConfig};
use crate::core::transfer::TransferExecutor;
use crate::error::SortError;
use std::path::Path;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// 整理引擎：枚举 -> 解析 -> 执行，逐个文件顺序处理
///
/// `run` 是阻塞调用，应在独立的工作线程上执行（见 `commands::sort`）。
pub struct SortEngine {
    spec: SortSpec,
    dry_run: bool,
}

impl SortEngine {
    pub fn new(spec: SortSpec, dry_run: bool) -> Self {
        Self { spec, dry_run }
    }

    pub fn spec(&self) -> &SortSpec {
        &self.spec
    }

    /// 运行整理任务
    ///
    /// 日志行和进度通过 `events` 推送，接收端关闭不会影响运行。
    /// 致命错误会终止剩余处理，并体现在返回的报告中。
    pub fn run(&self, events: Option<&mpsc::UnboundedSender<RunEvent>>) -> SortReport {
        let run_id = uuid::Uuid::new_v4().to_string();
        let start_time = chrono::Utc::now().timestamp();
        let started = Instant::now();
        let span = tracing::info_span!("sort", run_id = %run_id);
        let _enter = span.enter();

        info!(
            "开始整理: {:?} -> {:?} (mode={}, dry_run={})",
            self.spec.origin, self.spec.destination, self.spec.mode, self.dry_run
        );

        self.log_header(events);

        let mut files_found = 0;
        let mut processed = 0;
        let result = self.process(events, &mut files_found, &mut processed);

        let error = match result {
            Ok(()) => None,
            Err(e) => {
                error!("整理中止: {}", e);
                Self::log(events, format!("ERROR: An unexpected error occurred: {}", e));
                Some(e.to_string())
            }
        };

        Self::log(
            events,
            format!(
                "\n{} Processed {} files.",
                if self.dry_run {
                    "Dry run complete!"
                } else {
                    "Operation complete!"
                },
                processed
            ),
        );

        let end_time = chrono::Utc::now().timestamp();
        info!(
            "整理结束: 共 {} 个文件, 已处理 {} 个",
            files_found, processed
        );

        SortReport {
            run_id,
            dry_run: self.dry_run,
            mode: self.spec.mode,
            status: if error.is_none() {
                RunStatus::Completed
            } else {
                RunStatus::Failed
            },
            files_found,
            files_processed: processed,
            start_time,
            end_time,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            error,
        }
    }

    fn process(
        &self,
        events: Option<&mpsc::UnboundedSender<RunEvent>>,
        files_found: &mut usize,
        processed: &mut usize,
    ) -> Result<(), SortError> {
        let scanner = FileScanner::with_config(ScanConfig {
            include_extensions: self.spec.extensions.clone(),
            recursive: self.spec.recursive,
            exclude_dir: Some(self.spec.destination.clone()),
        });
        let outcome = scanner.scan(&self.spec.origin)?;

        for warning in outcome.warnings {
            Self::log(events, warning);
        }

        let total = outcome.files.len();
        *files_found = total;
        if total == 0 {
            Self::log(events, "No matching files found to process.".to_string());
            return Ok(());
        }

        let resolver = PathResolver::new(&self.spec);
        let executor = TransferExecutor::new(self.spec.mode, self.dry_run);

        for (index, candidate) in outcome.files.iter().enumerate() {
            let resolution = resolver.resolve(candidate);
            if let Some(warning) = &resolution.warning {
                Self::log(events, Self::date_warning(candidate, warning));
            }

            let result =
                executor.execute(candidate, &self.spec.destination, &resolution.segments)?;
            Self::log(events, result.log_line());

            *processed += 1;
            Self::send(events, RunEvent::Progress((index + 1) as f64 / total as f64));
        }

        Ok(())
    }

    fn log_header(&self, events: Option<&mpsc::UnboundedSender<RunEvent>>) {
        let title = if self.dry_run {
            "Dry Run".to_string()
        } else {
            format!("{} Operation", self.spec.mode)
        };
        Self::log(events, format!("--- Starting {} ---", title));
        Self::log(events, format!("Origin: {}", self.spec.origin.display()));
        Self::log(
            events,
            format!("Destination: {}", self.spec.destination.display()),
        );
        Self::log(events, format!("File types: {}", self.spec.extensions_label()));
        Self::log(events, format!("Structure: {}", self.spec.structure_label()));
        Self::log(
            events,
            format!(
                "Include subfolders: {}",
                if self.spec.recursive { "Yes" } else { "No" }
            ),
        );
        Self::log(events, "-".repeat(20));
    }

    fn date_warning(candidate: &Path, warning: &SortError) -> String {
        let file_name = candidate
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        warn!("无法读取文件日期: {:?} - {}", candidate, warning);
        match warning {
            SortError::MissingMetadata { source, .. } => {
                format!("Warning: Could not get date for {}: {}.", file_name, source)
            }
            other => format!("Warning: Could not get date for {}: {}.", file_name, other),
        }
    }

    fn log(events: Option<&mpsc::UnboundedSender<RunEvent>>, line: String) {
        debug!("{}", line);
        Self::send(events, RunEvent::Log(line));
    }

    /// 发送事件，接收端已关闭时静默丢弃
    fn send(events: Option<&mpsc::UnboundedSender<RunEvent>>, event: RunEvent) {
        if let Some(tx) = events {
            let _ = tx.send(event);
        }
    }
}
