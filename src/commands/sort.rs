//! 整理命令：校验请求、在工作线程上运行引擎并转发运行事件

use crate::cli::SortArgs;
use crate::config::AppSettings;
use crate::core::file_types;
use crate::core::models::{OperationMode, RunEvent, SortReport, SortSpec, Structure};
use crate::core::resolver::unknown_tokens;
use crate::core::SortEngine;
use crate::error::{SortError, SortResult};
use crate::AppState;
use std::sync::atomic::Ordering;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// 校验通过的请求
#[derive(Debug)]
pub struct SortRequest {
    pub spec: SortSpec,
    pub dry_run: bool,
    /// 非致命提示，例如模板中的未知占位符
    pub warnings: Vec<String>,
}

/// 把命令行参数和保存的默认值合成一次运行的配置，并做运行前检查
pub fn build_request(args: &SortArgs, settings: &AppSettings) -> SortResult<SortRequest> {
    let mut extensions =
        file_types::parse_list(args.types.as_deref().unwrap_or(&settings.file_types));
    for preset in &args.presets {
        let types = file_types::category(preset).ok_or_else(|| {
            SortError::Invalid(format!("Unknown file type category: {}", preset))
        })?;
        extensions.extend(types.iter().map(|t| t.to_string()));
    }

    if args.origin.as_os_str().is_empty()
        || args.destination.as_os_str().is_empty()
        || extensions.is_empty()
    {
        return Err(SortError::Invalid(
            "Please select origin, destination, and at least one file type.".to_string(),
        ));
    }
    if !args.origin.is_dir() {
        return Err(SortError::Invalid("Origin folder does not exist.".to_string()));
    }

    let topic = args
        .topic
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    let template = args
        .template
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let needs_topic = match args.structure {
        Structure::Custom => template.is_some_and(|t| t.contains("{topic}")),
        structure => structure.uses_topic(),
    };
    if needs_topic && topic.is_none() {
        return Err(SortError::Invalid(
            "Please enter a Topic Name for this structure.".to_string(),
        ));
    }
    if args.structure == Structure::Custom && template.is_none() {
        return Err(SortError::Invalid(
            "Please enter a Custom Structure pattern.".to_string(),
        ));
    }

    let warnings = template
        .filter(|_| args.structure == Structure::Custom)
        .map(unknown_tokens)
        .unwrap_or_default()
        .into_iter()
        .map(|token| format!("Warning: Unknown template token {{{}}} is kept as-is.", token))
        .collect();

    let mode = if args.copy {
        OperationMode::Copy
    } else if args.move_files {
        OperationMode::Move
    } else {
        settings.default_operation
    };
    let recursive = if args.recursive {
        true
    } else if args.no_recursive {
        false
    } else {
        settings.default_subfolders
    };

    let mut spec = SortSpec::new(&args.origin, &args.destination)
        .with_extensions(extensions)
        .with_structure(args.structure)
        .with_mode(mode)
        .with_recursive(recursive)
        .with_date_source(args.date_source);
    if let Some(topic) = topic {
        spec = spec.with_topic(topic);
    }
    if let Some(template) = template {
        spec = spec.with_template(template);
    }

    Ok(SortRequest {
        spec,
        dry_run: args.dry_run,
        warnings,
    })
}

/// 运行整理任务
///
/// 引擎在阻塞线程上顺序处理所有文件，事件按顺序交给 `on_event`。
/// 同一 `AppState` 上同时只能有一个运行。
pub async fn run_sort<F>(
    state: &AppState,
    request: SortRequest,
    mut on_event: F,
) -> SortResult<SortReport>
where
    F: FnMut(RunEvent),
{
    if state.running.swap(true, Ordering::SeqCst) {
        return Err(SortError::AlreadyRunning);
    }
    let running = state.running.clone();
    scopeguard::defer! {
        running.store(false, Ordering::SeqCst);
    }

    for warning in &request.warnings {
        warn!("{}", warning);
        on_event(RunEvent::Log(warning.clone()));
    }

    let engine = SortEngine::new(request.spec, request.dry_run);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let worker = tokio::task::spawn_blocking(move || engine.run(Some(&tx)));

    // 发送端随工作线程结束而关闭
    while let Some(event) = rx.recv().await {
        on_event(event);
    }

    let report = worker.await.map_err(|e| {
        SortError::io(
            "sort worker stopped unexpectedly",
            std::io::Error::other(e.to_string()),
        )
    })?;

    info!(
        "运行 {} 结束: 状态 {:?}, 处理 {} 个文件",
        report.run_id, report.status, report.files_processed
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{DateSource, RunStatus};
    use std::fs;
    use std::path::Path;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    fn args(origin: &Path, dest: &Path) -> SortArgs {
        SortArgs {
            origin: origin.to_path_buf(),
            destination: dest.to_path_buf(),
            types: Some("txt".to_string()),
            presets: vec![],
            structure: Structure::FileType,
            topic: None,
            template: None,
            copy: false,
            move_files: false,
            recursive: false,
            no_recursive: false,
            dry_run: false,
            date_source: DateSource::Created,
            json: false,
            progress: false,
        }
    }

    fn state(dir: &Path) -> AppState {
        AppState {
            config_dir: dir.join("config"),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    #[test]
    fn test_defaults_come_from_settings() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args(dir.path(), &dir.path().join("out"));
        a.types = None;
        let settings = AppSettings {
            default_operation: OperationMode::Copy,
            default_subfolders: false,
            file_types: "mp3, wav".to_string(),
        };
        let request = build_request(&a, &settings).unwrap();
        assert_eq!(request.spec.mode, OperationMode::Copy);
        assert!(!request.spec.recursive);
        assert_eq!(request.spec.extensions_label(), "mp3, wav");

        a.move_files = true;
        a.recursive = true;
        let request = build_request(&a, &settings).unwrap();
        assert_eq!(request.spec.mode, OperationMode::Move);
        assert!(request.spec.recursive);
    }

    #[test]
    fn test_presets_extend_types() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args(dir.path(), &dir.path().join("out"));
        a.presets = vec!["Audio".to_string()];
        let request = build_request(&a, &AppSettings::default()).unwrap();
        assert!(request.spec.extensions.contains("txt"));
        assert!(request.spec.extensions.contains("flac"));

        a.presets = vec!["fonts".to_string()];
        assert!(build_request(&a, &AppSettings::default()).is_err());
    }

    #[test]
    fn test_validation_messages() {
        let dir = tempfile::tempdir().unwrap();
        let settings = AppSettings::default();

        let mut a = args(&dir.path().join("missing"), &dir.path().join("out"));
        let err = build_request(&a, &settings).unwrap_err();
        assert_eq!(err.to_string(), "Origin folder does not exist.");

        a.origin = dir.path().to_path_buf();
        a.types = Some(" , ".to_string());
        let err = build_request(&a, &settings).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please select origin, destination, and at least one file type."
        );

        a.types = Some("txt".to_string());
        a.structure = Structure::TopicYearMonth;
        a.topic = Some("  ".to_string());
        let err = build_request(&a, &settings).unwrap_err();
        assert_eq!(err.to_string(), "Please enter a Topic Name for this structure.");

        a.structure = Structure::Custom;
        a.topic = None;
        let err = build_request(&a, &settings).unwrap_err();
        assert_eq!(err.to_string(), "Please enter a Custom Structure pattern.");

        a.template = Some("{topic}/{year}".to_string());
        assert!(build_request(&a, &settings).is_err());

        a.template = Some("{type}/{author}".to_string());
        let request = build_request(&a, &settings).unwrap();
        assert_eq!(
            request.warnings,
            vec!["Warning: Unknown template token {author} is kept as-is."]
        );
    }

    #[tokio::test]
    async fn test_run_sort_streams_events() {
        let dir = tempfile::tempdir().unwrap();
        let origin = dir.path().join("in");
        fs::create_dir_all(&origin).unwrap();
        fs::write(origin.join("a.txt"), b"a").unwrap();
        fs::write(origin.join("b.txt"), b"b").unwrap();
        let dest = dir.path().join("out");

        let state = state(dir.path());
        let request = build_request(&args(&origin, &dest), &AppSettings::default()).unwrap();

        let mut lines = Vec::new();
        let mut progress = Vec::new();
        let report = run_sort(&state, request, |event| match event {
            RunEvent::Log(line) => lines.push(line),
            RunEvent::Progress(p) => progress.push(p),
        })
        .await
        .unwrap();

        assert_eq!(report.status, RunStatus::Completed);
        assert_eq!(report.files_processed, 2);
        assert_eq!(progress, vec![0.5, 1.0]);
        assert!(lines.iter().any(|l| l.starts_with("Moved: a.txt -> ")));
        assert!(dest.join("txt/b.txt").exists());
        assert!(!state.running.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_concurrent_run_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());
        state.running.store(true, Ordering::SeqCst);

        let request =
            build_request(&args(dir.path(), &dir.path().join("out")), &AppSettings::default())
                .unwrap();
        let err = run_sort(&state, request, |_| {}).await.unwrap_err();
        assert!(matches!(err, SortError::AlreadyRunning));
        // 被拒绝的请求不能释放正在运行的任务的标志
        assert!(state.running.load(Ordering::SeqCst));
    }
}
