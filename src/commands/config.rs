//! 配置相关命令

use crate::cli::ConfigSetArgs;
use crate::config::AppSettings;
use crate::core::file_types;
use crate::logging::LogConfig;
use crate::AppState;
use anyhow::{bail, Context};
use serde::Serialize;
use tracing::info;

/// `config show` 输出的完整配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveConfig {
    #[serde(flatten)]
    pub settings: AppSettings,
    pub log: LogConfig,
}

/// 获取当前生效的配置
pub fn get_config(state: &AppState) -> EffectiveConfig {
    EffectiveConfig {
        settings: AppSettings::load(&state.config_dir),
        log: LogConfig::load(&state.config_dir),
    }
}

/// 修改并保存配置，只写入给出的字段
pub fn set_config(state: &AppState, args: &ConfigSetArgs) -> anyhow::Result<EffectiveConfig> {
    let mut settings = AppSettings::load(&state.config_dir);
    let mut log = LogConfig::load(&state.config_dir);

    if let Some(mode) = args.default_operation {
        settings.default_operation = mode;
    }
    if let Some(subfolders) = args.default_subfolders {
        settings.default_subfolders = subfolders;
    }
    if let Some(list) = &args.file_types {
        let types = file_types::parse_list(list);
        if types.is_empty() {
            bail!("file type list is empty");
        }
        settings.file_types = types.into_iter().collect::<Vec<_>>().join(", ");
    }

    if let Some(enabled) = args.log_enabled {
        log.enabled = enabled;
    }
    if let Some(size) = args.log_max_size_mb {
        log.set_max_size_mb(size);
    }
    if let Some(level) = &args.log_level {
        log.set_level(level).map_err(anyhow::Error::msg)?;
    }

    settings
        .save(&state.config_dir)
        .context("failed to save settings")?;
    log.save(&state.config_dir)
        .context("failed to save log config")?;
    info!("配置已保存: {:?}", state.config_dir);

    Ok(EffectiveConfig { settings, log })
}
