use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::DEFAULT_EXTENSIONS;

/// 配置校验错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("环境变量名不能为空: {0}")]
    EmptyVariable(&'static str),
    #[error("扩展名必须以 '.' 开头: {0:?}")]
    InvalidExtension(String),
}

/// 应用程序配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 查找相关配置
    pub search: SearchConfig,
    /// 显示相关配置
    pub display: DisplayConfig,
}

/// 查找配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// 搜索路径环境变量
    pub path_var: String,
    /// 提供额外根目录的环境变量（仅在 -p 时使用，递归搜索）
    pub extra_root_vars: Vec<String>,
    /// 提供额外扩展名的环境变量
    pub extensions_var: String,
    /// 内置的可执行文件扩展名
    pub default_extensions: Vec<String>,
    /// 总是递归搜索的目录
    pub extra_dirs: Vec<PathBuf>,
    /// 是否首先搜索程序自身所在目录
    pub include_exe_dir: bool,
}

/// 显示配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// 结束时打印完整的匹配结果
    pub print_summary: bool,
    /// 递归搜索时显示进度
    pub show_progress: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            path_var: "PATH".to_string(),
            extra_root_vars: vec![
                "ProgramFiles".to_string(),
                "ProgramFiles(x86)".to_string(),
            ],
            extensions_var: "PATHEXT".to_string(),
            default_extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            extra_dirs: vec![],
            include_exe_dir: true,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            print_summary: true,
            show_progress: true,
        }
    }
}

impl Config {
    /// 加载配置
    ///
    /// 指定了路径时文件必须存在；否则使用程序目录下的 config.toml，不存在时使用默认配置。
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => Self::load_from_file(path)?,
            None => match Self::default_config_path() {
                Ok(path) if path.exists() => Self::load_from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// 从配置文件加载配置，如果文件不存在则创建默认配置文件
    pub fn load_or_create(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            Self::load_from_file(config_path)
        } else {
            let config = Self::default();
            config.save_to_file(config_path)?;
            Ok(config)
        }
    }

    /// 从文件加载配置
    pub fn load_from_file(config_path: &Path) -> Result<Self> {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("无法读取配置文件: {}", config_path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", config_path.display()))?;

        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("无法创建配置目录: {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("无法序列化配置")?;

        fs::write(config_path, content)
            .with_context(|| format!("无法写入配置文件: {}", config_path.display()))?;

        Ok(())
    }

    /// 获取配置文件的默认路径
    pub fn default_config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("无法获取程序路径")?;

        let exe_dir = exe_path.parent().context("无法获取程序目录")?;

        Ok(exe_dir.join("config.toml"))
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.path_var.trim().is_empty() {
            return Err(ConfigError::EmptyVariable("path_var"));
        }

        if self.search.extensions_var.trim().is_empty() {
            return Err(ConfigError::EmptyVariable("extensions_var"));
        }

        if self.search.extra_root_vars.iter().any(|var| var.trim().is_empty()) {
            return Err(ConfigError::EmptyVariable("extra_root_vars"));
        }

        if let Some(ext) = self
            .search
            .default_extensions
            .iter()
            .find(|ext| !ext.starts_with('.'))
        {
            return Err(ConfigError::InvalidExtension(ext.clone()));
        }

        Ok(())
    }
}
