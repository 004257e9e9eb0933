use crate::rtree::hilbert::MAX_ORDER;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Hilbert 曲线的最小分辨率（阶数），配置值低于它时被抬高
pub const MIN_HILBERT_ORDER: u32 = 8;

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Max entries must be at least 2, got {0}")]
    InvalidMaxEntries(usize),
    #[error("Min entries must be between 1 and {max} / 2, got {min}")]
    InvalidMinEntries { min: usize, max: usize },
    #[error("Hilbert order must be at most 32, got {0}")]
    InvalidHilbertOrder(u32),
    #[error("Invalid log level: '{0}'. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
    #[error("Invalid log output: '{0}'. Must be one of: stdout, file")]
    InvalidLogOutput(String),
    #[error("Log output is 'file' but log_file path is not specified")]
    MissingLogFile,
    #[error("Failed to load config: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

/// hrtree 配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HrtreeConfig {
    /// 树参数
    #[serde(default)]
    pub tree: TreeConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 树参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// 每个节点的最大条目数
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// 分裂后每个节点的最小条目数
    #[serde(default = "default_min_entries")]
    pub min_entries: usize,

    /// Hilbert 曲线阶数
    #[serde(default = "default_hilbert_order")]
    pub hilbert_order: u32,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别：trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 日志输出：stdout, file
    #[serde(default = "default_log_output")]
    pub output: String,

    /// 日志文件路径（当 output = file 时）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

// ============================================================================
// 默认值函数
// ============================================================================

fn default_max_entries() -> usize {
    4
}

fn default_min_entries() -> usize {
    1
}

fn default_hilbert_order() -> u32 {
    32
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_output() -> String {
    "stdout".to_string()
}

// ============================================================================
// 实现
// ============================================================================

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            min_entries: default_min_entries(),
            hilbert_order: default_hilbert_order(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            output: default_log_output(),
            log_file: None,
        }
    }
}

impl TreeConfig {
    /// 验证树参数
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_entries < 2 {
            return Err(ConfigError::InvalidMaxEntries(self.max_entries));
        }
        if self.min_entries < 1 || self.min_entries * 2 > self.max_entries {
            return Err(ConfigError::InvalidMinEntries {
                min: self.min_entries,
                max: self.max_entries,
            });
        }
        if self.hilbert_order > MAX_ORDER {
            return Err(ConfigError::InvalidHilbertOrder(self.hilbert_order));
        }
        Ok(())
    }

    /// 实际使用的曲线阶数，不低于 [`MIN_HILBERT_ORDER`]
    pub fn effective_hilbert_order(&self) -> u32 {
        self.hilbert_order.clamp(MIN_HILBERT_ORDER, MAX_ORDER)
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.level_filter()?;
        match self.output.as_str() {
            "stdout" => Ok(()),
            "file" if self.log_file.is_none() => Err(ConfigError::MissingLogFile),
            "file" => Ok(()),
            other => Err(ConfigError::InvalidLogOutput(other.to_string())),
        }
    }

    fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        match self.level.to_lowercase().as_str() {
            "trace" => Ok(LevelFilter::TRACE),
            "debug" => Ok(LevelFilter::DEBUG),
            "info" => Ok(LevelFilter::INFO),
            "warn" => Ok(LevelFilter::WARN),
            "error" => Ok(LevelFilter::ERROR),
            _ => Err(ConfigError::InvalidLogLevel(self.level.clone())),
        }
    }

    /// 初始化全局日志订阅者
    ///
    /// 输出到标准输出或以追加模式写入日志文件；全局订阅者已存在时返回错误
    pub fn init_logging(&self) -> Result<(), ConfigError> {
        self.validate()?;
        let filter = self.level_filter()?;

        let result = match (self.output.as_str(), &self.log_file) {
            ("file", Some(log_file)) => {
                // 确保日志目录存在
                if let Some(parent) = log_file.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(log_file)?;

                tracing_subscriber::registry()
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(std::sync::Mutex::new(file))
                            .with_ansi(false)
                            .with_target(false),
                    )
                    .with(filter)
                    .try_init()
            }
            _ => tracing_subscriber::registry()
                .with(tracing_subscriber::fmt::layer().with_target(false))
                .with(filter)
                .try_init(),
        };

        result.map_err(|e| ConfigError::Logging(e.to_string()))
    }
}

impl HrtreeConfig {
    /// 从文件加载配置
    ///
    /// 配置加载顺序（优先级从低到高）：
    /// 1. 默认配置（内嵌的 default.toml）
    /// 2. 用户配置文件（可选）
    /// 3. 环境变量（HRTREE__ 前缀，使用双下划线分隔嵌套）
    ///
    /// # 示例
    ///
    /// ```no_run
    /// use hrtree::config::HrtreeConfig;
    ///
    /// let config = HrtreeConfig::from_file("hrtree.toml").unwrap();
    /// ```
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("default.toml"),
                config::FileFormat::Toml,
            ))
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("HRTREE").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// 保存配置到文件
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    /// 验证配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tree.validate()?;
        self.logging.validate()
    }

    /// 输出配置摘要
    pub fn log_summary(&self) {
        info!(
            max_entries = self.tree.max_entries,
            min_entries = self.tree.min_entries,
            hilbert_order = self.tree.effective_hilbert_order(),
            log_level = %self.logging.level,
            log_output = %self.logging.output,
            "hrtree configuration"
        );
    }
}
