//! 全局配置管理,存储所有可配置项
//! 同时提供宿主设置表（key → 效果）的读写入口

use std::path::PathBuf;

use crate::error::{RsnResult, RsnoticeError};

/// 默认规则数据文件下载地址
pub const DEFAULT_DATAFILE_URL: &str =
    "https://raw.githubusercontent.com/FlyfishSec/rsnotice/refs/heads/master/rsnotice.rules";

/// 全局配置
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    // 规则文件路径
    pub rule_file_path: PathBuf,
    // 多网络模式：目标窗口优先解析为 tag_dest
    pub multinetwork: bool,
    // 保留模板开头的 "[$0] "
    pub prepend_source_tag: bool,
    // 规则文件缺失时的下载地址（仅允许 https）
    pub datafile_url: String,
    // SERVERNAME 选项使用的服务器名改写正则（取第一个捕获组）
    pub servername_rewrite: Option<String>,
    // 超时配置（单位：秒）
    pub http_timeout: u64,
    // 是否启用详细日志
    pub verbose: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            rule_file_path: PathBuf::from("rsnotice.rules"),
            multinetwork: false,
            prepend_source_tag: false,
            datafile_url: DEFAULT_DATAFILE_URL.to_string(),
            servername_rewrite: None,
            http_timeout: 30,
            verbose: false,
        }
    }
}

impl GlobalConfig {
    /// 按宿主设置名写入配置值
    ///
    /// 支持的键：`multinetwork`、`prepend_source_tag`、`datafile_url`、
    /// `servername_rewrite`、`rule_file`、`http_timeout`。
    /// `servername_rewrite` 置空字符串表示关闭改写。
    pub fn apply_setting(&mut self, key: &str, value: &str) -> RsnResult<()> {
        match key {
            "multinetwork" => self.multinetwork = parse_bool(key, value)?,
            "prepend_source_tag" => self.prepend_source_tag = parse_bool(key, value)?,
            "datafile_url" => self.datafile_url = value.trim().to_string(),
            "servername_rewrite" => {
                let value = value.trim();
                self.servername_rewrite = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "rule_file" => self.rule_file_path = PathBuf::from(value.trim()),
            "http_timeout" => {
                self.http_timeout = value.trim().parse().map_err(|_| {
                    RsnoticeError::InvalidConfig(format!("{} 需要整数秒数，实际为 {:?}", key, value))
                })?;
            }
            _ => {
                return Err(RsnoticeError::InvalidConfig(format!("未知配置项：{}", key)));
            }
        }
        Ok(())
    }

    /// 按宿主设置名读取配置值（字符串形式）
    pub fn setting(&self, key: &str) -> Option<String> {
        let value = match key {
            "multinetwork" => bool_str(self.multinetwork).to_string(),
            "prepend_source_tag" => bool_str(self.prepend_source_tag).to_string(),
            "datafile_url" => self.datafile_url.clone(),
            "servername_rewrite" => self.servername_rewrite.clone().unwrap_or_default(),
            "rule_file" => self.rule_file_path.display().to_string(),
            "http_timeout" => self.http_timeout.to_string(),
            _ => return None,
        };
        Some(value)
    }
}

fn parse_bool(key: &str, value: &str) -> RsnResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(RsnoticeError::InvalidConfig(format!(
            "{} 需要布尔值，实际为 {:?}",
            key, other
        ))),
    }
}

fn bool_str(value: bool) -> &'static str {
    if value { "ON" } else { "OFF" }
}

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> GlobalConfig {
        GlobalConfig::default()
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: GlobalConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.rule_file_path = path.into();
        self
    }

    pub fn multinetwork(mut self, enabled: bool) -> Self {
        self.config.multinetwork = enabled;
        self
    }

    pub fn prepend_source_tag(mut self, enabled: bool) -> Self {
        self.config.prepend_source_tag = enabled;
        self
    }

    pub fn datafile_url(mut self, url: impl Into<String>) -> Self {
        self.config.datafile_url = url.into();
        self
    }

    pub fn servername_rewrite(mut self, pattern: impl Into<String>) -> Self {
        self.config.servername_rewrite = Some(pattern.into());
        self
    }

    pub fn http_timeout(mut self, timeout: u64) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    pub fn build(self) -> GlobalConfig {
        self.config
    }
}
