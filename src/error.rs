//! 全局错误类型定义

use thiserror::Error;
use regex::Error as RegexError;
use std::io::Error as IoError;
use std::path::PathBuf;
use url::ParseError as UrlParseError;

#[derive(Error, Debug)]
pub enum RsnoticeError {
    // 规则定义错误（单条记录级别，可恢复）
    #[error("规则解析失败（第{line}行）：{message}")]
    RuleParseError { line: usize, message: String },
    #[error("正则编译失败（第{line}行）：{source}")]
    RegexCompileError {
        line: usize,
        #[source]
        source: RegexError,
    },

    // 资源错误
    #[error("规则文件不存在：{}", .0.display())]
    RuleFileMissing(PathBuf),
    #[error("规则加载失败：{0}")]
    RuleLoadError(String),

    // 网络相关错误（数据文件下载）
    #[error("网络请求失败：{0}")]
    HttpError(#[from] reqwest::Error),
    #[error("拒绝非安全传输的数据源：{0}")]
    InsecureSource(String),

    // 配置错误
    #[error("配置无效：{0}")]
    InvalidConfig(String),

    // 基础错误
    #[error("IO操作失败：{0}")]
    IoError(#[from] IoError),
    #[error("URL解析失败：{0}")]
    UrlError(#[from] UrlParseError),
    #[error("无效输入：{0}")]
    InvalidInput(String),
}

impl RsnoticeError {
    /// 规则定义错误对应的源文件行号（其他错误返回 None）
    pub fn line(&self) -> Option<usize> {
        match self {
            RsnoticeError::RuleParseError { line, .. } => Some(*line),
            RsnoticeError::RegexCompileError { line, .. } => Some(*line),
            _ => None,
        }
    }
}

// 全局Result类型
pub type RsnResult<T> = Result<T, RsnoticeError>;
