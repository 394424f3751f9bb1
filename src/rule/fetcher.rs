//! 规则数据文件远程拉取
//! 仅在用户显式触发时使用（update / 缺失规则文件的引导下载），绝不进入通知分发路径

use std::time::Duration;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::config::GlobalConfig;
use crate::error::{RsnResult, RsnoticeError};

/// 远程规则拉取器
pub struct RemoteRuleFetcher;

impl RemoteRuleFetcher {
    /// 校验数据源地址，仅允许 https
    pub fn validate_source(raw_url: &str) -> RsnResult<Url> {
        let url = Url::parse(raw_url)?;
        if url.scheme() != "https" {
            return Err(RsnoticeError::InsecureSource(raw_url.to_string()));
        }
        Ok(url)
    }

    /// 拉取规则文件文本
    pub async fn fetch(config: &GlobalConfig) -> RsnResult<String> {
        let url = Self::validate_source(&config.datafile_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout))
            .build()?;

        debug!("开始拉取规则文件，URL：{}", url);
        let response = client
            .get(url.clone())
            .header("User-Agent", concat!("rsnotice/", env!("CARGO_PKG_VERSION")))
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("拉取规则文件失败，URL {} 返回状态码 {}", url, response.status());
            return Err(RsnoticeError::RuleLoadError(format!(
                "URL {} 返回状态码 {}",
                url,
                response.status()
            )));
        }

        let text = response.text().await?;
        debug!("规则文件拉取成功，{} 字节", text.len());
        Ok(text)
    }

    /// 拉取并写入配置的规则文件路径
    pub async fn download_to(config: &GlobalConfig) -> RsnResult<usize> {
        let text = Self::fetch(config).await?;
        tokio::fs::write(&config.rule_file_path, text.as_bytes()).await?;
        debug!("规则文件已写入：{}", config.rule_file_path.display());
        Ok(text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;

    #[test]
    fn test_only_https_accepted() {
        assert!(RemoteRuleFetcher::validate_source("https://example.org/rules").is_ok());
        assert!(matches!(
            RemoteRuleFetcher::validate_source("http://example.org/rules"),
            Err(RsnoticeError::InsecureSource(_))
        ));
        assert!(matches!(
            RemoteRuleFetcher::validate_source("not a url"),
            Err(RsnoticeError::UrlError(_))
        ));
    }

    #[tokio::test]
    async fn test_insecure_source_rejected_before_request() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("rsnotice.rules");
        let config = ConfigManager::custom()
            .datafile_url("ftp://example.org/rsnotice.rules")
            .rule_file_path(&target)
            .build();
        let err = RemoteRuleFetcher::download_to(&config).await.unwrap_err();
        assert!(matches!(err, RsnoticeError::InsecureSource(_)));
        assert!(!target.exists());
    }
}
