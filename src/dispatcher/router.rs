//! 可热重载的通知路由器
//! 规则表 + 模板注册表作为一个快照整体发布，分发期间只读；
//! 重载时构建新快照后原子替换，分发方要么看到旧快照，要么看到新快照

use std::sync::Arc;
use arc_swap::ArcSwap;
use tracing::{info, warn};

use super::dispatcher::{DispatchOptions, DispatchOutcome, NoticeDispatcher};
use super::notice::NoticeEvent;
use crate::config::GlobalConfig;
use crate::error::{RsnResult, RsnoticeError};
use crate::host::NoticeHost;
use crate::rule::{LoadReport, RuleLoader, RuleTable, TemplateRegistry};

/// 一代规则：规则表与对应的模板注册表
#[derive(Debug, Default)]
pub struct RuleSnapshot {
    pub table: RuleTable,
    pub templates: TemplateRegistry,
}

/// 重载结果摘要
#[derive(Debug)]
pub struct ReloadSummary {
    pub processed: usize,
    pub errors: Vec<RsnoticeError>,
}

/// 通知路由器
pub struct NoticeRouter {
    snapshot: ArcSwap<RuleSnapshot>,
    options: ArcSwap<DispatchOptions>,
    config: ArcSwap<GlobalConfig>,
}

impl NoticeRouter {
    /// 创建空规则表的路由器
    pub fn new(config: GlobalConfig) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(RuleSnapshot::default()),
            options: ArcSwap::from_pointee(DispatchOptions::from_config(&config)),
            config: ArcSwap::from_pointee(config),
        }
    }

    pub fn config(&self) -> Arc<GlobalConfig> {
        self.config.load_full()
    }

    /// 替换配置（多网络模式、改写正则等运行时标志立即生效；模板前缀在下次重载时生效）
    pub fn set_config(&self, config: GlobalConfig) {
        self.options.store(Arc::new(DispatchOptions::from_config(&config)));
        self.config.store(Arc::new(config));
    }

    /// 当前规则快照
    pub fn snapshot(&self) -> Arc<RuleSnapshot> {
        self.snapshot.load_full()
    }

    /// 从文本重载规则
    pub fn reload_from_str<H: NoticeHost>(&self, text: &str, host: &mut H) -> ReloadSummary {
        let report = RuleLoader::parse_str(text, &self.config());
        self.publish(report, host)
    }

    /// 从配置的规则文件重载；文件缺失时发布空规则表并返回错误
    pub async fn reload<H: NoticeHost>(&self, host: &mut H) -> RsnResult<ReloadSummary> {
        let config = self.config();
        match RuleLoader::load_file(&config.rule_file_path, &config).await {
            Ok(report) => Ok(self.publish(report, host)),
            Err(e) => {
                warn!("规则文件加载失败，使用空规则表：{}", e);
                self.publish(LoadReport::default(), host);
                Err(e)
            }
        }
    }

    fn publish<H: NoticeHost>(&self, report: LoadReport, host: &mut H) -> ReloadSummary {
        let LoadReport {
            table,
            templates,
            errors,
        } = report;
        let processed = table.len();
        host.register_templates(&templates);
        self.snapshot.store(Arc::new(RuleSnapshot { table, templates }));
        info!("规则表已替换，当前规则数：{}", processed);
        ReloadSummary { processed, errors }
    }

    /// 分发一条通知
    pub fn dispatch<H: NoticeHost>(&self, event: &NoticeEvent<'_>, host: &mut H) -> DispatchOutcome {
        let snapshot = self.snapshot.load();
        let options = self.options.load();
        NoticeDispatcher::dispatch(&snapshot.table, &options, event, host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use crate::dispatcher::notice::synthesize_raw_notice;
    use crate::host::MemoryHost;

    const RULES: &str = "kill\nReceived KILL message for (\\S+)\n$0 killed $1\nkill MSG\n";

    fn kill_event(raw: &str) -> NoticeEvent<'_> {
        NoticeEvent {
            network_tag: "EFNet",
            server_address: "irc.example.net",
            source_identity: "irc.example.net",
            hostmask: "",
            raw_text: raw,
        }
    }

    #[test]
    fn test_reload_replaces_table_and_templates() {
        let router = NoticeRouter::new(GlobalConfig::default());
        let mut host = MemoryHost::new("status").with_sinks(["kill"]);
        let summary = router.reload_from_str(RULES, &mut host);
        assert_eq!(summary.processed, 1);
        assert_eq!(host.template("r_kill"), Some("{line_start}$0 killed $1"));

        let raw = synthesize_raw_notice("me", "Received KILL message for baduser");
        assert!(router.dispatch(&kill_event(&raw), &mut host).is_consumed());
        assert_eq!(host.deliveries()[0].text, "EFNet killed baduser");

        // 重载不是叠加
        let summary = router.reload_from_str("other\nnothing\n$0\nx\n", &mut host);
        assert_eq!(summary.processed, 1);
        assert_eq!(router.snapshot().table.len(), 1);
        assert_eq!(host.template("r_kill"), None);
        assert!(!router.dispatch(&kill_event(&raw), &mut host).is_consumed());
    }

    #[test]
    fn test_old_snapshot_survives_reload() {
        let router = NoticeRouter::new(GlobalConfig::default());
        let mut host = MemoryHost::default();
        router.reload_from_str(RULES, &mut host);
        let held = router.snapshot();
        router.reload_from_str("", &mut host);
        assert_eq!(held.table.len(), 1);
        assert!(router.snapshot().table.is_empty());
    }

    #[test]
    fn test_set_config_switches_multinetwork() {
        let router = NoticeRouter::new(GlobalConfig::default());
        let mut host = MemoryHost::new("status").with_sinks(["kill", "efnet_kill"]);
        router.reload_from_str(RULES, &mut host);
        let raw = synthesize_raw_notice("me", "Received KILL message for x");

        router.dispatch(&kill_event(&raw), &mut host);
        router.set_config(ConfigManager::custom().multinetwork(true).build());
        router.dispatch(&kill_event(&raw), &mut host);

        let sinks: Vec<&str> = host.deliveries().iter().map(|d| d.sink.as_str()).collect();
        assert_eq!(sinks, vec!["kill", "efnet_kill"]);
    }

    #[tokio::test]
    async fn test_missing_file_publishes_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let router = NoticeRouter::new(GlobalConfig::default());
        let mut host = MemoryHost::default();
        router.reload_from_str(RULES, &mut host);

        router.set_config(
            ConfigManager::custom()
                .rule_file_path(dir.path().join("missing.rules"))
                .build(),
        );
        let err = router.reload(&mut host).await.unwrap_err();
        assert!(matches!(err, RsnoticeError::RuleFileMissing(_)));
        assert!(router.snapshot().table.is_empty());

        let raw = synthesize_raw_notice("me", "Received KILL message for x");
        assert!(!router.dispatch(&kill_event(&raw), &mut host).is_consumed());
    }
}
