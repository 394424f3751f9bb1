//! 通知分发器核心：按规则表顺序匹配、提取、改写并投递
use regex::Regex;
use tracing::{debug, warn};

use super::notice::NoticeEvent;
use super::resolver::DestinationResolver;
use crate::config::GlobalConfig;
use crate::host::NoticeHost;
use crate::rule::{Rule, RuleOptions, RuleTable};

/// 分发结果：是否消费了该通知（消费后宿主不再做默认处理）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Consumed,
    NotConsumed,
}

impl DispatchOutcome {
    pub fn is_consumed(self) -> bool {
        matches!(self, DispatchOutcome::Consumed)
    }
}

/// 分发运行时选项（由配置编译而来）
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    pub multinetwork: bool,
    /// 服务器名改写正则（取第一个捕获组）
    pub servername_rewrite: Option<Regex>,
}

impl DispatchOptions {
    /// 从配置构建；改写正则无效时记录警告并视为未配置
    pub fn from_config(config: &GlobalConfig) -> Self {
        let servername_rewrite = config.servername_rewrite.as_deref().and_then(|pattern| {
            Regex::new(pattern)
                .map_err(|e| warn!("服务器名改写正则无效，已忽略：{}", e))
                .ok()
        });
        Self {
            multinetwork: config.multinetwork,
            servername_rewrite,
        }
    }

    /// 改写来源标识；不匹配或无捕获组时原样返回
    pub fn rewrite_identity<'a>(&self, identity: &'a str) -> &'a str {
        self.servername_rewrite
            .as_ref()
            .and_then(|re| re.captures(identity))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .unwrap_or(identity)
    }
}

/// 通知分发器
pub struct NoticeDispatcher;

impl NoticeDispatcher {
    /// 分发一条通知
    pub fn dispatch<H: NoticeHost>(
        table: &RuleTable,
        options: &DispatchOptions,
        event: &NoticeEvent<'_>,
        host: &mut H,
    ) -> DispatchOutcome {
        let Some(body) = event.notice_body() else {
            return DispatchOutcome::NotConsumed;
        };

        let mut outcome = DispatchOutcome::NotConsumed;
        for rule in table.iter() {
            let Some(mut vars) = rule.captures(body) else {
                continue;
            };

            // 限定到其他网络的规则不生效，也不消费
            if !rule.applies_to_network(event.network_tag) {
                continue;
            }

            if rule.is_discard() {
                debug!("规则 [{}] 丢弃通知", rule.name);
                return DispatchOutcome::Consumed;
            }

            if rule.has_option(RuleOptions::SERVERNAME) {
                let identity = options.rewrite_identity(event.source_identity);
                vars.insert(0, identity.to_string());
            } else if event.source_identity != event.server_address {
                continue;
            }

            Self::deliver(rule, vars, options, event, host);
            outcome = DispatchOutcome::Consumed;

            if !rule.has_option(RuleOptions::CONTINUEMATCH) {
                break;
            }
        }
        outcome
    }

    /// 向规则的每个目标投递
    fn deliver<H: NoticeHost>(
        rule: &Rule,
        vars: Vec<String>,
        options: &DispatchOptions,
        event: &NoticeEvent<'_>,
        host: &mut H,
    ) {
        let mut args = Vec::with_capacity(vars.len() + 1);
        args.push(event.network_tag.to_string());
        args.extend(vars);

        let template_key = rule.template_key();
        let level = rule.message_level.host_level();
        for token in rule.destination_tokens() {
            if !rule.applies_to_network(event.network_tag) {
                continue;
            }
            let sink =
                DestinationResolver::resolve(host, token, event.network_tag, options.multinetwork);
            debug!("规则 [{}] 投递到 {:?}", rule.name, sink);
            host.render(&sink, &template_key, &args, level);
        }
    }
}
