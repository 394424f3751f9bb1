//! 目标解析
//! 目标名 + 运行时上下文 → 宿主窗口；找不到时回落到默认窗口，从不报错

use crate::host::NoticeHost;
use crate::rule::DEST_ACTIVE;

/// 目标解析工具类
pub struct DestinationResolver;

impl DestinationResolver {
    /// 解析目标窗口
    ///
    /// - `active`：当前活动窗口
    /// - 多网络模式：优先 `lowercase(tag)_token`，其次 `token`
    /// - 其他：按名称查找 `token`
    /// - 均未找到：默认窗口
    ///
    /// `devnull` 由分发器提前处理，不会到达这里。
    pub fn resolve<H: NoticeHost>(
        host: &H,
        token: &str,
        network_tag: &str,
        multinetwork: bool,
    ) -> H::Sink {
        if token == DEST_ACTIVE {
            return host.active_sink();
        }

        let found = if multinetwork {
            let scoped = Self::network_sink_name(network_tag, token);
            host.find_sink(&scoped).or_else(|| host.find_sink(token))
        } else {
            host.find_sink(token)
        };

        found.unwrap_or_else(|| host.default_sink())
    }

    /// 多网络模式下的窗口名
    pub fn network_sink_name(network_tag: &str, token: &str) -> String {
        format!("{}_{}", network_tag.to_lowercase(), token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;

    #[test]
    fn test_active_always_focused() {
        let mut host = MemoryHost::new("status").with_sinks(["active_like"]);
        host.set_active("opers");
        assert_eq!(DestinationResolver::resolve(&host, "active", "Net1", true), "opers");
        assert_eq!(DestinationResolver::resolve(&host, "active", "Net1", false), "opers");
    }

    #[test]
    fn test_multinetwork_prefers_tagged_sink() {
        let host = MemoryHost::new("status").with_sinks(["foo", "net1_foo"]);
        assert_eq!(DestinationResolver::resolve(&host, "foo", "Net1", true), "net1_foo");
        assert_eq!(DestinationResolver::resolve(&host, "foo", "Net1", false), "foo");
        // 无 tag 窗口时退回普通名称
        assert_eq!(DestinationResolver::resolve(&host, "foo", "Net2", true), "foo");
    }

    #[test]
    fn test_missing_sink_falls_back_to_default() {
        let host = MemoryHost::new("status");
        assert_eq!(DestinationResolver::resolve(&host, "kill", "Net1", false), "status");
        assert_eq!(DestinationResolver::resolve(&host, "kill", "Net1", true), "status");
    }
}
