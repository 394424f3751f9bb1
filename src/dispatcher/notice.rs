//! 服务器通知事件与资格过滤
//! 只有服务器来源（无 hostmask）、发往非频道目标、且带固定前缀的 NOTICE 才进入规则匹配

use once_cell::sync::Lazy;
use regex::Regex;

/// 服务器通知正文的固定前缀
pub const NOTICE_PREFIX: &str = "*** Notice -- ";

static NOTICE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^NOTICE (\S+) :(.*)$").unwrap());

/// 频道 / 频道身份前缀
const CHANNEL_PREFIXES: [char; 4] = ['#', '&', '@', '+'];

/// 一条入站通知（单次分发期间有效）
#[derive(Debug, Clone, Copy)]
pub struct NoticeEvent<'a> {
    /// 来源网络标签
    pub network_tag: &'a str,
    /// 当前连接的权威服务器地址
    pub server_address: &'a str,
    /// 通知来源标识（服务器名）
    pub source_identity: &'a str,
    /// 来源 hostmask；服务器通知为空
    pub hostmask: &'a str,
    /// 原始文本："NOTICE <target> :<body>"
    pub raw_text: &'a str,
}

impl<'a> NoticeEvent<'a> {
    /// 资格过滤并剥离前缀，返回可供规则匹配的正文
    pub fn notice_body(&self) -> Option<&'a str> {
        if !self.hostmask.is_empty() {
            return None;
        }
        let caps = NOTICE_RE.captures(self.raw_text)?;
        let target = caps.get(1)?.as_str();
        if target.starts_with(CHANNEL_PREFIXES) {
            return None;
        }
        let body = caps.get(2)?.as_str();
        body.strip_prefix(NOTICE_PREFIX)
    }
}

/// 构造一条合成服务器通知的原始文本（inject 使用）
pub fn synthesize_raw_notice(target: &str, text: &str) -> String {
    format!("NOTICE {} :{}{}", target, NOTICE_PREFIX, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event<'a>(raw: &'a str, hostmask: &'a str) -> NoticeEvent<'a> {
        NoticeEvent {
            network_tag: "EFNet",
            server_address: "irc.example.net",
            source_identity: "irc.example.net",
            hostmask,
            raw_text: raw,
        }
    }

    #[test]
    fn test_body_extracted() {
        let raw = "NOTICE me :*** Notice -- Received KILL message for baduser";
        assert_eq!(event(raw, "").notice_body(), Some("Received KILL message for baduser"));
    }

    #[test]
    fn test_ineligible_notices() {
        let raw = "NOTICE me :*** Notice -- hi";
        // 用户来源
        assert_eq!(event(raw, "user@host").notice_body(), None);
        // 频道目标
        for target in ["#chan", "&local", "@#ops", "+#voice"] {
            let raw = format!("NOTICE {} :*** Notice -- hi", target);
            assert_eq!(event(&raw, "").notice_body(), None);
        }
        // 缺少固定前缀
        assert_eq!(event("NOTICE me :*** Other -- hi", "").notice_body(), None);
        // 非 NOTICE
        assert_eq!(event("PRIVMSG me :*** Notice -- hi", "").notice_body(), None);
    }

    #[test]
    fn test_synthesize_round_trips_through_filter() {
        let raw = synthesize_raw_notice("me", "Link with x established");
        assert_eq!(event(&raw, "").notice_body(), Some("Link with x established"));
    }
}
