//! 规则数据模型定义
//! 规则加载后不可变；规则表按文件顺序保存，重载时整体替换

use std::fmt;
use once_cell::sync::Lazy;
use regex::Regex;

use super::level::MessageLevel;

/// 保留目标：当前活动窗口
pub const DEST_ACTIVE: &str = "active";
/// 保留目标：丢弃通知（消费但不投递）
pub const DEST_DEVNULL: &str = "devnull";

// 目标行开头的网络限定 "TAG: "
static SCOPE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([^\s:]+):(?:\s|$)").unwrap());

bitflags::bitflags! {
    /// 规则选项（头行中名称之后的关键字）
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RuleOptions: u8 {
        /// 将（改写后的）服务器名作为 $1 插入，捕获组顺延
        const SERVERNAME    = 1 << 0;
        /// 命中后继续匹配后续规则
        const CONTINUEMATCH = 1 << 1;
    }
}

impl RuleOptions {
    /// 解析选项字符串，返回识别出的选项和未识别的单词
    pub fn parse(text: &str) -> (Self, Vec<String>) {
        let mut options = RuleOptions::empty();
        let mut unknown = Vec::new();
        for word in text.split_whitespace() {
            match word {
                "SERVERNAME" => options |= RuleOptions::SERVERNAME,
                "CONTINUEMATCH" => options |= RuleOptions::CONTINUEMATCH,
                other => unknown.push(other.to_string()),
            }
        }
        (options, unknown)
    }

    /// 选项关键字列表（用于展示）
    pub fn keywords(self) -> Vec<&'static str> {
        let mut words = Vec::new();
        if self.contains(RuleOptions::SERVERNAME) {
            words.push("SERVERNAME");
        }
        if self.contains(RuleOptions::CONTINUEMATCH) {
            words.push("CONTINUEMATCH");
        }
        words
    }
}

/// 单条编译后的规则
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    /// 头行所在的源文件行号（从 1 开始）
    pub source_line: usize,
    /// 原始正则文本
    pub pattern: String,
    /// 锚定在正文开头的编译结果
    pub regex: Regex,
    pub format_template: String,
    /// 清理后的目标字符串（级别关键字已移除、空白已折叠）
    pub destinations: String,
    /// "TAG: " 网络限定
    pub scope: Option<String>,
    pub message_level: MessageLevel,
    pub options: RuleOptions,
}

impl Rule {
    /// 输出模板键："r_" + 规则名
    pub fn template_key(&self) -> String {
        format!("r_{}", self.name)
    }

    /// 从目标字符串中解析网络限定
    pub fn parse_scope(destinations: &str) -> Option<String> {
        SCOPE_RE
            .captures(destinations)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// 在正文开头匹配，返回捕获组（未参与匹配的组为空字符串）
    pub fn captures(&self, body: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(body)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect(),
        )
    }

    /// 网络限定检查：无限定或限定与当前网络（忽略大小写）一致
    pub fn applies_to_network(&self, network_tag: &str) -> bool {
        match &self.scope {
            Some(scope) => scope.eq_ignore_ascii_case(network_tag),
            None => true,
        }
    }

    /// 目标中含 devnull：终止性丢弃
    pub fn is_discard(&self) -> bool {
        self.destinations
            .split_whitespace()
            .any(|token| token == DEST_DEVNULL)
    }

    /// 实际投递目标（跳过以 ':' 结尾的网络限定残留）
    pub fn destination_tokens(&self) -> impl Iterator<Item = &str> {
        self.destinations
            .split(' ')
            .filter(|token| !token.is_empty() && !token.ends_with(':'))
    }

    pub fn has_option(&self, option: RuleOptions) -> bool {
        self.options.contains(option)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for word in self.options.keywords() {
            write!(f, " {}", word)?;
        }
        write!(f, ": {} -> {} [{}]", self.pattern, self.destinations, self.message_level)
    }
}

/// 有序规则表
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加载阶段追加规则（顺序即匹配顺序）
    pub(crate) fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 按名称查找第一条规则（名称不强制唯一）
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    /// 目标列表中包含指定窗口名的规则
    pub fn filter_by_destination<'a>(&'a self, window: &'a str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules
            .iter()
            .filter(move |rule| rule.destination_tokens().any(|token| token == window))
    }
}
