//! 子命令：解析为枚举后统一分发执行
//! 交互式工具，未知子命令只输出用法，不视为错误

use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::dispatcher::{DestinationResolver, NoticeEvent, NoticeRouter, synthesize_raw_notice};
use crate::host::NoticeHost;
use crate::rule::{RemoteRuleFetcher, DEST_ACTIVE, DEST_DEVNULL};

pub const USAGE: &str = "用法：rsnotice <list [window]|help|intro|create|inject <text>|update>";

const HELP: &str = "\
rsnotice 子命令：
  list [window]   列出规则（可按目标窗口过滤）
  help            显示本帮助
  intro           简介
  create          创建规则引用但尚不存在的目标窗口
  inject <text>   合成一条服务器通知并交给分发器
  update          重新下载规则文件并重载";

const INTRO: &str = "\
rsnotice 按规则文件中的有序规则匹配服务器通知（*** Notice -- ...），
改写为对应模板后投递到指定窗口。规则每条四行：
  name [SERVERNAME] [CONTINUEMATCH]
  <正则>
  <模板，$0 为网络标签，$1.. 为捕获组>
  [TAG: ]dest1 dest2 ... [MSG|HILIGHT|NONE]
目标 active 表示当前窗口，devnull 表示丢弃。";

/// 子命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List { window: Option<String> },
    Help,
    Intro,
    Create,
    Inject { text: String },
    Update,
    Unknown(String),
}

impl Command {
    /// 解析命令行文本（首个单词为子命令，其余为参数）
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let (name, rest) = match input.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (input, ""),
        };
        match name.to_ascii_lowercase().as_str() {
            "list" => Command::List {
                window: rest.split_whitespace().next().map(str::to_string),
            },
            "help" => Command::Help,
            "intro" => Command::Intro,
            "create" => Command::Create,
            "inject" => Command::Inject {
                text: rest.to_string(),
            },
            "update" => Command::Update,
            _ => Command::Unknown(input.to_string()),
        }
    }
}

/// 当前连接上下文（inject 合成通知时使用）
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub network_tag: String,
    pub server_address: String,
    pub nick: String,
}

/// 子命令执行器
pub struct CommandRunner<'a> {
    router: &'a NoticeRouter,
    session: &'a SessionContext,
}

impl<'a> CommandRunner<'a> {
    pub fn new(router: &'a NoticeRouter, session: &'a SessionContext) -> Self {
        Self { router, session }
    }

    /// 执行子命令，返回需要展示的文本行
    pub async fn execute<H: NoticeHost>(&self, command: Command, host: &mut H) -> Vec<String> {
        match command {
            Command::List { window } => self.list(window.as_deref()),
            Command::Help => HELP.lines().map(str::to_string).collect(),
            Command::Intro => INTRO.lines().map(str::to_string).collect(),
            Command::Create => self.create(host),
            Command::Inject { text } => self.inject(&text, host),
            Command::Update => self.update(host).await,
            Command::Unknown(input) => {
                if !input.is_empty() {
                    warn!("未知子命令：{}", input);
                }
                vec![USAGE.to_string()]
            }
        }
    }

    fn list(&self, window: Option<&str>) -> Vec<String> {
        let snapshot = self.router.snapshot();
        let lines: Vec<String> = match window {
            Some(window) => snapshot
                .table
                .filter_by_destination(window)
                .map(|rule| rule.to_string())
                .collect(),
            None => snapshot.table.iter().map(|rule| rule.to_string()).collect(),
        };
        if lines.is_empty() {
            return vec!["没有匹配的规则".to_string()];
        }
        lines
    }

    /// 需要创建的窗口名（去重、保持稳定顺序）
    pub fn required_sinks(&self) -> BTreeSet<String> {
        let snapshot = self.router.snapshot();
        let multinetwork = self.router.config().multinetwork;
        let mut names = BTreeSet::new();
        for rule in snapshot.table.iter() {
            if rule.is_discard() {
                continue;
            }
            for token in rule.destination_tokens() {
                if token == DEST_ACTIVE || token == DEST_DEVNULL {
                    continue;
                }
                let name = match (&rule.scope, multinetwork) {
                    (Some(scope), true) => DestinationResolver::network_sink_name(scope, token),
                    _ => token.to_string(),
                };
                names.insert(name);
            }
        }
        names
    }

    fn create<H: NoticeHost>(&self, host: &mut H) -> Vec<String> {
        let mut created = Vec::new();
        for name in self.required_sinks() {
            if host.find_sink(&name).is_none() {
                host.create_sink(&name);
                created.push(format!("已创建窗口：{}", name));
            }
        }
        if created.is_empty() {
            created.push("所有目标窗口均已存在".to_string());
        }
        created
    }

    fn inject<H: NoticeHost>(&self, text: &str, host: &mut H) -> Vec<String> {
        if text.is_empty() {
            return vec![USAGE.to_string()];
        }
        let raw = synthesize_raw_notice(&self.session.nick, text);
        let event = NoticeEvent {
            network_tag: &self.session.network_tag,
            server_address: &self.session.server_address,
            source_identity: &self.session.server_address,
            hostmask: "",
            raw_text: &raw,
        };
        let outcome = self.router.dispatch(&event, host);
        let status = if outcome.is_consumed() { "已消费" } else { "未消费" };
        vec![format!("注入通知：{}（{}）", text, status)]
    }

    async fn update<H: NoticeHost>(&self, host: &mut H) -> Vec<String> {
        let config = self.router.config();
        let mut lines = Vec::new();
        match RemoteRuleFetcher::download_to(&config).await {
            Ok(bytes) => {
                info!("规则文件已更新，{} 字节", bytes);
                lines.push(format!("已下载规则文件：{}（{} 字节）", config.rule_file_path.display(), bytes));
            }
            Err(e) => {
                warn!("规则文件下载失败：{}", e);
                lines.push(format!("下载失败：{}", e));
                return lines;
            }
        }
        match self.router.reload(host).await {
            Ok(summary) => {
                lines.extend(summary.errors.iter().map(|e| e.to_string()));
                lines.push(format!("已加载 {} 条规则", summary.processed));
            }
            Err(e) => lines.push(format!("重载失败：{}", e)),
        }
        lines
    }
}
