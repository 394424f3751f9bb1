//! rsnotice 命令行入口
//! 以内存宿主运行路由器：执行子命令，或从标准输入逐行路由原始通知
//!
//! 运行命令：
//! cargo run -- --rules rsnotice.rules inject "Received KILL message for baduser"

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use rsnotice::{
    Command, CommandRunner, ConfigManager, MemoryHost, NoticeEvent, NoticeRouter, RsnoticeError,
    SessionContext,
};

#[derive(Debug, Parser)]
#[command(name = "rsnotice", version, about = "IRC 服务器通知规则路由工具")]
#[command(disable_help_subcommand = true)]
struct Cli {
    /// 规则文件路径
    #[arg(long, default_value = "rsnotice.rules")]
    rules: PathBuf,
    /// 当前网络标签
    #[arg(long, default_value = "IRC")]
    network: String,
    /// 当前连接的服务器地址
    #[arg(long, default_value = "localhost")]
    server: String,
    /// 自己的昵称（合成通知的目标）
    #[arg(long, default_value = "me")]
    nick: String,
    /// 多网络模式
    #[arg(long)]
    multinetwork: bool,
    /// 保留模板开头的 "[$0] "
    #[arg(long)]
    prepend_tag: bool,
    /// SERVERNAME 选项使用的服务器名改写正则
    #[arg(long)]
    servername_rewrite: Option<String>,
    /// 规则文件下载地址（仅 https）
    #[arg(long)]
    datafile_url: Option<String>,
    /// 下载超时（秒）
    #[arg(long, default_value_t = 30)]
    timeout: u64,
    /// 以 JSON 输出投递记录
    #[arg(long)]
    json: bool,
    /// 详细日志
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// 列出规则
    List { window: Option<String> },
    /// 显示帮助
    Help,
    /// 简介
    Intro,
    /// 创建缺失的目标窗口
    Create,
    /// 合成一条服务器通知并分发
    Inject {
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// 重新下载规则文件并重载
    Update,
    /// 从标准输入逐行读取 "<来源服务器> <原始通知>" 并路由
    Route,
}

impl CliCommand {
    fn into_command(self) -> Option<Command> {
        let command = match self {
            CliCommand::List { window } => Command::List { window },
            CliCommand::Help => Command::Help,
            CliCommand::Intro => Command::Intro,
            CliCommand::Create => Command::Create,
            CliCommand::Inject { text } => Command::Inject { text: text.join(" ") },
            CliCommand::Update => Command::Update,
            CliCommand::Route => return None,
        };
        Some(command)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ========== 1. 日志系统初始化 ==========
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // ========== 2. 配置 ==========
    let mut builder = ConfigManager::custom()
        .rule_file_path(cli.rules.clone())
        .multinetwork(cli.multinetwork)
        .prepend_source_tag(cli.prepend_tag)
        .http_timeout(cli.timeout)
        .verbose(cli.verbose);
    if let Some(pattern) = &cli.servername_rewrite {
        builder = builder.servername_rewrite(pattern.clone());
    }
    if let Some(url) = &cli.datafile_url {
        builder = builder.datafile_url(url.clone());
    }
    let config = builder.build();

    // ========== 3. 加载规则 ==========
    let router = NoticeRouter::new(config);
    let mut host = MemoryHost::new("status");
    match router.reload(&mut host).await {
        Ok(summary) => {
            for err in &summary.errors {
                eprintln!("{}", err);
            }
        }
        Err(RsnoticeError::RuleFileMissing(path)) => {
            eprintln!("规则文件 {} 不存在，可执行 update 下载", path.display());
        }
        Err(e) => return Err(e).context("加载规则文件失败"),
    }

    let session = SessionContext {
        network_tag: cli.network.clone(),
        server_address: cli.server.clone(),
        nick: cli.nick.clone(),
    };

    // ========== 4. 执行 ==========
    match cli.command.into_command() {
        Some(command) => {
            let runner = CommandRunner::new(&router, &session);
            for line in runner.execute(command, &mut host).await {
                println!("{}", line);
            }
            print_deliveries(&mut host, cli.json)?;
        }
        None => route_stdin(&router, &session, &mut host, cli.json).await?,
    }

    Ok(())
}

/// 从标准输入路由原始通知
async fn route_stdin(
    router: &NoticeRouter,
    session: &SessionContext,
    host: &mut MemoryHost,
    json: bool,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("读取标准输入失败")? {
        let Some((identity, raw)) = line.trim_end().split_once(' ') else {
            continue;
        };
        let event = NoticeEvent {
            network_tag: &session.network_tag,
            server_address: &session.server_address,
            source_identity: identity,
            hostmask: "",
            raw_text: raw,
        };
        if !router.dispatch(&event, host).is_consumed() {
            println!("-- {}", raw);
        }
        print_deliveries(host, json)?;
    }
    Ok(())
}

fn print_deliveries(host: &mut MemoryHost, json: bool) -> anyhow::Result<()> {
    for delivery in host.take_deliveries() {
        if json {
            println!("{}", serde_json::to_string(&delivery)?);
        } else {
            println!("[{}] {}", delivery.sink, delivery.text);
        }
    }
    Ok(())
}
