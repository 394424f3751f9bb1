//! rsnotice - IRC 服务器通知规则匹配与路由引擎

// 导出全局错误类型
pub use self::error::{RsnoticeError, RsnResult};

// 导出配置模块
pub use self::config::{GlobalConfig, ConfigManager, CustomConfigBuilder};

// 导出规则模块核心接口
pub use self::rule::{
    Rule, RuleOptions, RuleTable, MessageLevel, HostLevel, TemplateRegistry,
    LoadReport, RuleLoader, RemoteRuleFetcher,
};

// 导出宿主协作接口
pub use self::host::{NoticeHost, MemoryHost, Delivery};

// 导出工具模块核心接口
pub use self::utils::TemplateRenderer;

// 导出分发模块核心接口
pub use self::dispatcher::{
    NoticeEvent,
    NoticeRouter,
    NoticeDispatcher,
    DispatchOptions,
    DispatchOutcome,
    DestinationResolver,
    ReloadSummary,
    RuleSnapshot,
};

// 导出子命令
pub use self::command::{Command, CommandRunner, SessionContext};

// 声明所有子模块
pub mod config;
pub mod error;
pub mod rule;
pub mod host;
pub mod utils;
pub mod dispatcher;
pub mod command;
