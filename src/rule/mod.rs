//! 规则模块：负责规则的加载、数据模型、模板注册与远程拉取
pub mod model;
pub mod level;
pub mod template;
pub mod loader;
pub mod fetcher;

// 导出核心接口
pub use self::model::{Rule, RuleOptions, RuleTable, DEST_ACTIVE, DEST_DEVNULL};
pub use self::level::{HostLevel, MessageLevel};
pub use self::template::{TemplateRegistry, LINE_START_MARKER};
pub use self::loader::{LoadReport, RuleLoader};
pub use self::fetcher::RemoteRuleFetcher;
