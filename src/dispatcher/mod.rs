//! 分发模块：通知资格过滤、目标解析、规则匹配与投递
pub mod notice;
pub mod resolver;
pub mod dispatcher;
pub mod router;

// 导出核心接口
pub use self::notice::{NoticeEvent, NOTICE_PREFIX, synthesize_raw_notice};
pub use self::resolver::DestinationResolver;
pub use self::dispatcher::{DispatchOptions, DispatchOutcome, NoticeDispatcher};
pub use self::router::{NoticeRouter, ReloadSummary, RuleSnapshot};
