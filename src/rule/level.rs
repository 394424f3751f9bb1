//! 消息级别定义
//! 规则文件中的级别关键字 → 宿主渲染时使用的可见性级别

use std::fmt;
use serde::{Deserialize, Serialize};

/// 规则声明的消息级别（目标行中的 MSG / HILIGHT / NONE 关键字）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MessageLevel {
    Hilight,
    Msg,
    None,
    #[default]
    ClientCrap,
}

impl MessageLevel {
    /// 目标行按顺序扫描的关键字，后命中者覆盖先命中者
    pub const KEYWORDS: [(&'static str, MessageLevel); 3] = [
        ("MSG", MessageLevel::Msg),
        ("HILIGHT", MessageLevel::Hilight),
        ("NONE", MessageLevel::None),
    ];

    /// 映射为宿主可见性级别
    pub fn host_level(self) -> HostLevel {
        match self {
            MessageLevel::Hilight => HostLevel::HighlightPublic,
            MessageLevel::Msg => HostLevel::Public,
            MessageLevel::None => HostLevel::PublicNoActivity,
            MessageLevel::ClientCrap => HostLevel::ClientCrap,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MessageLevel::Hilight => "HILIGHT",
            MessageLevel::Msg => "MSG",
            MessageLevel::None => "NONE",
            MessageLevel::ClientCrap => "CLIENTCRAP",
        }
    }
}

impl fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 宿主渲染可见性级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostLevel {
    /// 高亮的公开消息
    HighlightPublic,
    /// 普通公开消息
    Public,
    /// 公开消息，但不触发窗口活动标记
    PublicNoActivity,
    /// 客户端内部诊断消息（最低可见性）
    ClientCrap,
}

impl HostLevel {
    /// 任意关键字 → 宿主级别，未知字符串静默回落到 ClientCrap
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "HILIGHT" => HostLevel::HighlightPublic,
            "MSG" => HostLevel::Public,
            "NONE" => HostLevel::PublicNoActivity,
            _ => HostLevel::ClientCrap,
        }
    }
}
