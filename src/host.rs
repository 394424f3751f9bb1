//! 宿主协作接口
//! 路由引擎只通过该 trait 访问宿主的窗口、主题与渲染能力

use std::collections::HashMap;
use serde::Serialize;

use crate::rule::{HostLevel, TemplateRegistry};
use crate::utils::TemplateRenderer;

/// 宿主需提供的能力
pub trait NoticeHost {
    /// 输出窗口引用
    type Sink: Clone + std::fmt::Debug;

    /// 按名称查找窗口
    fn find_sink(&self, name: &str) -> Option<Self::Sink>;
    /// 当前活动窗口
    fn active_sink(&self) -> Self::Sink;
    /// 默认窗口（宿主的第一个输出窗口，始终存在）
    fn default_sink(&self) -> Self::Sink;
    /// 查找或创建窗口
    fn create_sink(&mut self, name: &str) -> Self::Sink;
    /// 注册模板（整体替换之前注册的规则模板）
    fn register_templates(&mut self, templates: &TemplateRegistry);
    /// 以指定级别向窗口渲染一条格式化消息
    fn render(&mut self, sink: &Self::Sink, template_key: &str, args: &[String], level: HostLevel);
}

/// 一次投递记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery {
    pub sink: String,
    pub template_key: String,
    pub args: Vec<String>,
    pub level: HostLevel,
    /// 按已注册模板渲染后的文本
    pub text: String,
}

/// 内存宿主：记录所有投递，用于命令行工具和测试
#[derive(Debug, Clone)]
pub struct MemoryHost {
    sinks: Vec<String>,
    active: String,
    templates: HashMap<String, String>,
    deliveries: Vec<Delivery>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new("status")
    }
}

impl MemoryHost {
    /// 以默认窗口名创建（默认窗口同时为活动窗口）
    pub fn new(default_sink: &str) -> Self {
        Self {
            sinks: vec![default_sink.to_string()],
            active: default_sink.to_string(),
            templates: HashMap::new(),
            deliveries: Vec::new(),
        }
    }

    /// 预置窗口
    pub fn with_sinks<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.create_sink(&name.into());
        }
        self
    }

    /// 切换活动窗口（不存在则创建）
    pub fn set_active(&mut self, name: &str) {
        self.active = self.create_sink(name);
    }

    pub fn sinks(&self) -> &[String] {
        &self.sinks
    }

    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    /// 取出并清空投递记录
    pub fn take_deliveries(&mut self) -> Vec<Delivery> {
        std::mem::take(&mut self.deliveries)
    }

    pub fn template(&self, key: &str) -> Option<&str> {
        self.templates.get(key).map(String::as_str)
    }
}

impl NoticeHost for MemoryHost {
    type Sink = String;

    fn find_sink(&self, name: &str) -> Option<String> {
        self.sinks
            .iter()
            .find(|sink| sink.eq_ignore_ascii_case(name))
            .cloned()
    }

    fn active_sink(&self) -> String {
        self.active.clone()
    }

    fn default_sink(&self) -> String {
        self.sinks[0].clone()
    }

    fn create_sink(&mut self, name: &str) -> String {
        if let Some(existing) = self.find_sink(name) {
            return existing;
        }
        self.sinks.push(name.to_string());
        name.to_string()
    }

    fn register_templates(&mut self, templates: &TemplateRegistry) {
        self.templates = templates
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
    }

    fn render(&mut self, sink: &String, template_key: &str, args: &[String], level: HostLevel) {
        let text = match self.templates.get(template_key) {
            Some(template) => TemplateRenderer::render(template, args),
            None => args.join(" "),
        };
        self.deliveries.push(Delivery {
            sink: sink.clone(),
            template_key: template_key.to_string(),
            args: args.to_vec(),
            level,
            text,
        });
    }
}
