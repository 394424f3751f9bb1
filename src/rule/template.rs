//! 输出模板注册表
//! 与规则表同生命周期：键为 "r_" + 规则名，值为行首标记 + 格式模板

/// 宿主主题中的行首标记
pub const LINE_START_MARKER: &str = "{line_start}";

/// 模板注册表（保持规则加载顺序）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateRegistry {
    entries: Vec<(String, String)>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册规则模板（同名键后注册者覆盖）
    pub fn register(&mut self, rule_name: &str, format_template: &str) {
        let key = format!("r_{}", rule_name);
        let value = format!("{}{}", LINE_START_MARKER, format_template);
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
