//! 模板渲染工具模块
//! 将 $0/$1/... 占位符替换为参数列表中的对应值
//! 多位数占位符（$10）整体识别，不会被 $1 误替换

use std::borrow::Cow;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::rule::template::LINE_START_MARKER;

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$(\d+)").unwrap());

/// 模板渲染工具类
pub struct TemplateRenderer;

impl TemplateRenderer {
    /// 渲染模板
    ///
    /// # 参数
    /// - `template`: 格式模板，可带行首标记
    /// - `args`: 参数列表，`args[0]` 对应 `$0`（网络标签）
    ///
    /// # 返回值
    /// 替换后的文本；越界的占位符替换为空串，行首标记被去除
    pub fn render(template: &str, args: &[String]) -> String {
        let body = template.strip_prefix(LINE_START_MARKER).unwrap_or(template);
        let rendered: Cow<'_, str> = PLACEHOLDER_RE.replace_all(body, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| args.get(index))
                .cloned()
                .unwrap_or_default()
        });
        rendered.into_owned()
    }
}

// 单元测试
#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_render_basic() {
        let text = TemplateRenderer::render("$0 killed $1", &args(&["EFNet", "baduser"]));
        assert_eq!(text, "EFNet killed baduser");
    }

    #[test]
    fn test_render_strips_line_start() {
        let text = TemplateRenderer::render("{line_start}[$0] $1", &args(&["EFNet", "x"]));
        assert_eq!(text, "[EFNet] x");
    }

    #[test]
    fn test_render_multi_digit_and_missing() {
        let values: Vec<String> = (0..11).map(|i| format!("v{}", i)).collect();
        assert_eq!(TemplateRenderer::render("$10|$1", &values), "v10|v1");
        assert_eq!(TemplateRenderer::render("$0 $5", &args(&["a"])), "a ");
    }
}
