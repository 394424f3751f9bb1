//! 规则加载管理器
//! 负责将规则定义文本解析为规则表，逐条校验，单条错误不影响整体加载
//!
//! 文件格式：每条规则占连续四行，记录之间允许空行和 `#` 注释
//! ```text
//! name [OPTION ...]
//! <pattern>
//! <format-template>
//! [TAG: ]dest1 dest2 ... [MSG|HILIGHT|NONE]
//! ```

use std::io::ErrorKind;
use std::path::Path;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use super::level::MessageLevel;
use super::model::{Rule, RuleOptions, RuleTable};
use super::template::TemplateRegistry;
use crate::config::GlobalConfig;
use crate::error::{RsnResult, RsnoticeError};

// 头行：规则名 + 可选选项
static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-z0-9_]+)(?:\s+(.*?))?\s*$").unwrap());

// 级别关键字（大小写敏感、单词边界），顺序与 MessageLevel::KEYWORDS 一致
static LEVEL_RES: Lazy<Vec<(Regex, MessageLevel)>> = Lazy::new(|| {
    MessageLevel::KEYWORDS
        .iter()
        .map(|(word, level)| (Regex::new(&format!(r"\b{}\b", word)).unwrap(), *level))
        .collect()
});

/// 模板开头的网络标签前缀
const SOURCE_TAG_PREFIX: &str = "[$0] ";

/// 单次加载的结果
#[derive(Debug, Default)]
pub struct LoadReport {
    pub table: RuleTable,
    pub templates: TemplateRegistry,
    /// 被拒绝记录的错误（含行号）
    pub errors: Vec<RsnoticeError>,
}

impl LoadReport {
    /// 成功处理的规则数
    pub fn processed(&self) -> usize {
        self.table.len()
    }
}

/// 规则加载管理器
pub struct RuleLoader;

impl RuleLoader {
    /// 从规则文件加载
    pub async fn load_file(path: &Path, config: &GlobalConfig) -> RsnResult<LoadReport> {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(RsnoticeError::RuleFileMissing(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        debug!("读取规则文件成功：{}，{} 字节", path.display(), text.len());
        Ok(Self::parse_str(&text, config))
    }

    /// 解析规则定义文本
    pub fn parse_str(text: &str, config: &GlobalConfig) -> LoadReport {
        let lines: Vec<&str> = text.lines().collect();
        let mut report = LoadReport::default();
        let mut index = 0;

        while index < lines.len() {
            let header = lines[index];
            let trimmed = header.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                index += 1;
                continue;
            }
            let header_line = index + 1;
            let header_caps = HEADER_RE.captures(header);

            // 收集记录的其余三行；空行提前结束记录
            let mut body: Vec<&str> = Vec::with_capacity(3);
            let mut incomplete = None;
            index += 1;
            while body.len() < 3 {
                match lines.get(index) {
                    None => {
                        incomplete = Some(RsnoticeError::RuleParseError {
                            line: header_line,
                            message: "记录不完整：文件提前结束".to_string(),
                        });
                        break;
                    }
                    Some(line) if line.trim().is_empty() => {
                        incomplete = Some(RsnoticeError::RuleParseError {
                            line: index + 1,
                            message: "记录不完整：遇到空行".to_string(),
                        });
                        index += 1;
                        break;
                    }
                    Some(line) => {
                        body.push(line);
                        index += 1;
                    }
                }
            }

            let result = match (header_caps, incomplete) {
                (None, _) => Err(RsnoticeError::RuleParseError {
                    line: header_line,
                    message: format!("无效的规则头：{:?}", header),
                }),
                (Some(_), Some(err)) => Err(err),
                (Some(caps), None) => {
                    let name = &caps[1];
                    let options = caps.get(2).map(|m| m.as_str()).unwrap_or("");
                    Self::build_rule(header_line, name, options, body[0], body[1], body[2], config)
                }
            };

            match result {
                Ok(rule) => {
                    debug!("加载规则 [{}]（第{}行）", rule.name, rule.source_line);
                    report.templates.register(&rule.name, &rule.format_template);
                    report.table.push(rule);
                }
                Err(e) => {
                    warn!("规则记录被跳过：{}", e);
                    report.errors.push(e);
                }
            }
        }

        info!(
            "规则加载完成：成功 {} 条，失败 {} 条",
            report.processed(),
            report.errors.len()
        );
        report
    }

    /// 构建单条规则
    fn build_rule(
        header_line: usize,
        name: &str,
        options_text: &str,
        pattern: &str,
        template: &str,
        destinations: &str,
        config: &GlobalConfig,
    ) -> RsnResult<Rule> {
        let (options, unknown) = RuleOptions::parse(options_text);
        if !unknown.is_empty() {
            warn!("规则 [{}]（第{}行）含未知选项：{}", name, header_line, unknown.join(" "));
        }

        let regex = Regex::new(&format!("^(?:{})", pattern)).map_err(|source| {
            RsnoticeError::RegexCompileError {
                line: header_line + 1,
                source,
            }
        })?;

        let format_template = if config.prepend_source_tag {
            template.to_string()
        } else {
            template
                .strip_prefix(SOURCE_TAG_PREFIX)
                .unwrap_or(template)
                .to_string()
        };

        let (destinations, message_level) = Self::split_level(destinations);
        let scope = Rule::parse_scope(&destinations);

        Ok(Rule {
            name: name.to_string(),
            source_line: header_line,
            pattern: pattern.to_string(),
            regex,
            format_template,
            destinations,
            scope,
            message_level,
            options,
        })
    }

    /// 从目标行中提取级别关键字，按 MSG → HILIGHT → NONE 顺序检查，后命中者生效
    pub fn split_level(destinations: &str) -> (String, MessageLevel) {
        let mut level = MessageLevel::default();
        let mut text = destinations.to_string();
        for (re, keyword_level) in LEVEL_RES.iter() {
            if re.is_match(&text) {
                level = *keyword_level;
                text = re.replace_all(&text, "").into_owned();
            }
        }
        let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
        (cleaned, level)
    }
}
