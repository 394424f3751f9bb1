//! 通用工具模块
pub mod template_render;

pub use self::template_render::TemplateRenderer;
