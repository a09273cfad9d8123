//! 声明式配置契约
//!
//! 配置源读取器把声明式覆盖解析成与注解路径同构的模型

use component_model::{ConfigurationResult, Qualifier, ScopeKind};
use std::io::Read;

/// 单个类的声明式覆盖
#[derive(Debug, Clone)]
pub struct ComponentOverride {
    /// 目标类全名
    pub class: String,
    /// 覆盖作用域
    pub scope: Option<ScopeKind>,
    /// 追加的限定符
    pub qualifiers: Vec<Qualifier>,
    /// 覆盖名称
    pub name: Option<String>,
    /// 覆盖备选标记
    pub alternative: Option<bool>,
}

impl ComponentOverride {
    /// 创建空覆盖
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            scope: None,
            qualifiers: Vec::new(),
            name: None,
            alternative: None,
        }
    }
}

/// 声明式配置
///
/// 多个配置源按读取顺序合并，后读的源追加在先读的源之后。
#[derive(Debug, Clone, Default)]
pub struct DeclarativeConfig {
    /// 为应用启用的备选组件类名
    pub enabled_alternatives: Vec<String>,
    /// 声明式标记为特化组件的类名
    pub specializations: Vec<String>,
    /// 按类覆盖
    pub overrides: Vec<ComponentOverride>,
}

impl DeclarativeConfig {
    /// 合并另一份配置
    pub fn merge(&mut self, other: DeclarativeConfig) {
        self.enabled_alternatives.extend(other.enabled_alternatives);
        self.specializations.extend(other.specializations);
        self.overrides.extend(other.overrides);
    }

    /// 查找指定类的覆盖
    pub fn override_for(&self, class: &str) -> Option<&ComponentOverride> {
        self.overrides.iter().find(|o| o.class == class)
    }

    /// 指定类是否被声明式标记为特化组件
    pub fn declares_specialization(&self, class: &str) -> bool {
        self.specializations.iter().any(|c| c == class)
    }
}

/// 配置源读取器 trait
///
/// 给定字节流和逻辑名，解析出声明式配置；I/O 和解析失败
/// 都包装成配置错误向上传播。
pub trait ConfigSourceReader: Send + Sync {
    /// 读取器名称
    fn name(&self) -> &str;

    /// 是否支持指定逻辑名的配置源
    fn supports(&self, source_name: &str) -> bool;

    /// 从流中解析声明式配置
    fn read(&self, stream: &mut dyn Read, source_name: &str)
        -> ConfigurationResult<DeclarativeConfig>;
}
