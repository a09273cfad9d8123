//! 限定符
//!
//! 限定符用于在同一契约类型的多个组件之间做进一步区分

use std::collections::HashSet;
use std::fmt;

/// 限定符
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Qualifier {
    /// 缺省限定符，未声明其他限定符的组件隐式携带
    Default,
    /// 通配限定符，每个组件都隐式携带
    Any,
    /// 名称限定符
    Named(String),
    /// 自定义限定符
    Custom(String),
}

impl Qualifier {
    /// 创建名称限定符
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// 创建自定义限定符
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }

    /// 从声明式配置的字符串形式解析限定符
    ///
    /// `default` 和 `any` 是保留字，`named:foo` 产生名称限定符，
    /// 其余一律视为自定义限定符。
    pub fn parse(value: &str) -> Self {
        match value {
            "default" => Self::Default,
            "any" => Self::Any,
            other => other.strip_prefix("named:").map_or_else(
                || Self::Custom(other.to_string()),
                |name| Self::Named(name.to_string()),
            ),
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Any => write!(f, "any"),
            Self::Named(name) => write!(f, "named:{name}"),
            Self::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// 计算组件的有效限定符集合
///
/// 每个组件隐式携带 `Any`；除了 `Named` 和 `Any` 之外没有声明
/// 其他限定符的组件还隐式携带 `Default`。
pub fn effective_qualifiers(declared: &HashSet<Qualifier>) -> HashSet<Qualifier> {
    let mut effective = declared.clone();
    effective.insert(Qualifier::Any);

    let has_discriminating = declared
        .iter()
        .any(|q| !matches!(q, Qualifier::Any | Qualifier::Named(_) | Qualifier::Default));
    if !has_discriminating {
        effective.insert(Qualifier::Default);
    }

    effective
}

/// 规范化一次请求的限定符集合，空请求等价于请求缺省限定符
pub fn normalize_request(requested: &[Qualifier]) -> HashSet<Qualifier> {
    if requested.is_empty() {
        let mut set = HashSet::new();
        set.insert(Qualifier::Default);
        set
    } else {
        requested.iter().cloned().collect()
    }
}
