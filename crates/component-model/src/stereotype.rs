//! 构造型
//!
//! 构造型是一组可复用的缺省元数据：作用域、备选标记、名称约定
//! 和拦截器绑定

use crate::scope::ScopeKind;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// 构造型元数据包
#[derive(Debug, Clone)]
pub struct Stereotype {
    /// 构造型名称
    pub name: String,
    /// 缺省作用域
    pub default_scope: Option<ScopeKind>,
    /// 是否使声明组件成为备选组件
    pub alternative: bool,
    /// 是否使声明组件获得约定名称
    pub defaulted_name: bool,
    /// 携带的拦截器绑定
    pub interceptor_bindings: Vec<String>,
}

impl Stereotype {
    /// 创建新的构造型
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_scope: None,
            alternative: false,
            defaulted_name: false,
            interceptor_bindings: Vec::new(),
        }
    }

    /// 设置缺省作用域
    pub fn with_default_scope(mut self, scope: ScopeKind) -> Self {
        self.default_scope = Some(scope);
        self
    }

    /// 标记为备选构造型
    pub fn as_alternative(mut self) -> Self {
        self.alternative = true;
        self
    }

    /// 启用约定名称
    pub fn with_defaulted_name(mut self) -> Self {
        self.defaulted_name = true;
        self
    }

    /// 添加拦截器绑定
    pub fn with_interceptor_binding(mut self, binding: impl Into<String>) -> Self {
        self.interceptor_bindings.push(binding.into());
        self
    }
}

/// 内建构造型集合，先于扫描发现的构造型注册
static BUILTIN_STEREOTYPES: Lazy<Vec<Stereotype>> = Lazy::new(|| {
    vec![
        Stereotype::new("model").with_defaulted_name(),
        Stereotype::new("decorator"),
        Stereotype::new("interceptor"),
    ]
});

/// 构造型注册表
#[derive(Debug)]
pub struct StereotypeRegistry {
    models: HashMap<String, Stereotype>,
}

impl StereotypeRegistry {
    /// 创建注册表并预注册内建构造型
    pub fn new() -> Self {
        let mut registry = Self {
            models: HashMap::new(),
        };
        for builtin in BUILTIN_STEREOTYPES.iter() {
            registry.register(builtin.clone());
        }
        registry
    }

    /// 注册构造型，已存在的名称保持首次注册的定义
    pub fn register(&mut self, stereotype: Stereotype) {
        self.models
            .entry(stereotype.name.clone())
            .or_insert(stereotype);
    }

    /// 按名称查找构造型
    pub fn get(&self, name: &str) -> Option<&Stereotype> {
        self.models.get(name)
    }

    /// 已注册的构造型数量
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// 注册表是否为空
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Default for StereotypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_preregistered() {
        let registry = StereotypeRegistry::new();
        assert!(registry.get("model").is_some());
        assert!(registry.get("decorator").is_some());
        assert!(registry.get("interceptor").is_some());
    }

    #[test]
    fn first_registration_wins() {
        let mut registry = StereotypeRegistry::new();
        registry.register(Stereotype::new("service").with_default_scope(ScopeKind::Application));
        registry.register(Stereotype::new("service").with_default_scope(ScopeKind::Request));

        let stereotype = registry.get("service").unwrap();
        assert_eq!(stereotype.default_scope, Some(ScopeKind::Application));
    }
}
