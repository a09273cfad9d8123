//! 注入点
//!
//! 组件上声明的依赖请求

use crate::qualifier::Qualifier;
use crate::types::TypeKey;
use std::collections::HashSet;
use std::fmt;

/// 注入点
#[derive(Debug, Clone)]
pub struct InjectionPoint {
    /// 拥有该注入点的组件类名
    pub owner_class: String,
    /// 请求的契约类型
    pub requested_type: TypeKey,
    /// 请求的限定符
    pub qualifiers: HashSet<Qualifier>,
    /// 是否为委托注入点
    pub delegate: bool,
}

impl InjectionPoint {
    /// 渲染请求描述，用于诊断信息
    pub fn request_description(&self) -> String {
        if self.qualifiers.is_empty() {
            self.requested_type.to_string()
        } else {
            let mut rendered: Vec<String> =
                self.qualifiers.iter().map(ToString::to_string).collect();
            rendered.sort();
            format!("{} [{}]", self.requested_type, rendered.join(", "))
        }
    }
}

impl fmt::Display for InjectionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <- {}", self.owner_class, self.request_description())
    }
}
