//! 契约类型键
//!
//! 提供契约类型的结构化表示，支持参数化类型的结构比较

use std::fmt;

/// 契约类型键
///
/// 用原始类型名加上有序的泛型实参表示一个契约类型。
/// 相等性和哈希都是结构化的：`Repo<User>` 只匹配 `Repo<User>`。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeKey {
    /// 原始类型名（含模块路径）
    pub name: String,
    /// 泛型实参
    pub args: Vec<TypeKey>,
    /// 是否为未解析的类型变量
    pub variable: bool,
}

impl TypeKey {
    /// 创建非参数化类型键
    pub fn of(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            variable: false,
        }
    }

    /// 创建参数化类型键
    pub fn parameterized(name: impl Into<String>, args: Vec<TypeKey>) -> Self {
        Self {
            name: name.into(),
            args,
            variable: false,
        }
    }

    /// 创建类型变量占位键
    pub fn type_variable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            variable: true,
        }
    }

    /// 类型或其任意实参是否含有类型变量
    pub fn contains_variable(&self) -> bool {
        self.variable || self.args.iter().any(TypeKey::contains_variable)
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn simple_name(&self) -> &str {
        self.name.split("::").last().unwrap_or(&self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            let rendered: Vec<String> = self.args.iter().map(ToString::to_string).collect();
            write!(f, "<{}>", rendered.join(", "))?;
        }
        Ok(())
    }
}
