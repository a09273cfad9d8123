//! 生命周期作用域
//!
//! 作用域决定组件实例被共享多久，集合是封闭的

use crate::errors::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 生命周期作用域类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    /// 依赖作用域 - 每次请求都创建新实例（缺省）
    Dependent,
    /// 请求作用域 - 在同一请求内共享实例
    Request,
    /// 会话作用域 - 在同一会话内共享实例
    Session,
    /// 对话作用域 - 在同一对话内共享实例
    Conversation,
    /// 应用作用域 - 在应用生命周期内共享实例
    Application,
    /// 单例作用域 - 全局唯一实例，不经过客户端代理
    Singleton,
}

impl ScopeKind {
    /// 是否为普通作用域，普通作用域的组件通过客户端代理解析
    pub fn is_normal(self) -> bool {
        matches!(
            self,
            Self::Request | Self::Session | Self::Conversation | Self::Application
        )
    }

    /// 是否为钝化作用域，钝化作用域要求组件具备钝化能力
    pub fn is_passivating(self) -> bool {
        matches!(self, Self::Session | Self::Conversation)
    }
}

impl Default for ScopeKind {
    fn default() -> Self {
        Self::Dependent
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Dependent => "dependent",
            Self::Request => "request",
            Self::Session => "session",
            Self::Conversation => "conversation",
            Self::Application => "application",
            Self::Singleton => "singleton",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for ScopeKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dependent" => Ok(Self::Dependent),
            "request" => Ok(Self::Request),
            "session" => Ok(Self::Session),
            "conversation" => Ok(Self::Conversation),
            "application" => Ok(Self::Application),
            "singleton" => Ok(Self::Singleton),
            other => Err(ConfigurationError::UnknownScope {
                value: other.to_string(),
            }),
        }
    }
}
