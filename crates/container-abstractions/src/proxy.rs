//! 代理工厂抽象接口
//!
//! 普通作用域组件通过客户端代理解析，代理的生成机制对核心
//! 是黑盒，返回值只需满足组件的契约类型

use component_model::{Component, Instance, ResolutionResult};

/// 代理工厂 trait
pub trait ProxyFactory: Send + Sync {
    /// 为普通作用域组件创建客户端代理实例
    fn create_proxy(&self, component: &Component) -> ResolutionResult<Instance>;
}
