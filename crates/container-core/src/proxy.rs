//! 缺省代理工厂
//!
//! 代理生成机制不属于核心职责。缺省实现返回一个满足组件契约
//! 描述的不透明句柄，宿主运行时可以替换成真正的代理工厂。

use component_model::{Component, ComponentId, Instance, ResolutionResult, TypeKey};
use container_abstractions::ProxyFactory;
use std::sync::Arc;

/// 普通作用域组件的客户端代理句柄
#[derive(Debug, Clone)]
pub struct ProxyHandle {
    /// 被代理的组件标识
    pub component_id: ComponentId,
    /// 被代理的组件类名
    pub class_name: String,
    /// 代理满足的契约类型
    pub contract_types: Vec<TypeKey>,
}

/// 句柄代理工厂
#[derive(Debug, Default)]
pub struct HandleProxyFactory;

impl ProxyFactory for HandleProxyFactory {
    fn create_proxy(&self, component: &Component) -> ResolutionResult<Instance> {
        let handle = ProxyHandle {
            component_id: component.id,
            class_name: component.class_name.clone(),
            contract_types: component.contract_types.iter().cloned().collect(),
        };
        Ok(Arc::new(handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use component_model::ComponentKind;

    #[test]
    fn proxy_handle_carries_contracts() {
        let component = Component::new("app::Prices", ComponentKind::Managed)
            .with_contract(TypeKey::of("app::PriceList"));

        let factory = HandleProxyFactory;
        let instance = factory.create_proxy(&component).unwrap();
        let handle = instance.downcast_ref::<ProxyHandle>().unwrap();

        assert_eq!(handle.class_name, "app::Prices");
        assert!(handle.contract_types.contains(&TypeKey::of("app::PriceList")));
    }
}
