//! 容器上下文
//!
//! 部署完成后的运行时入口。显式对象按部署创建一次，传给需要
//! 它的调用方，不提供进程级全局访问。注册表在部署后只读，
//! 可被多个工作线程并发查找；代理缓存按身份键并发填充。

use crate::context::{ContextManager, InstanceContext};
use crate::registry::ComponentRegistry;
use crate::resolver::InjectionResolver;
use crate::validation::ValidationOutput;
use component_model::{
    Component, ComponentId, ContainerResult, ContextResult, Instance, Qualifier, ResolutionError,
    ResolutionResult, ScopeKind, StereotypeRegistry, TypeKey,
};
use container_abstractions::ProxyFactory;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// 容器上下文
pub struct ContainerContext {
    registry: RwLock<ComponentRegistry>,
    contexts: ContextManager,
    stereotypes: StereotypeRegistry,
    proxy_factory: Arc<dyn ProxyFactory>,
    /// 普通作用域组件的代理缓存，每个组件一个代理对象
    proxies: DashMap<ComponentId, Instance>,
    decorator_stacks: DashMap<ComponentId, Vec<ComponentId>>,
    interceptor_stacks: DashMap<ComponentId, Vec<ComponentId>>,
}

impl std::fmt::Debug for ContainerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerContext").finish_non_exhaustive()
    }
}

impl ContainerContext {
    /// 由部署管线构造
    pub fn new(
        registry: ComponentRegistry,
        proxy_factory: Arc<dyn ProxyFactory>,
        stereotypes: StereotypeRegistry,
        stacks: ValidationOutput,
    ) -> Self {
        let decorator_stacks = DashMap::new();
        for (id, stack) in stacks.decorator_stacks {
            decorator_stacks.insert(id, stack);
        }
        let interceptor_stacks = DashMap::new();
        for (id, stack) in stacks.interceptor_stacks {
            interceptor_stacks.insert(id, stack);
        }

        Self {
            registry: RwLock::new(registry),
            contexts: ContextManager::new(),
            stereotypes,
            proxy_factory,
            proxies: DashMap::new(),
            decorator_stacks,
            interceptor_stacks,
        }
    }

    /// 按契约类型和限定符解析候选组件集合
    pub fn resolve(
        &self,
        requested: &TypeKey,
        qualifiers: &[Qualifier],
    ) -> ResolutionResult<Vec<Arc<Component>>> {
        let registry = self.registry.read();
        InjectionResolver::new(&registry).resolve_by_type(requested, qualifiers)
    }

    /// 解析出唯一组件，零候选或歧义作为类型化失败返回
    pub fn select(
        &self,
        requested: &TypeKey,
        qualifiers: &[Qualifier],
    ) -> ResolutionResult<Arc<Component>> {
        let registry = self.registry.read();
        InjectionResolver::new(&registry).select_by_type(requested, qualifiers)
    }

    /// 按名称解析候选组件集合
    pub fn resolve_by_name(&self, name: &str) -> Vec<Arc<Component>> {
        let registry = self.registry.read();
        InjectionResolver::new(&registry).resolve_by_name(name)
    }

    /// 按名称取得组件实例
    ///
    /// 无匹配返回 `None`；备选决胜后仍有多个匹配报歧义。
    pub fn instance_by_name(&self, name: &str) -> ContainerResult<Option<Instance>> {
        let selected = {
            let registry = self.registry.read();
            InjectionResolver::new(&registry).select_by_name(name)?
        };
        match selected {
            Some(component) => Ok(Some(self.reference(&component)?)),
            None => Ok(None),
        }
    }

    /// 取得组件引用
    ///
    /// 普通作用域走代理缓存，每个组件只建一个代理，竞争时先写者
    /// 胜出；依赖作用域每次新建实例；其余作用域从活动上下文取。
    pub fn reference(&self, component: &Arc<Component>) -> ContainerResult<Instance> {
        if component.scope.is_normal() {
            if let Some(existing) = self.proxies.get(&component.id) {
                return Ok(existing.value().clone());
            }
            let proxy = self.proxy_factory.create_proxy(component)?;
            return Ok(self
                .proxies
                .entry(component.id)
                .or_insert(proxy)
                .value()
                .clone());
        }

        if component.scope == ScopeKind::Dependent {
            let factory =
                component
                    .factory
                    .as_ref()
                    .ok_or_else(|| ResolutionError::NoFactory {
                        class: component.class_name.clone(),
                    })?;
            return Ok(factory()?);
        }

        let context = self.contexts.active_context(component.scope)?;
        Ok(context.get_or_create(component)?)
    }

    /// 激活一个作用域上下文
    pub fn activate_context(&self, scope: ScopeKind) -> Arc<InstanceContext> {
        self.contexts.activate(scope)
    }

    /// 取得指定作用域的唯一活动上下文
    pub fn active_context(&self, scope: ScopeKind) -> ContextResult<Arc<InstanceContext>> {
        self.contexts.active_context(scope)
    }

    /// 停用作用域上下文
    pub fn deactivate_context(&self, context: &Arc<InstanceContext>) {
        self.contexts.deactivate(context);
    }

    /// 组件的装饰器栈
    pub fn decorator_stack(&self, component: &Component) -> Vec<Arc<Component>> {
        self.stack_components(&self.decorator_stacks, component.id)
    }

    /// 组件的拦截器栈
    pub fn interceptor_stack(&self, component: &Component) -> Vec<Arc<Component>> {
        self.stack_components(&self.interceptor_stacks, component.id)
    }

    fn stack_components(
        &self,
        stacks: &DashMap<ComponentId, Vec<ComponentId>>,
        id: ComponentId,
    ) -> Vec<Arc<Component>> {
        let registry = self.registry.read();
        stacks
            .get(&id)
            .map(|stack| {
                stack
                    .iter()
                    .filter_map(|member| registry.find_by_id(*member))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 构造型注册表
    pub fn stereotypes(&self) -> &StereotypeRegistry {
        &self.stereotypes
    }

    /// 全部组件记录快照
    pub fn components(&self) -> Vec<Arc<Component>> {
        self.registry.read().all().cloned().collect()
    }

    /// 普通组件数量
    pub fn component_count(&self) -> usize {
        self.registry.read().len()
    }
}
