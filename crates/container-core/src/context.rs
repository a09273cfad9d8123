//! 作用域上下文管理器
//!
//! 上下文持有一个作用域内的组件实例。上下文映射是进程级共享
//! 可变状态，多个执行单元独立激活和停用，所以用并发集合承载：
//! 读取无锁，新作用域关联可以安全地并发注册。

use component_model::{
    Component, ComponentId, ContextError, ContextResult, Instance, ResolutionError,
    ResolutionResult, ScopeKind,
};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// 作用域实例上下文
///
/// 按组件标识存放实例，激活标志决定是否参与活动上下文裁决。
pub struct InstanceContext {
    id: uuid::Uuid,
    scope: ScopeKind,
    active: AtomicBool,
    instances: DashMap<ComponentId, Instance>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl std::fmt::Debug for InstanceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceContext")
            .field("id", &self.id)
            .field("scope", &self.scope)
            .field("active", &self.is_active())
            .field("instances", &self.instances.len())
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl InstanceContext {
    /// 创建新的活动上下文
    pub fn new(scope: ScopeKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            scope,
            active: AtomicBool::new(true),
            instances: DashMap::new(),
            created_at: chrono::Utc::now(),
        }
    }

    /// 上下文标识
    pub fn id(&self) -> uuid::Uuid {
        self.id
    }

    /// 上下文所属作用域
    pub fn scope(&self) -> ScopeKind {
        self.scope
    }

    /// 创建时间
    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.created_at
    }

    /// 上下文是否活动
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// 停用上下文并销毁存放的实例
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
        self.instances.clear();
    }

    /// 查找已存放的实例
    pub fn get(&self, id: ComponentId) -> Option<Instance> {
        self.instances.get(&id).map(|entry| entry.value().clone())
    }

    /// 取出或创建组件实例
    ///
    /// 并发创建时先写者胜出，竞争最多造成一次多余分配。
    pub fn get_or_create(&self, component: &Component) -> ResolutionResult<Instance> {
        if let Some(existing) = self.get(component.id) {
            return Ok(existing);
        }

        let factory = component
            .factory
            .as_ref()
            .ok_or_else(|| ResolutionError::NoFactory {
                class: component.class_name.clone(),
            })?;
        let created = factory()?;

        Ok(self
            .instances
            .entry(component.id)
            .or_insert(created)
            .value()
            .clone())
    }

    /// 已存放的实例数量
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }
}

/// 作用域上下文管理器
///
/// 每个作用域、每个逻辑执行单元至多有一个活动上下文。
#[derive(Debug)]
pub struct ContextManager {
    contexts: DashMap<ScopeKind, Vec<Arc<InstanceContext>>>,
}

impl ContextManager {
    /// 创建管理器，单例作用域的上下文随容器建立且常驻活动
    pub fn new() -> Self {
        let manager = Self {
            contexts: DashMap::new(),
        };
        manager.contexts.insert(
            ScopeKind::Singleton,
            vec![Arc::new(InstanceContext::new(ScopeKind::Singleton))],
        );
        manager
    }

    /// 激活一个新的作用域上下文
    pub fn activate(&self, scope: ScopeKind) -> Arc<InstanceContext> {
        let context = Arc::new(InstanceContext::new(scope));
        self.contexts
            .entry(scope)
            .or_default()
            .push(context.clone());
        debug!("作用域 {} 的上下文 {} 已激活", scope, context.id());
        context
    }

    /// 取得指定作用域的唯一活动上下文
    pub fn active_context(&self, scope: ScopeKind) -> ContextResult<Arc<InstanceContext>> {
        let mut active: Vec<Arc<InstanceContext>> = self
            .contexts
            .get(&scope)
            .map(|entry| {
                entry
                    .iter()
                    .filter(|c| c.is_active())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        match active.len() {
            0 => Err(ContextError::NotActive {
                scope: scope.to_string(),
            }),
            1 => Ok(active.remove(0)),
            _ => Err(ContextError::MultipleActive {
                scope: scope.to_string(),
            }),
        }
    }

    /// 停用上下文并将其从注册结构中摘除
    pub fn deactivate(&self, context: &Arc<InstanceContext>) {
        context.deactivate();
        if let Some(mut entry) = self.contexts.get_mut(&context.scope()) {
            entry.retain(|c| !Arc::ptr_eq(c, context));
        }
        debug!(
            "作用域 {} 的上下文 {} 已停用",
            context.scope(),
            context.id()
        );
    }
}

impl Default for ContextManager {
    fn default() -> Self {
        Self::new()
    }
}
