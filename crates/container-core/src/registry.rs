//! 组件注册表
//!
//! 注册表独占持有全部组件记录。部署过程单线程填充，
//! 部署完成后只读，可被多个工作线程并发查找。

use component_model::{Component, ComponentId, ComponentKind};
use std::collections::HashSet;
use std::sync::Arc;

/// 组件注册表
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    /// 普通组件，按注册顺序保存
    components: Vec<Arc<Component>>,
    /// 装饰器
    decorators: Vec<Arc<Component>>,
    /// 拦截器
    interceptors: Vec<Arc<Component>>,
    /// 被特化压制的组件
    suppressed: HashSet<ComponentId>,
    /// 为应用启用的备选组件类名
    enabled_alternatives: HashSet<String>,
}

impl ComponentRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册组件，按种类归入对应集合
    pub fn add(&mut self, component: Component) -> Arc<Component> {
        let arc = Arc::new(component);
        match arc.kind {
            ComponentKind::Decorator => self.decorators.push(arc.clone()),
            ComponentKind::Interceptor => self.interceptors.push(arc.clone()),
            ComponentKind::Managed | ComponentKind::Enterprise => {
                self.components.push(arc.clone());
            }
        }
        arc
    }

    /// 原地更新组件记录，仅限部署阶段使用
    pub fn update(&mut self, id: ComponentId, f: impl FnOnce(&mut Component)) -> bool {
        let slot = self
            .components
            .iter_mut()
            .chain(self.decorators.iter_mut())
            .chain(self.interceptors.iter_mut())
            .find(|c| c.id == id);

        match slot {
            Some(arc) => {
                f(Arc::make_mut(arc));
                true
            }
            None => false,
        }
    }

    /// 普通组件集合
    pub fn components(&self) -> &[Arc<Component>] {
        &self.components
    }

    /// 装饰器集合
    pub fn decorators(&self) -> &[Arc<Component>] {
        &self.decorators
    }

    /// 拦截器集合
    pub fn interceptors(&self) -> &[Arc<Component>] {
        &self.interceptors
    }

    /// 全部组件记录（普通组件、装饰器、拦截器）
    pub fn all(&self) -> impl Iterator<Item = &Arc<Component>> {
        self.components
            .iter()
            .chain(self.decorators.iter())
            .chain(self.interceptors.iter())
    }

    /// 压制组件，使其不再作为独立解析候选
    pub fn suppress(&mut self, id: ComponentId) {
        self.suppressed.insert(id);
    }

    /// 组件是否被压制
    pub fn is_suppressed(&self, id: ComponentId) -> bool {
        self.suppressed.contains(&id)
    }

    /// 为应用启用备选组件
    pub fn enable_alternative(&mut self, class_name: impl Into<String>) {
        self.enabled_alternatives.insert(class_name.into());
    }

    /// 组件是否为已启用的备选组件
    pub fn is_alternative_enabled(&self, component: &Component) -> bool {
        component.alternative && self.enabled_alternatives.contains(&component.class_name)
    }

    /// 组件是否参与解析
    ///
    /// 被压制的组件和未启用的备选组件都不是候选。
    pub fn is_resolvable(&self, component: &Component) -> bool {
        if self.is_suppressed(component.id) {
            return false;
        }
        !component.alternative || self.enabled_alternatives.contains(&component.class_name)
    }

    /// 按声明类名查找组件
    pub fn find_by_class(&self, class_name: &str) -> Option<Arc<Component>> {
        self.all().find(|c| c.class_name == class_name).cloned()
    }

    /// 按标识查找组件
    pub fn find_by_id(&self, id: ComponentId) -> Option<Arc<Component>> {
        self.all().find(|c| c.id == id).cloned()
    }

    /// 按名称查找参与解析的组件
    pub fn by_name(&self, name: &str) -> Vec<Arc<Component>> {
        self.all()
            .filter(|c| c.name.as_deref() == Some(name) && self.is_resolvable(c))
            .cloned()
            .collect()
    }

    /// 普通组件数量
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// 注册表是否为空
    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.decorators.is_empty() && self.interceptors.is_empty()
    }
}
