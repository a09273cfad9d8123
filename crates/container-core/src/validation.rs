//! 部署校验引擎
//!
//! 特化解析之后运行一次，顺序是装饰器、拦截器、其余组件：
//! 装饰器和拦截器先校验，它们产出的栈数据会被后续组件引用。

use crate::registry::ComponentRegistry;
use crate::resolver::InjectionResolver;
use component_model::{
    effective_qualifiers, Component, ComponentId, ComponentKind, ConfigurationError,
    DeploymentError, DeploymentResult,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// 校验产出：按组件缓存的装饰器栈和拦截器栈
#[derive(Debug, Default)]
pub struct ValidationOutput {
    /// 装饰器栈，按特异性和声明顺序排序
    pub decorator_stacks: HashMap<ComponentId, Vec<ComponentId>>,
    /// 拦截器栈，按声明顺序排序
    pub interceptor_stacks: HashMap<ComponentId, Vec<ComponentId>>,
}

/// 部署校验引擎
pub struct ValidationEngine<'a> {
    registry: &'a ComponentRegistry,
}

impl<'a> ValidationEngine<'a> {
    /// 创建校验引擎
    pub fn new(registry: &'a ComponentRegistry) -> Self {
        Self { registry }
    }

    /// 校验全部组件的注入点、钝化能力和名称约束
    pub fn validate(&self) -> DeploymentResult<ValidationOutput> {
        debug!("注入点校验开始");
        let mut output = ValidationOutput::default();

        debug!("装饰器注入点校验开始");
        for decorator in self.registry.decorators() {
            self.validate_component(decorator, &mut output)?;
        }

        debug!("拦截器注入点校验开始");
        for interceptor in self.registry.interceptors() {
            self.validate_component(interceptor, &mut output)?;
        }

        for component in self.registry.components() {
            if self.registry.is_suppressed(component.id) {
                continue;
            }
            self.validate_component(component, &mut output)?;
        }

        self.validate_names()?;

        info!("注入点校验完成");
        Ok(output)
    }

    /// 校验单个组件
    fn validate_component(
        &self,
        component: &Arc<Component>,
        output: &mut ValidationOutput,
    ) -> DeploymentResult<()> {
        // 装饰器、拦截器和内部辅助组件自身不套栈
        if !matches!(
            component.kind,
            ComponentKind::Decorator | ComponentKind::Interceptor
        ) && !component.internal
        {
            output
                .decorator_stacks
                .insert(component.id, self.decorator_stack(component));
            output
                .interceptor_stacks
                .insert(component.id, self.interceptor_stack(component));
        }

        self.check_passivation(component)?;

        let resolver = InjectionResolver::new(self.registry);
        for point in &component.injection_points {
            if point.delegate {
                if component.kind != ComponentKind::Decorator {
                    return Err(ConfigurationError::DelegateOnNonDecorator {
                        class: component.class_name.clone(),
                        injection_point: point.to_string(),
                    }
                    .into());
                }
            } else {
                resolver
                    .check_injection_point(point)
                    .map_err(DeploymentError::from)?;
            }
        }

        Ok(())
    }

    /// 计算组件的装饰器栈
    ///
    /// 委托契约命中且委托限定符被覆盖的装饰器适用；
    /// 特异性（委托限定符数量）优先，其次按声明顺序。
    fn decorator_stack(&self, component: &Component) -> Vec<ComponentId> {
        let effective = effective_qualifiers(&component.qualifiers);
        let mut applicable: Vec<(usize, &Arc<Component>)> = self
            .registry
            .decorators()
            .iter()
            .enumerate()
            .filter(|(_, decorator)| {
                decorator
                    .delegate_type
                    .as_ref()
                    .is_some_and(|delegate| component.has_contract(delegate))
                    && decorator
                        .delegate_qualifiers
                        .iter()
                        .all(|q| effective.contains(q))
            })
            .collect();

        applicable.sort_by(|(left_idx, left), (right_idx, right)| {
            right
                .delegate_qualifiers
                .len()
                .cmp(&left.delegate_qualifiers.len())
                .then(left_idx.cmp(right_idx))
        });

        applicable.into_iter().map(|(_, d)| d.id).collect()
    }

    /// 计算组件的拦截器栈，绑定集合被覆盖的拦截器按声明顺序适用
    fn interceptor_stack(&self, component: &Component) -> Vec<ComponentId> {
        self.registry
            .interceptors()
            .iter()
            .filter(|interceptor| {
                !interceptor.interceptor_bindings.is_empty()
                    && interceptor
                        .interceptor_bindings
                        .iter()
                        .all(|b| component.interceptor_bindings.contains(b))
            })
            .map(|interceptor| interceptor.id)
            .collect()
    }

    /// 钝化能力检查
    ///
    /// 钝化作用域中的组件必须具备钝化能力，生产者风格组件豁免
    /// （其产物的能力单独校验）。存活下来的钝化作用域组件和标记
    /// 了钝化能力的企业组件还要检查依赖：未经代理的依赖必须同样
    /// 具备钝化能力。
    fn check_passivation(&self, component: &Component) -> DeploymentResult<()> {
        let check_dependencies = if component.kind == ComponentKind::Enterprise {
            component.passivation_capable
        } else if component.scope.is_passivating() {
            if !component.passivation_capable && !component.producer {
                return Err(ConfigurationError::NotPassivationCapable {
                    class: component.class_name.clone(),
                    scope: component.scope.to_string(),
                }
                .into());
            }
            true
        } else {
            false
        };

        if !check_dependencies {
            return Ok(());
        }

        let resolver = InjectionResolver::new(self.registry);
        for point in &component.injection_points {
            if point.delegate {
                continue;
            }
            if let Ok(dependency) = resolver.check_injection_point(point) {
                if !dependency.passivation_capable && !dependency.scope.is_normal() {
                    return Err(ConfigurationError::PassivationIncapableDependency {
                        class: component.class_name.clone(),
                        dependency: dependency.class_name.clone(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    /// 名称约束检查
    ///
    /// 两个组件同名且按名称解析在备选决胜后仍多于一个时致命；
    /// 一个名称是另一个名称的点分隔严格前缀时无条件致命。
    fn validate_names(&self) -> DeploymentResult<()> {
        let names: HashSet<String> = self
            .registry
            .all()
            .filter(|c| self.registry.is_resolvable(c))
            .filter_map(|c| c.name.clone())
            .collect();

        let resolver = InjectionResolver::new(self.registry);
        for name in &names {
            let found = resolver.resolve_by_name(name);
            if found.len() > 1 {
                let surviving = resolver.retain_alternatives(found);
                if surviving.len() > 1 {
                    return Err(ConfigurationError::DuplicateName { name: name.clone() }.into());
                }
            }
        }

        for name in &names {
            for other in &names {
                if name != other && is_dot_prefix(other, name) {
                    return Err(ConfigurationError::NameShadowed {
                        shadowed: other.clone(),
                        shadowing: name.clone(),
                    }
                    .into());
                }
            }
        }

        Ok(())
    }
}

/// `prefix` 是否为 `full` 的点分隔严格前缀
fn is_dot_prefix(prefix: &str, full: &str) -> bool {
    full.len() > prefix.len()
        && full.starts_with(prefix)
        && full[prefix.len()..].starts_with('.')
}
