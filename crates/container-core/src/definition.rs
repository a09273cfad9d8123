//! 组件定义引擎
//!
//! 给定一个候选类的元数据，产出零个或一个组件。决策顺序：
//! 扩展否决优先；其次按受管组件条件定义；受管条件不满足且
//! 启用了企业组件发现时走企业路径；两者都不是则静默跳过。

use crate::bus::NotificationBus;
use crate::config::ContainerConfig;
use crate::registry::ComponentRegistry;
use component_model::{
    ClassMetadata, Component, ComponentKind, ConfigurationError, ConfigurationResult,
    DeploymentResult, InjectionPoint, NameRequest, Qualifier, ScopeKind, StereotypeRegistry,
    TypeKey,
};
use container_abstractions::{DeclarativeConfig, ProcessCandidate, ProcessInjectionTarget};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// 定义结果
#[derive(Debug)]
pub enum DefinitionOutcome {
    /// 类被定义为组件
    Defined(Arc<Component>),
    /// 类不是候选，静默跳过
    Skipped,
    /// 类被扩展否决
    Vetoed,
}

/// 候选类上聚合出的构造型缺省值
#[derive(Debug, Default)]
struct StereotypeDefaults {
    scopes: HashSet<ScopeKind>,
    alternative: bool,
    defaulted_name: bool,
    interceptor_bindings: Vec<String>,
}

/// 组件定义引擎
pub struct DefinitionEngine<'a> {
    config: ContainerConfig,
    stereotypes: &'a StereotypeRegistry,
    declarative: &'a DeclarativeConfig,
}

impl<'a> DefinitionEngine<'a> {
    /// 创建定义引擎
    pub fn new(
        config: ContainerConfig,
        stereotypes: &'a StereotypeRegistry,
        declarative: &'a DeclarativeConfig,
    ) -> Self {
        Self {
            config,
            stereotypes,
            declarative,
        }
    }

    /// 定义单个候选类
    pub fn define(
        &self,
        bus: &mut NotificationBus,
        registry: &mut ComponentRegistry,
        class: &ClassMetadata,
    ) -> DeploymentResult<DefinitionOutcome> {
        let mut event = ProcessCandidate::new(class.clone());
        bus.fire_process_candidate(&mut event)?;

        if event.is_vetoed() {
            debug!("候选类 {} 被扩展否决", class.class_name);
            return Ok(DefinitionOutcome::Vetoed);
        }
        let meta = event.into_metadata();

        if Self::is_managed_candidate(&meta) {
            self.check_managed_conditions(&meta)?;

            let kind = if meta.decorator {
                ComponentKind::Decorator
            } else if meta.interceptor {
                ComponentKind::Interceptor
            } else {
                ComponentKind::Managed
            };
            let mut component = self.assemble(&meta, kind)?;

            // 自定义注入目标优先于缺省策略
            let mut target_event = ProcessInjectionTarget::new(&meta.class_name);
            bus.fire_process_injection_target(&mut target_event)?;
            if let Some(factory) = target_event.into_factory() {
                component.factory = Some(factory);
            }

            let arc = registry.add(component);
            debug!("定义受管组件: {} ({:?})", arc.class_name, arc.kind);
            Ok(DefinitionOutcome::Defined(arc))
        } else if self.config.enterprise_discovery && meta.enterprise {
            let component = self.assemble(&meta, ComponentKind::Enterprise)?;
            let arc = registry.add(component);
            debug!("定义企业组件: {}", arc.class_name);
            Ok(DefinitionOutcome::Defined(arc))
        } else {
            Ok(DefinitionOutcome::Skipped)
        }
    }

    /// 受管组件的候选条件
    fn is_managed_candidate(meta: &ClassMetadata) -> bool {
        meta.concrete && !meta.anonymous && meta.accessible_constructor && !meta.enterprise
    }

    /// 受管组件的定义条件，违反即致命
    fn check_managed_conditions(&self, meta: &ClassMetadata) -> ConfigurationResult<()> {
        let distinct_scopes: HashSet<ScopeKind> = meta.scopes.iter().copied().collect();
        if distinct_scopes.len() > 1 {
            return Err(ConfigurationError::ConflictingScopes {
                class: meta.class_name.clone(),
            });
        }
        if meta.decorator && meta.interceptor {
            return Err(ConfigurationError::ConflictingKinds {
                class: meta.class_name.clone(),
            });
        }
        if meta.decorator && meta.delegate_type.is_none() {
            return Err(ConfigurationError::definition(format!(
                "装饰器 {} 没有声明委托注入点",
                meta.class_name
            )));
        }
        Ok(())
    }

    /// 从元数据组装组件记录
    fn assemble(&self, meta: &ClassMetadata, kind: ComponentKind) -> ConfigurationResult<Component> {
        let defaults = self.collect_stereotype_defaults(meta);
        let override_ = self.declarative.override_for(&meta.class_name);

        // 作用域优先级：声明式覆盖 > 显式声明 > 构造型缺省 > 依赖作用域
        let scope = match override_.and_then(|o| o.scope) {
            Some(scope) => scope,
            None => match meta.scopes.first() {
                Some(scope) => *scope,
                None => {
                    if defaults.scopes.len() > 1 {
                        return Err(ConfigurationError::ConflictingScopes {
                            class: meta.class_name.clone(),
                        });
                    }
                    defaults.scopes.iter().next().copied().unwrap_or_default()
                }
            },
        };

        // 名称优先级：声明式覆盖 > 显式声明 > 约定推导
        let name = override_.and_then(|o| o.name.clone()).or_else(|| match &meta.name {
            Some(NameRequest::Explicit(name)) => Some(name.clone()),
            Some(NameRequest::Defaulted) => Some(meta.conventional_name()),
            None => defaults.defaulted_name.then(|| meta.conventional_name()),
        });

        let alternative = override_
            .and_then(|o| o.alternative)
            .unwrap_or(meta.alternative || defaults.alternative);

        let mut component = Component::new(meta.class_name.clone(), kind).with_scope(scope);

        if let Some(superclass) = &meta.superclass {
            component = component
                .with_superclass(superclass.clone())
                .with_contract(TypeKey::of(superclass.clone()));
        }
        for interface in &meta.interfaces {
            component = component.with_contract(TypeKey::of(interface.clone()));
        }

        for qualifier in &meta.qualifiers {
            component = component.with_qualifier(qualifier.clone());
        }
        if let Some(override_) = override_ {
            for qualifier in &override_.qualifiers {
                component = component.with_qualifier(qualifier.clone());
            }
        }
        if let Some(name) = &name {
            component = component
                .with_name(name.clone())
                .with_qualifier(Qualifier::named(name.clone()));
        }

        if alternative {
            component = component.as_alternative();
        }
        if meta.producer {
            component = component.as_producer();
        }
        if meta.passivation_capable {
            component = component.as_passivation_capable();
        }

        let specializes = meta.specializes
            || self.declarative.declares_specialization(&meta.class_name);
        if specializes {
            component.specializes = meta.superclass.clone();
        }

        component.delegate_type = meta.delegate_type.clone();
        component.delegate_qualifiers = meta.delegate_qualifiers.iter().cloned().collect();
        component.interceptor_bindings = meta
            .interceptor_bindings
            .iter()
            .cloned()
            .chain(defaults.interceptor_bindings)
            .collect();

        for point in &meta.injection_points {
            component = component.with_injection_point(InjectionPoint {
                owner_class: meta.class_name.clone(),
                requested_type: point.requested_type.clone(),
                qualifiers: point.qualifiers.iter().cloned().collect(),
                delegate: point.delegate,
            });
        }

        Ok(component)
    }

    /// 聚合类声明的全部构造型缺省值
    fn collect_stereotype_defaults(&self, meta: &ClassMetadata) -> StereotypeDefaults {
        let mut defaults = StereotypeDefaults::default();
        for name in &meta.stereotypes {
            let Some(stereotype) = self.stereotypes.get(name) else {
                debug!("类 {} 声明了未注册的构造型 {}", meta.class_name, name);
                continue;
            };
            if let Some(scope) = stereotype.default_scope {
                defaults.scopes.insert(scope);
            }
            defaults.alternative |= stereotype.alternative;
            defaults.defaulted_name |= stereotype.defaulted_name;
            defaults
                .interceptor_bindings
                .extend(stereotype.interceptor_bindings.iter().cloned());
        }
        defaults
    }
}
