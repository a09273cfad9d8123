//! 类型与限定符解析器
//!
//! 按契约类型和限定符过滤注册表，对多候选结果套用
//! 备选优先和特化消除两条决胜规则

use crate::registry::ComponentRegistry;
use component_model::{
    normalize_request, Component, InjectionPoint, Qualifier, ResolutionError, ResolutionResult,
    TypeKey,
};
use std::collections::HashSet;
use std::sync::Arc;

/// 注入解析器
///
/// 借用注册表做只读解析，部署校验和稳态查找共用同一条路径。
pub struct InjectionResolver<'a> {
    registry: &'a ComponentRegistry,
}

impl<'a> InjectionResolver<'a> {
    /// 创建解析器
    pub fn new(registry: &'a ComponentRegistry) -> Self {
        Self { registry }
    }

    /// 按契约类型和限定符解析候选组件集合
    ///
    /// 含未解析类型变量的请求类型是调用方错误。候选多于一个时
    /// 依次套用备选优先和特化消除；剩余数量由调用方裁决。
    pub fn resolve_by_type(
        &self,
        requested: &TypeKey,
        requested_qualifiers: &[Qualifier],
    ) -> ResolutionResult<Vec<Arc<Component>>> {
        if requested.contains_variable() {
            return Err(ResolutionError::IllegalRequestType {
                type_key: requested.to_string(),
            });
        }

        let normalized = normalize_request(requested_qualifiers);
        let mut candidates: Vec<Arc<Component>> = self
            .registry
            .components()
            .iter()
            .filter(|c| {
                self.registry.is_resolvable(c)
                    && c.has_contract(requested)
                    && c.matches_qualifiers(&normalized)
            })
            .cloned()
            .collect();

        if candidates.len() > 1 {
            candidates = self.retain_alternatives(candidates);
        }
        if candidates.len() > 1 {
            candidates = Self::retain_specializing(candidates);
        }

        Ok(candidates)
    }

    /// 解析出唯一组件，零候选和多候选分别映射为两种失败
    pub fn select_by_type(
        &self,
        requested: &TypeKey,
        requested_qualifiers: &[Qualifier],
    ) -> ResolutionResult<Arc<Component>> {
        let mut candidates = self.resolve_by_type(requested, requested_qualifiers)?;
        match candidates.len() {
            0 => Err(ResolutionError::Unsatisfied {
                request: render_request(requested, requested_qualifiers),
            }),
            1 => Ok(candidates.remove(0)),
            n => Err(ResolutionError::Ambiguous {
                request: render_request(requested, requested_qualifiers),
                candidates: n,
            }),
        }
    }

    /// 按声明名称精确解析
    pub fn resolve_by_name(&self, name: &str) -> Vec<Arc<Component>> {
        self.registry.by_name(name)
    }

    /// 按名称解析出至多一个组件
    ///
    /// 无匹配返回 `None`；多个匹配先按备选决胜，仍多于一个则歧义。
    pub fn select_by_name(&self, name: &str) -> ResolutionResult<Option<Arc<Component>>> {
        let mut found = self.resolve_by_name(name);
        if found.is_empty() {
            return Ok(None);
        }
        if found.len() > 1 {
            found = self.retain_alternatives(found);
        }
        if found.len() > 1 {
            return Err(ResolutionError::Ambiguous {
                request: format!("name:{name}"),
                candidates: found.len(),
            });
        }
        Ok(Some(found.remove(0)))
    }

    /// 备选优先决胜
    ///
    /// 候选中存在已启用的备选组件时，淘汰所有非备选候选。
    pub fn retain_alternatives(&self, candidates: Vec<Arc<Component>>) -> Vec<Arc<Component>> {
        let alternatives: Vec<Arc<Component>> = candidates
            .iter()
            .filter(|c| self.registry.is_alternative_enabled(c))
            .cloned()
            .collect();

        if alternatives.is_empty() {
            candidates
        } else {
            alternatives
        }
    }

    /// 特化消除决胜
    ///
    /// 候选中某个组件特化了另一个候选时，被特化者出局。
    fn retain_specializing(candidates: Vec<Arc<Component>>) -> Vec<Arc<Component>> {
        let specialized: HashSet<&str> = candidates
            .iter()
            .filter_map(|c| c.specializes.as_deref())
            .collect();

        candidates
            .iter()
            .filter(|c| !specialized.contains(c.class_name.as_str()))
            .cloned()
            .collect()
    }

    /// 校验单个注入点，运行完整的解析路径
    pub fn check_injection_point(&self, point: &InjectionPoint) -> ResolutionResult<Arc<Component>> {
        let qualifiers: Vec<Qualifier> = point.qualifiers.iter().cloned().collect();
        self.select_by_type(&point.requested_type, &qualifiers)
    }
}

/// 渲染请求描述，用于诊断信息
fn render_request(requested: &TypeKey, qualifiers: &[Qualifier]) -> String {
    if qualifiers.is_empty() {
        requested.to_string()
    } else {
        let mut rendered: Vec<String> = qualifiers.iter().map(ToString::to_string).collect();
        rendered.sort();
        format!("{requested} [{}]", rendered.join(", "))
    }
}
