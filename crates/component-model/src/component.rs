//! 组件记录
//!
//! 定义引擎从类元数据构造组件记录，部署管线完成后不再变更

use crate::errors::ResolutionError;
use crate::injection::InjectionPoint;
use crate::qualifier::{effective_qualifiers, Qualifier};
use crate::scope::ScopeKind;
use crate::types::TypeKey;
use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// 组件实例的统一表示
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 组件实例工厂函数类型
pub type InstanceFactory = Arc<dyn Fn() -> Result<Instance, ResolutionError> + Send + Sync>;

/// 组件唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(uuid::Uuid);

impl ComponentId {
    /// 分配新的组件标识
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ComponentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 组件种类
///
/// 四个种类互斥，取代按继承层次区分组件类别的做法。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// 受管组件
    Managed,
    /// 企业组件
    Enterprise,
    /// 装饰器
    Decorator,
    /// 拦截器
    Interceptor,
}

/// 组件记录
///
/// 身份由声明类加可选名称构成。部署完成后记录只读，
/// 仅在进程关闭时销毁。
#[derive(Clone)]
pub struct Component {
    /// 组件标识
    pub id: ComponentId,
    /// 声明类全名
    pub class_name: String,
    /// 声明类的直接父类
    pub superclass: Option<String>,
    /// 组件种类
    pub kind: ComponentKind,
    /// 生命周期作用域
    pub scope: ScopeKind,
    /// 声明的限定符（有效集合在匹配时计算）
    pub qualifiers: HashSet<Qualifier>,
    /// 暴露的契约类型，至少包含自身类型
    pub contract_types: HashSet<TypeKey>,
    /// 组件名称
    pub name: Option<String>,
    /// 是否为备选组件
    pub alternative: bool,
    /// 是否为容器内部辅助组件
    pub internal: bool,
    /// 是否为生产者风格组件
    pub producer: bool,
    /// 是否具备钝化能力
    pub passivation_capable: bool,
    /// 被特化的目标类名
    pub specializes: Option<String>,
    /// 装饰器的委托契约类型
    pub delegate_type: Option<TypeKey>,
    /// 装饰器的委托限定符
    pub delegate_qualifiers: HashSet<Qualifier>,
    /// 拦截器绑定
    pub interceptor_bindings: HashSet<String>,
    /// 注入点列表（有序）
    pub injection_points: Vec<InjectionPoint>,
    /// 实例工厂
    pub factory: Option<InstanceFactory>,
}

impl Component {
    /// 创建新的组件记录，契约类型集合以自身类型起步
    pub fn new(class_name: impl Into<String>, kind: ComponentKind) -> Self {
        let class_name = class_name.into();
        let mut contract_types = HashSet::new();
        contract_types.insert(TypeKey::of(class_name.clone()));

        Self {
            id: ComponentId::new(),
            class_name,
            superclass: None,
            kind,
            scope: ScopeKind::default(),
            qualifiers: HashSet::new(),
            contract_types,
            name: None,
            alternative: false,
            internal: false,
            producer: false,
            passivation_capable: false,
            specializes: None,
            delegate_type: None,
            delegate_qualifiers: HashSet::new(),
            interceptor_bindings: HashSet::new(),
            injection_points: Vec::new(),
            factory: None,
        }
    }

    /// 设置作用域
    pub fn with_scope(mut self, scope: ScopeKind) -> Self {
        self.scope = scope;
        self
    }

    /// 添加限定符
    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifiers.insert(qualifier);
        self
    }

    /// 添加契约类型
    pub fn with_contract(mut self, contract: TypeKey) -> Self {
        self.contract_types.insert(contract);
        self
    }

    /// 设置名称
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// 设置直接父类
    pub fn with_superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    /// 标记为备选组件
    pub fn as_alternative(mut self) -> Self {
        self.alternative = true;
        self
    }

    /// 标记为容器内部辅助组件
    pub fn as_internal(mut self) -> Self {
        self.internal = true;
        self
    }

    /// 标记为生产者风格组件
    pub fn as_producer(mut self) -> Self {
        self.producer = true;
        self
    }

    /// 标记为具备钝化能力
    pub fn as_passivation_capable(mut self) -> Self {
        self.passivation_capable = true;
        self
    }

    /// 添加注入点
    pub fn with_injection_point(mut self, point: InjectionPoint) -> Self {
        self.injection_points.push(point);
        self
    }

    /// 设置实例工厂
    pub fn with_factory(mut self, factory: InstanceFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    /// 组件是否暴露指定契约类型
    pub fn has_contract(&self, requested: &TypeKey) -> bool {
        self.contract_types.contains(requested)
    }

    /// 组件的有效限定符是否覆盖规范化后的请求集合
    pub fn matches_qualifiers(&self, requested: &HashSet<Qualifier>) -> bool {
        let effective = effective_qualifiers(&self.qualifiers);
        requested.iter().all(|q| effective.contains(q))
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.id)
            .field("class_name", &self.class_name)
            .field("kind", &self.kind)
            .field("scope", &self.scope)
            .field("qualifiers", &self.qualifiers)
            .field("contract_types", &self.contract_types)
            .field("name", &self.name)
            .field("alternative", &self.alternative)
            .field("internal", &self.internal)
            .field("specializes", &self.specializes)
            .field("factory", &self.factory.as_ref().map(|_| "<function>"))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_always_exposes_its_own_type() {
        let component = Component::new("app::PaymentService", ComponentKind::Managed);
        assert!(component.has_contract(&TypeKey::of("app::PaymentService")));
        assert!(!component.contract_types.is_empty());
    }

    #[test]
    fn qualifier_matching_uses_effective_set() {
        let component = Component::new("app::PaymentService", ComponentKind::Managed);
        let default_request: HashSet<_> = [Qualifier::Default].into_iter().collect();
        let any_request: HashSet<_> = [Qualifier::Any].into_iter().collect();

        assert!(component.matches_qualifiers(&default_request));
        assert!(component.matches_qualifiers(&any_request));

        let qualified = Component::new("app::Backup", ComponentKind::Managed)
            .with_qualifier(Qualifier::custom("backup"));
        assert!(!qualified.matches_qualifiers(&default_request));
        assert!(qualified.matches_qualifiers(&any_request));
    }
}
