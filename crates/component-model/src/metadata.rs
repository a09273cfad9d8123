//! 类元数据描述符
//!
//! 发现边界在扫描阶段产出这些纯数据结构，定义引擎只消费描述符，
//! 不做任何运行时反射

use crate::qualifier::Qualifier;
use crate::scope::ScopeKind;
use crate::stereotype::Stereotype;
use crate::types::TypeKey;

/// 组件名称请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameRequest {
    /// 请求按约定推导名称（类简单名首字母小写）
    Defaulted,
    /// 显式声明的名称
    Explicit(String),
}

/// 注入点声明
#[derive(Debug, Clone)]
pub struct InjectionPointMeta {
    /// 请求的契约类型
    pub requested_type: TypeKey,
    /// 请求的限定符
    pub qualifiers: Vec<Qualifier>,
    /// 是否为委托注入点（仅装饰器合法）
    pub delegate: bool,
}

impl InjectionPointMeta {
    /// 创建新的注入点声明
    pub fn new(requested_type: TypeKey) -> Self {
        Self {
            requested_type,
            qualifiers: Vec::new(),
            delegate: false,
        }
    }

    /// 添加限定符
    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifiers.push(qualifier);
        self
    }

    /// 标记为委托注入点
    pub fn delegate(mut self) -> Self {
        self.delegate = true;
        self
    }
}

/// 类元数据描述符
///
/// 候选类经过元数据抽取后的完整描述。`interfaces` 携带类满足的
/// 全部传递契约名（接口和间接祖先），`superclass` 为 `None` 表示
/// 直接父类就是根对象类型。
#[derive(Debug, Clone)]
pub struct ClassMetadata {
    /// 类全名（含模块路径）
    pub class_name: String,
    /// 直接父类名
    pub superclass: Option<String>,
    /// 实现的契约名（传递闭包）
    pub interfaces: Vec<String>,
    /// 是否为具体类
    pub concrete: bool,
    /// 是否为匿名类
    pub anonymous: bool,
    /// 是否有可访问的构造函数
    pub accessible_constructor: bool,
    /// 声明的作用域
    pub scopes: Vec<ScopeKind>,
    /// 声明的限定符
    pub qualifiers: Vec<Qualifier>,
    /// 声明的构造型名称
    pub stereotypes: Vec<String>,
    /// 名称请求
    pub name: Option<NameRequest>,
    /// 是否声明为备选组件
    pub alternative: bool,
    /// 是否声明为特化组件
    pub specializes: bool,
    /// 是否声明为装饰器
    pub decorator: bool,
    /// 是否声明为拦截器
    pub interceptor: bool,
    /// 是否符合企业组件约定
    pub enterprise: bool,
    /// 是否为生产者风格组件
    pub producer: bool,
    /// 是否具备钝化能力（序列化安全）
    pub passivation_capable: bool,
    /// 装饰器的委托契约类型
    pub delegate_type: Option<TypeKey>,
    /// 装饰器的委托限定符
    pub delegate_qualifiers: Vec<Qualifier>,
    /// 拦截器绑定
    pub interceptor_bindings: Vec<String>,
    /// 注入点声明
    pub injection_points: Vec<InjectionPointMeta>,
    /// 该类定义的构造型（构造型定义类专用）
    pub stereotype_definition: Option<Stereotype>,
}

impl ClassMetadata {
    /// 创建新的类元数据，缺省为具体类且构造函数可访问
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            superclass: None,
            interfaces: Vec::new(),
            concrete: true,
            anonymous: false,
            accessible_constructor: true,
            scopes: Vec::new(),
            qualifiers: Vec::new(),
            stereotypes: Vec::new(),
            name: None,
            alternative: false,
            specializes: false,
            decorator: false,
            interceptor: false,
            enterprise: false,
            producer: false,
            passivation_capable: false,
            delegate_type: None,
            delegate_qualifiers: Vec::new(),
            interceptor_bindings: Vec::new(),
            injection_points: Vec::new(),
            stereotype_definition: None,
        }
    }

    /// 设置直接父类
    pub fn with_superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    /// 添加实现的契约
    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// 添加声明的作用域
    pub fn with_scope(mut self, scope: ScopeKind) -> Self {
        self.scopes.push(scope);
        self
    }

    /// 添加声明的限定符
    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifiers.push(qualifier);
        self
    }

    /// 添加构造型声明
    pub fn with_stereotype(mut self, stereotype: impl Into<String>) -> Self {
        self.stereotypes.push(stereotype.into());
        self
    }

    /// 请求按约定推导名称
    pub fn with_defaulted_name(mut self) -> Self {
        self.name = Some(NameRequest::Defaulted);
        self
    }

    /// 显式声明名称
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(NameRequest::Explicit(name.into()));
        self
    }

    /// 标记为备选组件
    pub fn alternative(mut self) -> Self {
        self.alternative = true;
        self
    }

    /// 标记为特化组件
    pub fn specializes(mut self) -> Self {
        self.specializes = true;
        self
    }

    /// 标记为装饰器并设置委托契约
    pub fn decorator(mut self, delegate_type: TypeKey) -> Self {
        self.decorator = true;
        self.delegate_type = Some(delegate_type.clone());
        self.injection_points
            .push(InjectionPointMeta::new(delegate_type).delegate());
        self
    }

    /// 标记为拦截器
    pub fn interceptor(mut self, binding: impl Into<String>) -> Self {
        self.interceptor = true;
        self.interceptor_bindings.push(binding.into());
        self
    }

    /// 标记为企业组件
    pub fn enterprise(mut self) -> Self {
        self.enterprise = true;
        self
    }

    /// 标记为生产者风格组件
    pub fn producer(mut self) -> Self {
        self.producer = true;
        self
    }

    /// 标记为具备钝化能力
    pub fn passivation_capable(mut self) -> Self {
        self.passivation_capable = true;
        self
    }

    /// 标记为抽象类
    pub fn abstract_class(mut self) -> Self {
        self.concrete = false;
        self
    }

    /// 标记为匿名类
    pub fn anonymous_class(mut self) -> Self {
        self.anonymous = true;
        self
    }

    /// 标记构造函数不可访问
    pub fn inaccessible_constructor(mut self) -> Self {
        self.accessible_constructor = false;
        self
    }

    /// 添加拦截器绑定
    pub fn with_interceptor_binding(mut self, binding: impl Into<String>) -> Self {
        self.interceptor_bindings.push(binding.into());
        self
    }

    /// 添加注入点声明
    pub fn with_injection_point(mut self, point: InjectionPointMeta) -> Self {
        self.injection_points.push(point);
        self
    }

    /// 设置该类定义的构造型
    pub fn defines_stereotype(mut self, stereotype: Stereotype) -> Self {
        self.stereotype_definition = Some(stereotype);
        self
    }

    /// 获取简短的类名（不包含模块路径）
    pub fn simple_name(&self) -> &str {
        self.class_name.split("::").last().unwrap_or(&self.class_name)
    }

    /// 按约定推导的组件名称
    pub fn conventional_name(&self) -> String {
        let simple = self.simple_name();
        let mut chars = simple.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_lowercase().collect::<String>() + chars.as_str()
        })
    }
}
