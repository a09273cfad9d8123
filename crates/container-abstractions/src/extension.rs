//! 扩展通知总线契约
//!
//! 观察者按固定顺序收到发现前、处理候选类、处理注入目标、
//! 发现后、校验后五类通知；一轮通知内报告的错误被收集起来，
//! 轮末一次性使部署失败

use component_model::{
    ClassMetadata, Component, ExtensionError, InstanceFactory, Stereotype,
};

/// 发现前事件
///
/// 观察者可以在扫描开始前追加候选类和构造型。
#[derive(Debug, Default)]
pub struct BeforeDiscovery {
    /// 追加的候选类
    pub added_classes: Vec<ClassMetadata>,
    /// 追加的构造型
    pub added_stereotypes: Vec<Stereotype>,
    /// 收集的错误
    pub errors: Vec<ExtensionError>,
}

impl BeforeDiscovery {
    /// 追加候选类
    pub fn add_class(&mut self, class: ClassMetadata) {
        self.added_classes.push(class);
    }

    /// 追加构造型
    pub fn add_stereotype(&mut self, stereotype: Stereotype) {
        self.added_stereotypes.push(stereotype);
    }

    /// 报告错误
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(ExtensionError::new(message));
    }
}

/// 处理候选类事件
///
/// 观察者可以否决定义或替换元数据；否决后不再做任何处理。
#[derive(Debug)]
pub struct ProcessCandidate {
    metadata: ClassMetadata,
    vetoed: bool,
    /// 收集的错误
    pub errors: Vec<ExtensionError>,
}

impl ProcessCandidate {
    /// 创建事件
    pub fn new(metadata: ClassMetadata) -> Self {
        Self {
            metadata,
            vetoed: false,
            errors: Vec::new(),
        }
    }

    /// 当前元数据
    pub fn metadata(&self) -> &ClassMetadata {
        &self.metadata
    }

    /// 替换元数据
    pub fn set_metadata(&mut self, metadata: ClassMetadata) {
        self.metadata = metadata;
    }

    /// 否决该类的定义
    pub fn veto(&mut self) {
        self.vetoed = true;
    }

    /// 是否已被否决
    pub fn is_vetoed(&self) -> bool {
        self.vetoed
    }

    /// 报告错误
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(ExtensionError::new(message));
    }

    /// 消费事件取出元数据
    pub fn into_metadata(self) -> ClassMetadata {
        self.metadata
    }
}

/// 处理注入目标事件
///
/// 观察者设置的自定义实例工厂优先于缺省定义策略。
pub struct ProcessInjectionTarget {
    /// 目标类全名
    pub class_name: String,
    factory: Option<InstanceFactory>,
    /// 收集的错误
    pub errors: Vec<ExtensionError>,
}

impl ProcessInjectionTarget {
    /// 创建事件
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            factory: None,
            errors: Vec::new(),
        }
    }

    /// 设置自定义实例工厂
    pub fn set_factory(&mut self, factory: InstanceFactory) {
        self.factory = Some(factory);
    }

    /// 是否设置了自定义工厂
    pub fn is_set(&self) -> bool {
        self.factory.is_some()
    }

    /// 报告错误
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(ExtensionError::new(message));
    }

    /// 消费事件取出自定义工厂
    pub fn into_factory(self) -> Option<InstanceFactory> {
        self.factory
    }
}

/// 发现后事件
///
/// 观察者可以向注册表追加程序化构造的组件。
#[derive(Debug, Default)]
pub struct AfterDiscovery {
    /// 追加的组件
    pub added_components: Vec<Component>,
    /// 收集的错误
    pub errors: Vec<ExtensionError>,
}

impl AfterDiscovery {
    /// 追加组件
    pub fn add_component(&mut self, component: Component) {
        self.added_components.push(component);
    }

    /// 报告错误
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(ExtensionError::new(message));
    }
}

/// 校验后事件
#[derive(Debug, Default)]
pub struct AfterValidation {
    /// 收集的错误
    pub errors: Vec<ExtensionError>,
}

impl AfterValidation {
    /// 报告错误
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(ExtensionError::new(message));
    }
}

/// 容器扩展 trait
///
/// 所有钩子都有空缺省实现，观察者只需覆写关心的通知。
pub trait ContainerExtension: Send + Sync {
    /// 扩展名称，用于日志
    fn name(&self) -> &str;

    /// 发现开始前触发
    fn before_discovery(&mut self, _event: &mut BeforeDiscovery) {}

    /// 每个候选类定义前触发
    fn process_candidate(&mut self, _event: &mut ProcessCandidate) {}

    /// 支持容器管理注入的组件定义时触发
    fn process_injection_target(&mut self, _event: &mut ProcessInjectionTarget) {}

    /// 发现结束后触发
    fn after_discovery(&mut self, _event: &mut AfterDiscovery) {}

    /// 部署校验完成后触发
    fn after_validation(&mut self, _event: &mut AfterValidation) {}
}
