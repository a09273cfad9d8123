//! 错误类型定义

use thiserror::Error;

/// 配置错误类型
///
/// 组件元数据自相矛盾或声明式配置非法时产生，部署期间一律致命。
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("部署档案中存在两个同名组件: {name}")]
    DuplicateName { name: String },

    #[error("组件名称 {shadowing} 遮蔽了组件名称 {shadowed}")]
    NameShadowed { shadowed: String, shadowing: String },

    #[error("祖先类 {ancestor} 被多个组件特化")]
    InconsistentSpecialization { ancestor: String },

    #[error("特化组件 {class} 的直接父类是根对象类型")]
    TrivialSpecialization { class: String },

    #[error("特化组件 {special} 与被特化组件 {general} 都声明了名称")]
    SpecializationNameClash { special: String, general: String },

    #[error("类 {class} 声明了多个互相冲突的作用域")]
    ConflictingScopes { class: String },

    #[error("类 {class} 同时声明为装饰器和拦截器")]
    ConflictingKinds { class: String },

    #[error("非装饰器组件 {class} 声明了委托注入点: {injection_point}")]
    DelegateOnNonDecorator {
        class: String,
        injection_point: String,
    },

    #[error("钝化作用域 {scope} 中的组件 {class} 不具备钝化能力")]
    NotPassivationCapable { class: String, scope: String },

    #[error("组件 {class} 的依赖 {dependency} 不具备钝化能力")]
    PassivationIncapableDependency { class: String, dependency: String },

    #[error("配置源 {name} 读取失败: {source}")]
    SourceRead {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("配置源 {name} 解析失败: {message}")]
    SourceParse { name: String, message: String },

    #[error("没有支持配置源 {name} 的读取器")]
    UnsupportedSource { name: String },

    #[error("未知的作用域标识: {value}")]
    UnknownScope { value: String },

    #[error("组件定义失败: {message}")]
    Definition { message: String },
}

impl ConfigurationError {
    /// 创建组件定义错误
    pub fn definition(message: impl Into<String>) -> Self {
        Self::Definition {
            message: message.into(),
        }
    }

    /// 创建配置源解析错误
    pub fn source_parse(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceParse {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// 解析错误类型
///
/// 部署校验期间致命；稳态运行期查找则作为类型化失败返回给调用方。
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("依赖无法满足: {request} 没有任何候选组件")]
    Unsatisfied { request: String },

    #[error("依赖解析歧义: {request} 在决胜后仍有 {candidates} 个候选组件")]
    Ambiguous { request: String, candidates: usize },

    #[error("请求类型 {type_key} 含有未解析的类型变量")]
    IllegalRequestType { type_key: String },

    #[error("组件 {class} 没有实例工厂")]
    NoFactory { class: String },
}

/// 上下文错误类型
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("作用域 {scope} 在当前执行单元内没有活动上下文")]
    NotActive { scope: String },

    #[error("作用域 {scope} 存在多个活动上下文")]
    MultipleActive { scope: String },
}

/// 扩展观察者报告的单条错误
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct ExtensionError {
    /// 错误描述
    pub message: String,
}

impl ExtensionError {
    /// 创建新的扩展错误
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 部署错误类型
///
/// 部署管线内的一切致命错误最终包装为这个类型，携带原始原因链。
#[derive(Error, Debug)]
pub enum DeploymentError {
    #[error("部署配置错误: {source}")]
    Configuration {
        #[from]
        source: ConfigurationError,
    },

    #[error("部署校验失败: {source}")]
    Validation {
        #[from]
        source: ResolutionError,
    },

    #[error("通知轮 {round} 收集到 {} 个扩展错误: {}", .errors.len(), format_extension_errors(.errors))]
    ExtensionRound {
        round: String,
        errors: Vec<ExtensionError>,
    },

    #[error("部署阶段顺序被破坏: 期望 {expected}, 实际 {actual}")]
    PhaseOrder { expected: String, actual: String },
}

fn format_extension_errors(errors: &[ExtensionError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// 稳态运行期容器错误类型
#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("解析错误: {source}")]
    Resolution {
        #[from]
        source: ResolutionError,
    },

    #[error("上下文错误: {source}")]
    Context {
        #[from]
        source: ContextError,
    },
}

/// 结果类型别名
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;
pub type ResolutionResult<T> = Result<T, ResolutionError>;
pub type ContextResult<T> = Result<T, ContextError>;
pub type DeploymentResult<T> = Result<T, DeploymentError>;
pub type ContainerResult<T> = Result<T, ContainerError>;
