//! # Container Core
//!
//! 容器核心实现：组件注册表、类型与限定符解析器、特化解析器、
//! 组件定义引擎、作用域上下文管理器、校验引擎和部署管线。
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use component_model::{ClassMetadata, TypeKey};
//! use container_core::{ContainerConfig, Deployer, StaticDiscoveryService};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 组装发现快照
//!     let discovery = StaticDiscoveryService::new()
//!         .with_class(ClassMetadata::new("app::PaymentService"));
//!
//!     // 部署容器
//!     let mut deployer = Deployer::new(ContainerConfig::default());
//!     let container = deployer.deploy(&discovery)?;
//!
//!     // 稳态查找
//!     let component = container.select(&TypeKey::of("app::PaymentService"), &[])?;
//!     println!("解析到组件: {}", component.class_name);
//!
//!     Ok(())
//! }
//! ```

pub mod bus;
pub mod config;
pub mod container;
pub mod context;
pub mod definition;
pub mod deployer;
pub mod discovery;
pub mod proxy;
pub mod readers;
pub mod registry;
pub mod resolver;
pub mod specialization;
pub mod validation;

pub use bus::NotificationBus;
pub use config::ContainerConfig;
pub use container::ContainerContext;
pub use context::{ContextManager, InstanceContext};
pub use definition::{DefinitionEngine, DefinitionOutcome};
pub use deployer::{Deployer, DeploymentPhase};
pub use discovery::StaticDiscoveryService;
pub use proxy::{HandleProxyFactory, ProxyHandle};
pub use readers::{JsonConfigReader, TomlConfigReader};
pub use registry::ComponentRegistry;
pub use resolver::InjectionResolver;
pub use specialization::check_specializations;
pub use validation::{ValidationEngine, ValidationOutput};
