//! 部署管线
//!
//! 驱动发现、定义、特化和校验的完整顺序，整个过程单线程执行、
//! 恰好运行一次。管线中途任何失败都使整次部署作废并包装成单个
//! 部署错误向上抛出；成功之后重复调用是空操作。

use crate::bus::NotificationBus;
use crate::config::ContainerConfig;
use crate::container::ContainerContext;
use crate::definition::{DefinitionEngine, DefinitionOutcome};
use crate::proxy::HandleProxyFactory;
use crate::readers::{JsonConfigReader, TomlConfigReader};
use crate::registry::ComponentRegistry;
use crate::specialization::check_specializations;
use crate::validation::ValidationEngine;
use component_model::{
    ClassMetadata, Component, ComponentKind, ConfigurationError, DeploymentError,
    DeploymentResult, StereotypeRegistry,
};
use container_abstractions::{
    ConfigSource, ConfigSourceReader, ContainerExtension, DeclarativeConfig, DiscoveryService,
    ProxyFactory,
};
use std::sync::Arc;
use tracing::{debug, error, info};

/// 部署阶段
///
/// 转移严格顺序进行，任何阶段都不得跳过或重排：后面的阶段依赖
/// 前面阶段建立的注册表状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentPhase {
    /// 尚未开始
    NotStarted,
    /// 扩展已装载
    ExtensionsLoaded,
    /// 引导组件已注册
    BootstrapRegistered,
    /// 发现前通知已触发
    BeforeDiscoveryFired,
    /// 声明式配置已部署
    DeclarativeDeployed,
    /// 构造型已检查
    StereotypesChecked,
    /// 缺省组件已配置
    DefaultComponentsConfigured,
    /// 类路径候选已部署
    ClasspathDeployed,
    /// 扩展追加的类型已部署
    AdditionalTypesDeployed,
    /// 特化约束已检查
    SpecializationsChecked,
    /// 发现后通知已触发
    AfterDiscoveryFired,
    /// 校验已完成
    Validated,
    /// 校验后通知已触发
    AfterValidationFired,
    /// 部署完成
    Deployed,
}

impl DeploymentPhase {
    /// 序列中的下一个阶段
    fn next(self) -> Option<Self> {
        match self {
            Self::NotStarted => Some(Self::ExtensionsLoaded),
            Self::ExtensionsLoaded => Some(Self::BootstrapRegistered),
            Self::BootstrapRegistered => Some(Self::BeforeDiscoveryFired),
            Self::BeforeDiscoveryFired => Some(Self::DeclarativeDeployed),
            Self::DeclarativeDeployed => Some(Self::StereotypesChecked),
            Self::StereotypesChecked => Some(Self::DefaultComponentsConfigured),
            Self::DefaultComponentsConfigured => Some(Self::ClasspathDeployed),
            Self::ClasspathDeployed => Some(Self::AdditionalTypesDeployed),
            Self::AdditionalTypesDeployed => Some(Self::SpecializationsChecked),
            Self::SpecializationsChecked => Some(Self::AfterDiscoveryFired),
            Self::AfterDiscoveryFired => Some(Self::Validated),
            Self::Validated => Some(Self::AfterValidationFired),
            Self::AfterValidationFired => Some(Self::Deployed),
            Self::Deployed => None,
        }
    }

    /// 阶段名称
    fn name(self) -> &'static str {
        match self {
            Self::NotStarted => "NotStarted",
            Self::ExtensionsLoaded => "ExtensionsLoaded",
            Self::BootstrapRegistered => "BootstrapRegistered",
            Self::BeforeDiscoveryFired => "BeforeDiscoveryFired",
            Self::DeclarativeDeployed => "DeclarativeDeployed",
            Self::StereotypesChecked => "StereotypesChecked",
            Self::DefaultComponentsConfigured => "DefaultComponentsConfigured",
            Self::ClasspathDeployed => "ClasspathDeployed",
            Self::AdditionalTypesDeployed => "AdditionalTypesDeployed",
            Self::SpecializationsChecked => "SpecializationsChecked",
            Self::AfterDiscoveryFired => "AfterDiscoveryFired",
            Self::Validated => "Validated",
            Self::AfterValidationFired => "AfterValidationFired",
            Self::Deployed => "Deployed",
        }
    }
}

/// 部署器
///
/// 单线程状态机。`deployed` 标志保证整条管线恰好执行一次，
/// 成功后的重复调用直接返回已有容器。
pub struct Deployer {
    config: ContainerConfig,
    bus: NotificationBus,
    readers: Vec<Box<dyn ConfigSourceReader>>,
    proxy_factory: Arc<dyn ProxyFactory>,
    phase: DeploymentPhase,
    deployed: bool,
    container: Option<Arc<ContainerContext>>,
}

impl Deployer {
    /// 创建部署器，缺省装配 TOML 和 JSON 读取器与句柄代理工厂
    pub fn new(config: ContainerConfig) -> Self {
        Self {
            config,
            bus: NotificationBus::new(),
            readers: vec![
                Box::new(TomlConfigReader::default()),
                Box::new(JsonConfigReader::default()),
            ],
            proxy_factory: Arc::new(HandleProxyFactory),
            phase: DeploymentPhase::NotStarted,
            deployed: false,
            container: None,
        }
    }

    /// 装载扩展
    pub fn with_extension(mut self, extension: Box<dyn ContainerExtension>) -> Self {
        self.bus.install(extension);
        self
    }

    /// 追加配置源读取器
    pub fn with_reader(mut self, reader: Box<dyn ConfigSourceReader>) -> Self {
        self.readers.push(reader);
        self
    }

    /// 替换代理工厂
    pub fn with_proxy_factory(mut self, factory: Arc<dyn ProxyFactory>) -> Self {
        self.proxy_factory = factory;
        self
    }

    /// 当前部署阶段
    pub fn phase(&self) -> DeploymentPhase {
        self.phase
    }

    /// 是否已部署完成
    pub fn is_deployed(&self) -> bool {
        self.deployed
    }

    /// 执行部署
    ///
    /// 成功后重复调用是空操作，不会重复任何副作用。失败时
    /// `deployed` 保持为假，错误包装原始原因链整体上抛。
    pub fn deploy(
        &mut self,
        discovery: &dyn DiscoveryService,
    ) -> DeploymentResult<Arc<ContainerContext>> {
        if self.deployed {
            if let Some(existing) = &self.container {
                debug!("容器已部署，重复调用为空操作");
                return Ok(existing.clone());
            }
        }

        match self.run(discovery) {
            Ok(container) => {
                self.deployed = true;
                self.container = Some(container.clone());
                info!("组件容器部署完成，共 {} 个组件", container.component_count());
                Ok(container)
            }
            Err(e) => {
                error!("部署失败: {e}");
                Err(e)
            }
        }
    }

    /// 依次走完全部阶段
    fn run(&mut self, discovery: &dyn DiscoveryService) -> DeploymentResult<Arc<ContainerContext>> {
        info!("开始部署组件容器");
        self.phase = DeploymentPhase::NotStarted;
        let mut registry = ComponentRegistry::new();

        // 装载扩展
        debug!("已装载 {} 个扩展", self.bus.len());
        self.enter(DeploymentPhase::ExtensionsLoaded)?;

        // 注册引导组件：容器自身作为组件可被注入
        registry.add(
            Component::new("container_core::ContainerContext", ComponentKind::Managed)
                .as_internal(),
        );
        self.enter(DeploymentPhase::BootstrapRegistered)?;

        // 发现前通知
        let before = self.bus.fire_before_discovery()?;
        let added_classes = before.added_classes;
        let added_stereotypes = before.added_stereotypes;
        self.enter(DeploymentPhase::BeforeDiscoveryFired)?;

        // 声明式配置部署
        let declarative = self.read_sources(discovery)?;
        for class in &declarative.enabled_alternatives {
            registry.enable_alternative(class.clone());
        }
        self.enter(DeploymentPhase::DeclarativeDeployed)?;

        // 构造型检查：内建构造型先于发现的构造型注册
        let mut stereotypes = StereotypeRegistry::new();
        for stereotype in added_stereotypes {
            stereotypes.register(stereotype);
        }
        for class in discovery.candidate_classes() {
            if let Some(definition) = &class.stereotype_definition {
                stereotypes.register(definition.clone());
            }
        }
        debug!("构造型检查结束，共 {} 个构造型", stereotypes.len());
        self.enter(DeploymentPhase::StereotypesChecked)?;

        // 配置缺省组件
        if self.config.register_default_components {
            registry.add(
                Component::new("container_core::InjectionPointLookup", ComponentKind::Managed)
                    .as_internal(),
            );
            registry.add(
                Component::new("container_core::InstanceLookup", ComponentKind::Managed)
                    .as_internal(),
            );
        }
        self.enter(DeploymentPhase::DefaultComponentsConfigured)?;

        // 类路径部署
        let engine = DefinitionEngine::new(self.config, &stereotypes, &declarative);
        let mut defined = 0_usize;
        for class in discovery.candidate_classes() {
            // 构造型定义类不是组件候选
            if class.stereotype_definition.is_some() {
                continue;
            }
            if let DefinitionOutcome::Defined(_) =
                engine.define(&mut self.bus, &mut registry, class)?
            {
                defined += 1;
            }
        }
        debug!("类路径部署结束，定义了 {defined} 个组件");
        self.enter(DeploymentPhase::ClasspathDeployed)?;

        // 扩展追加的候选类
        for class in &added_classes {
            engine.define(&mut self.bus, &mut registry, class)?;
        }
        self.enter(DeploymentPhase::AdditionalTypesDeployed)?;

        // 特化检查要求类路径与声明式组件全部就位
        let mut all_classes: Vec<ClassMetadata> = discovery.candidate_classes().to_vec();
        all_classes.extend(added_classes);
        check_specializations(&mut registry, &all_classes, &declarative)?;
        self.enter(DeploymentPhase::SpecializationsChecked)?;

        // 发现后通知，观察者可以追加程序化组件
        let after = self.bus.fire_after_discovery()?;
        for component in after.added_components {
            registry.add(component);
        }
        self.enter(DeploymentPhase::AfterDiscoveryFired)?;

        // 校验要求特化已经解析，被压制的组件不再参与
        let stacks = ValidationEngine::new(&registry).validate()?;
        self.enter(DeploymentPhase::Validated)?;

        // 校验后通知
        self.bus.fire_after_validation()?;
        self.enter(DeploymentPhase::AfterValidationFired)?;

        let container = Arc::new(ContainerContext::new(
            registry,
            self.proxy_factory.clone(),
            stereotypes,
            stacks,
        ));
        self.enter(DeploymentPhase::Deployed)?;
        Ok(container)
    }

    /// 推进到下一阶段，顺序被破坏视为管线缺陷
    fn enter(&mut self, target: DeploymentPhase) -> DeploymentResult<()> {
        if self.phase.next() == Some(target) {
            self.phase = target;
            return Ok(());
        }
        Err(DeploymentError::PhaseOrder {
            expected: self.phase.next().map_or("<终态>", DeploymentPhase::name).to_string(),
            actual: target.name().to_string(),
        })
    }

    /// 读取并合并全部声明式配置源
    fn read_sources(&self, discovery: &dyn DiscoveryService) -> DeploymentResult<DeclarativeConfig> {
        let mut merged = DeclarativeConfig::default();
        for source in discovery.configuration_sources() {
            let reader = self
                .readers
                .iter()
                .find(|r| r.supports(source.name()))
                .ok_or_else(|| ConfigurationError::UnsupportedSource {
                    name: source.name().to_string(),
                })?;

            let parsed = match source {
                ConfigSource::File { name, path } => {
                    let mut file =
                        std::fs::File::open(path).map_err(|e| ConfigurationError::SourceRead {
                            name: name.clone(),
                            source: e,
                        })?;
                    reader.read(&mut file, name)?
                }
                ConfigSource::Inline { name, content } => {
                    let mut cursor = std::io::Cursor::new(content.as_bytes());
                    reader.read(&mut cursor, name)?
                }
            };
            debug!("配置源 {} 解析完成", source.name());
            merged.merge(parsed);
        }
        Ok(merged)
    }
}
