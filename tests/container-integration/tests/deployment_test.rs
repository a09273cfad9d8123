//! 部署管线的端到端集成测试

use component_model::{
    ClassMetadata, ComponentKind, ConfigurationError, DeploymentError, Qualifier, ScopeKind,
    TypeKey,
};
use container_abstractions::{
    AfterDiscovery, BeforeDiscovery, ConfigSource, ContainerExtension, ProcessCandidate,
    ProcessInjectionTarget,
};
use container_core::{ContainerConfig, Deployer, ProxyHandle, StaticDiscoveryService};
use std::io::Write;
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn deploy(
    discovery: &StaticDiscoveryService,
) -> Result<Arc<container_core::ContainerContext>, DeploymentError> {
    init_tracing();
    let mut deployer = Deployer::new(ContainerConfig::default());
    deployer.deploy(discovery)
}

#[test]
fn plain_class_deploys_with_dependent_scope() {
    let discovery =
        StaticDiscoveryService::new().with_class(ClassMetadata::new("app::PaymentService"));

    let container = deploy(&discovery).unwrap();
    let candidates = container
        .resolve(&TypeKey::of("app::PaymentService"), &[])
        .unwrap();

    assert_eq!(candidates.len(), 1);
    let component = &candidates[0];
    assert_eq!(component.class_name, "app::PaymentService");
    assert_eq!(component.scope, ScopeKind::Dependent);
    assert_eq!(component.kind, ComponentKind::Managed);
}

#[test]
fn second_deploy_is_a_noop() {
    init_tracing();
    let discovery =
        StaticDiscoveryService::new().with_class(ClassMetadata::new("app::PaymentService"));

    let mut deployer = Deployer::new(ContainerConfig::default());
    let first = deployer.deploy(&discovery).unwrap();
    let count = first.component_count();

    let second = deployer.deploy(&discovery).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.component_count(), count);
    assert_eq!(
        second
            .resolve(&TypeKey::of("app::PaymentService"), &[])
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn failed_deploy_stays_undeployed() {
    init_tracing();
    // 注入点无法满足，部署必须整体失败
    let discovery = StaticDiscoveryService::new().with_class(
        ClassMetadata::new("app::OrderService").with_injection_point(
            component_model::InjectionPointMeta::new(TypeKey::of("app::Missing")),
        ),
    );

    let mut deployer = Deployer::new(ContainerConfig::default());
    let error = deployer.deploy(&discovery).unwrap_err();
    assert!(matches!(error, DeploymentError::Validation { .. }));
    assert!(!deployer.is_deployed());
}

#[test]
fn alternative_enabled_from_toml_source_takes_precedence() {
    init_tracing();
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    writeln!(file, "[alternatives]\nenabled = [\"app::MockMailer\"]").unwrap();

    let contract = "app::Mailer";
    let discovery = StaticDiscoveryService::new()
        .with_class(ClassMetadata::new("app::SmtpMailer").with_interface(contract))
        .with_class(
            ClassMetadata::new("app::MockMailer")
                .with_interface(contract)
                .alternative(),
        )
        .with_source(ConfigSource::file(file.path()));

    let container = deploy(&discovery).unwrap();
    let selected = container.select(&TypeKey::of(contract), &[]).unwrap();
    assert_eq!(selected.class_name, "app::MockMailer");
}

#[test]
fn unenabled_alternative_is_ignored() {
    let contract = "app::Mailer";
    let discovery = StaticDiscoveryService::new()
        .with_class(ClassMetadata::new("app::SmtpMailer").with_interface(contract))
        .with_class(
            ClassMetadata::new("app::MockMailer")
                .with_interface(contract)
                .alternative(),
        );

    let container = deploy(&discovery).unwrap();
    let selected = container.select(&TypeKey::of(contract), &[]).unwrap();
    assert_eq!(selected.class_name, "app::SmtpMailer");
}

#[test]
fn malformed_config_source_aborts_deployment() {
    let discovery = StaticDiscoveryService::new()
        .with_source(ConfigSource::inline("broken.toml", "[alternatives"));

    let error = deploy(&discovery).unwrap_err();
    assert!(matches!(
        error,
        DeploymentError::Configuration {
            source: ConfigurationError::SourceParse { .. }
        }
    ));
}

#[test]
fn specialization_replaces_general_component() {
    let discovery = StaticDiscoveryService::new()
        .with_class(ClassMetadata::new("app::SmtpMailer").with_interface("app::Mailer"))
        .with_class(
            ClassMetadata::new("app::PremiumMailer")
                .with_superclass("app::SmtpMailer")
                .specializes(),
        );

    let container = deploy(&discovery).unwrap();

    // 按被特化者的契约解析得到特化者
    let by_contract = container.select(&TypeKey::of("app::Mailer"), &[]).unwrap();
    assert_eq!(by_contract.class_name, "app::PremiumMailer");

    let by_class = container
        .select(&TypeKey::of("app::SmtpMailer"), &[])
        .unwrap();
    assert_eq!(by_class.class_name, "app::PremiumMailer");

    // 被特化者退出独立候选
    let candidates = container.resolve(&TypeKey::of("app::Mailer"), &[]).unwrap();
    assert_eq!(candidates.len(), 1);
}

#[test]
fn competing_specializers_abort_deployment() {
    let discovery = StaticDiscoveryService::new()
        .with_class(ClassMetadata::new("app::SmtpMailer"))
        .with_class(
            ClassMetadata::new("app::PremiumMailer")
                .with_superclass("app::SmtpMailer")
                .specializes(),
        )
        .with_class(
            ClassMetadata::new("app::BulkMailer")
                .with_superclass("app::SmtpMailer")
                .specializes(),
        );

    let error = deploy(&discovery).unwrap_err();
    assert!(matches!(
        error,
        DeploymentError::Configuration {
            source: ConfigurationError::InconsistentSpecialization { .. }
        }
    ));
}

#[test]
fn declarative_specialization_matches_annotation_path() {
    let discovery = StaticDiscoveryService::new()
        .with_class(ClassMetadata::new("app::SmtpMailer").with_interface("app::Mailer"))
        .with_class(ClassMetadata::new("app::PremiumMailer").with_superclass("app::SmtpMailer"))
        .with_source(ConfigSource::inline(
            "components.toml",
            "specializations = [\"app::PremiumMailer\"]",
        ));

    let container = deploy(&discovery).unwrap();
    let selected = container.select(&TypeKey::of("app::Mailer"), &[]).unwrap();
    assert_eq!(selected.class_name, "app::PremiumMailer");
}

#[test]
fn duplicate_names_abort_deployment() {
    let discovery = StaticDiscoveryService::new()
        .with_class(ClassMetadata::new("app::A").with_name("foo"))
        .with_class(ClassMetadata::new("app::B").with_name("foo"));

    let error = deploy(&discovery).unwrap_err();
    assert!(matches!(
        error,
        DeploymentError::Configuration {
            source: ConfigurationError::DuplicateName { .. }
        }
    ));
}

#[test]
fn enabled_alternative_defuses_duplicate_name() {
    let discovery = StaticDiscoveryService::new()
        .with_class(ClassMetadata::new("app::A").with_name("foo"))
        .with_class(
            ClassMetadata::new("app::MockA")
                .with_name("foo")
                .alternative(),
        )
        .with_source(ConfigSource::inline(
            "components.toml",
            "[alternatives]\nenabled = [\"app::MockA\"]",
        ));

    // 备选把候选收敛到一个，部署成功
    let container = deploy(&discovery).unwrap();
    assert_eq!(container.resolve_by_name("foo").len(), 2);
}

#[test]
fn shadowed_name_aborts_deployment_regardless_of_alternatives() {
    let discovery = StaticDiscoveryService::new()
        .with_class(ClassMetadata::new("app::A").with_name("a"))
        .with_class(
            ClassMetadata::new("app::AB")
                .with_name("a.b")
                .alternative(),
        )
        .with_source(ConfigSource::inline(
            "components.toml",
            "[alternatives]\nenabled = [\"app::AB\"]",
        ));

    let error = deploy(&discovery).unwrap_err();
    assert!(matches!(
        error,
        DeploymentError::Configuration {
            source: ConfigurationError::NameShadowed { .. }
        }
    ));
}

#[test]
fn delegate_point_on_plain_component_aborts_deployment() {
    let discovery = StaticDiscoveryService::new().with_class(
        ClassMetadata::new("app::Sneaky").with_injection_point(
            component_model::InjectionPointMeta::new(TypeKey::of("app::Audited")).delegate(),
        ),
    );

    let error = deploy(&discovery).unwrap_err();
    assert!(matches!(
        error,
        DeploymentError::Configuration {
            source: ConfigurationError::DelegateOnNonDecorator { .. }
        }
    ));
}

#[test]
fn decorator_with_delegate_deploys() {
    let discovery = StaticDiscoveryService::new()
        .with_class(ClassMetadata::new("app::AuditDecorator").decorator(TypeKey::of("app::Audited")))
        .with_class(
            ClassMetadata::new("app::LedgerService").with_interface("app::Audited"),
        );

    let container = deploy(&discovery).unwrap();
    let ledger = container
        .select(&TypeKey::of("app::LedgerService"), &[])
        .unwrap();
    let stack = container.decorator_stack(&ledger);
    assert_eq!(stack.len(), 1);
    assert_eq!(stack[0].class_name, "app::AuditDecorator");
}

struct VetoMocks;

impl ContainerExtension for VetoMocks {
    fn name(&self) -> &str {
        "veto-mocks"
    }

    fn process_candidate(&mut self, event: &mut ProcessCandidate) {
        if event.metadata().class_name.contains("Mock") {
            event.veto();
        }
    }
}

#[test]
fn vetoed_candidate_never_reaches_the_registry() {
    init_tracing();
    let discovery = StaticDiscoveryService::new()
        .with_class(ClassMetadata::new("app::Mailer"))
        .with_class(ClassMetadata::new("app::MockMailer"));

    let mut deployer = Deployer::new(ContainerConfig::default()).with_extension(Box::new(VetoMocks));
    let container = deployer.deploy(&discovery).unwrap();

    assert_eq!(
        container
            .resolve(&TypeKey::of("app::Mailer"), &[])
            .unwrap()
            .len(),
        1
    );
    assert!(container
        .resolve(&TypeKey::of("app::MockMailer"), &[])
        .unwrap()
        .is_empty());
}

struct AppendAudit;

impl ContainerExtension for AppendAudit {
    fn name(&self) -> &str {
        "append-audit"
    }

    fn before_discovery(&mut self, event: &mut BeforeDiscovery) {
        event.add_class(ClassMetadata::new("ext::AuditLog"));
    }

    fn after_discovery(&mut self, event: &mut AfterDiscovery) {
        event.add_component(component_model::Component::new(
            "ext::Tracer",
            ComponentKind::Managed,
        ));
    }
}

#[test]
fn extensions_can_append_classes_and_components() {
    init_tracing();
    let discovery = StaticDiscoveryService::new();

    let mut deployer =
        Deployer::new(ContainerConfig::default()).with_extension(Box::new(AppendAudit));
    let container = deployer.deploy(&discovery).unwrap();

    assert_eq!(
        container
            .resolve(&TypeKey::of("ext::AuditLog"), &[])
            .unwrap()
            .len(),
        1
    );
    assert_eq!(
        container
            .resolve(&TypeKey::of("ext::Tracer"), &[])
            .unwrap()
            .len(),
        1
    );
}

struct Grumpy;

impl ContainerExtension for Grumpy {
    fn name(&self) -> &str {
        "grumpy"
    }

    fn before_discovery(&mut self, event: &mut BeforeDiscovery) {
        event.add_error("缺少审计配置");
        event.add_error("缺少凭据");
    }
}

#[test]
fn observer_errors_are_aggregated_per_round() {
    init_tracing();
    let mut deployer = Deployer::new(ContainerConfig::default()).with_extension(Box::new(Grumpy));
    let error = deployer.deploy(&StaticDiscoveryService::new()).unwrap_err();

    match error {
        DeploymentError::ExtensionRound { round, errors } => {
            assert_eq!(round, "before_discovery");
            assert_eq!(errors.len(), 2);
        }
        other => panic!("意外的错误: {other}"),
    }
    assert!(!deployer.is_deployed());
}

struct LedgerFactory;

impl ContainerExtension for LedgerFactory {
    fn name(&self) -> &str {
        "ledger-factory"
    }

    fn process_injection_target(&mut self, event: &mut ProcessInjectionTarget) {
        if event.class_name == "app::Ledger" {
            event.set_factory(Arc::new(|| Ok(Arc::new(7_u64))));
        }
    }
}

#[test]
fn scoped_instances_are_created_through_the_active_context() {
    init_tracing();
    let discovery = StaticDiscoveryService::new()
        .with_class(ClassMetadata::new("app::Ledger").with_scope(ScopeKind::Singleton));

    let mut deployer =
        Deployer::new(ContainerConfig::default()).with_extension(Box::new(LedgerFactory));
    let container = deployer.deploy(&discovery).unwrap();

    let ledger = container.select(&TypeKey::of("app::Ledger"), &[]).unwrap();
    let first = container.reference(&ledger).unwrap();
    let second = container.reference(&ledger).unwrap();

    // 单例上下文内实例共享
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(*first.downcast_ref::<u64>().unwrap(), 7);
}

#[test]
fn normal_scope_reference_is_a_cached_proxy() {
    let discovery = StaticDiscoveryService::new().with_class(
        ClassMetadata::new("app::Prices")
            .with_scope(ScopeKind::Application)
            .with_interface("app::PriceList"),
    );

    let container = deploy(&discovery).unwrap();
    let prices = container.select(&TypeKey::of("app::Prices"), &[]).unwrap();

    let first = container.reference(&prices).unwrap();
    let second = container.reference(&prices).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let handle = first.downcast_ref::<ProxyHandle>().unwrap();
    assert_eq!(handle.class_name, "app::Prices");
    assert!(handle.contract_types.contains(&TypeKey::of("app::PriceList")));
}

#[test]
fn qualified_request_narrows_candidates() {
    let contract = "app::Mailer";
    let discovery = StaticDiscoveryService::new()
        .with_class(ClassMetadata::new("app::SmtpMailer").with_interface(contract))
        .with_class(
            ClassMetadata::new("app::BackupMailer")
                .with_interface(contract)
                .with_qualifier(Qualifier::custom("backup")),
        );

    let container = deploy(&discovery).unwrap();

    let default_pick = container.select(&TypeKey::of(contract), &[]).unwrap();
    assert_eq!(default_pick.class_name, "app::SmtpMailer");

    let backup_pick = container
        .select(&TypeKey::of(contract), &[Qualifier::custom("backup")])
        .unwrap();
    assert_eq!(backup_pick.class_name, "app::BackupMailer");

    let all = container
        .resolve(&TypeKey::of(contract), &[Qualifier::Any])
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn named_component_is_found_by_name() {
    let discovery = StaticDiscoveryService::new()
        .with_class(ClassMetadata::new("app::PaymentService").with_defaulted_name());

    let container = deploy(&discovery).unwrap();
    let found = container.resolve_by_name("paymentService");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].class_name, "app::PaymentService");
}
