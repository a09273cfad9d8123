//! 容器部署与解析示例
//!
//! 演示从发现快照部署容器、启用备选组件以及稳态查找

use component_model::{ClassMetadata, Qualifier, ScopeKind, TypeKey};
use container_abstractions::ConfigSource;
use container_core::{ContainerConfig, Deployer, ProxyHandle, StaticDiscoveryService};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    // 组装发现快照：一个契约，两个实现，其中一个是备选
    let discovery = StaticDiscoveryService::new()
        .with_class(
            ClassMetadata::new("demo::SmtpMailer")
                .with_interface("demo::Mailer")
                .with_defaulted_name(),
        )
        .with_class(
            ClassMetadata::new("demo::MockMailer")
                .with_interface("demo::Mailer")
                .alternative(),
        )
        .with_class(
            ClassMetadata::new("demo::PriceList").with_scope(ScopeKind::Application),
        )
        .with_source(ConfigSource::inline(
            "demo.toml",
            "[alternatives]\nenabled = [\"demo::MockMailer\"]",
        ));

    // 部署恰好执行一次
    let mut deployer = Deployer::new(ContainerConfig::default());
    let container = deployer.deploy(&discovery)?;

    // 备选组件在决胜中胜出
    let mailer = container.select(&TypeKey::of("demo::Mailer"), &[])?;
    println!("邮件组件: {} ({})", mailer.class_name, mailer.scope);

    // 备选在候选决胜中淘汰了非备选实现
    let surviving = container.resolve(&TypeKey::of("demo::Mailer"), &[Qualifier::Any])?;
    println!("决胜后剩余候选: {}", surviving.len());

    // 普通作用域的引用是缓存的客户端代理
    let prices = container.select(&TypeKey::of("demo::PriceList"), &[])?;
    let proxy = container.reference(&prices)?;
    if let Some(handle) = proxy.downcast_ref::<ProxyHandle>() {
        println!("代理已创建: {}", handle.class_name);
    }

    // 按名称查找
    for component in container.resolve_by_name("smtpMailer") {
        println!("名称命中: {}", component.class_name);
    }

    Ok(())
}
