//! 特化解析器
//!
//! 在完整的发现类集合上建立特化边，校验扇入约束后把被特化
//! 组件从独立候选中压制掉，契约类型合并到特化者上

use crate::registry::ComponentRegistry;
use component_model::{ClassMetadata, ConfigurationError, ConfigurationResult};
use container_abstractions::DeclarativeConfig;
use tracing::debug;

/// 检查并应用特化关系
///
/// 同一个祖先被两个特化者指向（例如 Car、CarToyota、CarFord 同时
/// 存在且后两者都特化 Car），或者特化者的直接父类就是根对象类型，
/// 都是致命配置错误，在任何组件实例化之前报告。
pub fn check_specializations(
    registry: &mut ComponentRegistry,
    classes: &[ClassMetadata],
    declarative: &DeclarativeConfig,
) -> ConfigurationResult<()> {
    debug!("特化约束检查开始");

    let mut seen_ancestors: Vec<String> = Vec::new();
    let mut edges: Vec<(&ClassMetadata, &str)> = Vec::new();

    for class in classes {
        let specializes =
            class.specializes || declarative.declares_specialization(&class.class_name);
        if !specializes {
            continue;
        }

        let Some(ancestor) = class.superclass.as_deref() else {
            return Err(ConfigurationError::TrivialSpecialization {
                class: class.class_name.clone(),
            });
        };

        if seen_ancestors.iter().any(|seen| seen == ancestor) {
            return Err(ConfigurationError::InconsistentSpecialization {
                ancestor: ancestor.to_string(),
            });
        }
        seen_ancestors.push(ancestor.to_string());
        edges.push((class, ancestor));
    }

    for (class, ancestor) in edges {
        apply_edge(registry, class, ancestor)?;
    }

    debug!("特化约束检查结束");
    Ok(())
}

/// 应用单条特化边：合并契约、限定符与名称，压制被特化组件
fn apply_edge(
    registry: &mut ComponentRegistry,
    class: &ClassMetadata,
    ancestor: &str,
) -> ConfigurationResult<()> {
    let special = registry.find_by_class(&class.class_name).ok_or_else(|| {
        ConfigurationError::definition(format!("特化组件 {} 未定义为组件", class.class_name))
    })?;
    let general = registry.find_by_class(ancestor).ok_or_else(|| {
        ConfigurationError::definition(format!("被特化的父类 {ancestor} 未定义为组件"))
    })?;

    if general.name.is_some() && class.name.is_some() {
        return Err(ConfigurationError::SpecializationNameClash {
            special: class.class_name.clone(),
            general: ancestor.to_string(),
        });
    }

    let merged_contracts = general.contract_types.clone();
    let merged_qualifiers = general.qualifiers.clone();
    let merged_name = general.name.clone();
    let general_class = general.class_name.clone();

    registry.update(special.id, |c| {
        c.contract_types.extend(merged_contracts);
        c.qualifiers.extend(merged_qualifiers);
        if let Some(name) = merged_name {
            c.name = Some(name);
        }
        c.specializes = Some(general_class);
    });
    registry.suppress(general.id);

    debug!(
        "组件 {} 特化了 {}，后者退出独立解析",
        class.class_name, ancestor
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::InjectionResolver;
    use component_model::{Component, ComponentKind, Qualifier, TypeKey};

    fn mailer_registry() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        registry.add(
            Component::new("app::SmtpMailer", ComponentKind::Managed)
                .with_contract(TypeKey::of("app::Mailer")),
        );
        registry.add(
            Component::new("app::PremiumMailer", ComponentKind::Managed)
                .with_superclass("app::SmtpMailer")
                .with_contract(TypeKey::of("app::SmtpMailer")),
        );
        registry
    }

    fn premium_specializes_smtp() -> ClassMetadata {
        ClassMetadata::new("app::PremiumMailer")
            .with_superclass("app::SmtpMailer")
            .specializes()
    }

    #[test]
    fn specialized_component_is_replaced_by_specializer() {
        let mut registry = mailer_registry();
        let classes = vec![premium_specializes_smtp()];

        check_specializations(&mut registry, &classes, &DeclarativeConfig::default()).unwrap();

        // 被特化者的契约类型对特化者可见
        let resolver = InjectionResolver::new(&registry);
        let selected = resolver
            .select_by_type(&TypeKey::of("app::Mailer"), &[])
            .unwrap();
        assert_eq!(selected.class_name, "app::PremiumMailer");

        let by_super = resolver
            .select_by_type(&TypeKey::of("app::SmtpMailer"), &[])
            .unwrap();
        assert_eq!(by_super.class_name, "app::PremiumMailer");
    }

    #[test]
    fn qualifiers_merge_onto_specializer() {
        let mut registry = ComponentRegistry::new();
        registry.add(
            Component::new("app::SmtpMailer", ComponentKind::Managed)
                .with_contract(TypeKey::of("app::Mailer"))
                .with_qualifier(Qualifier::custom("smtp")),
        );
        registry.add(
            Component::new("app::PremiumMailer", ComponentKind::Managed)
                .with_superclass("app::SmtpMailer")
                .with_contract(TypeKey::of("app::SmtpMailer")),
        );

        let classes = vec![premium_specializes_smtp()];
        check_specializations(&mut registry, &classes, &DeclarativeConfig::default()).unwrap();

        let resolver = InjectionResolver::new(&registry);
        let selected = resolver
            .select_by_type(&TypeKey::of("app::Mailer"), &[Qualifier::custom("smtp")])
            .unwrap();
        assert_eq!(selected.class_name, "app::PremiumMailer");
    }

    #[test]
    fn two_specializers_for_one_ancestor_are_rejected() {
        let mut registry = mailer_registry();
        registry.add(
            Component::new("app::BulkMailer", ComponentKind::Managed)
                .with_superclass("app::SmtpMailer"),
        );

        let classes = vec![
            premium_specializes_smtp(),
            ClassMetadata::new("app::BulkMailer")
                .with_superclass("app::SmtpMailer")
                .specializes(),
        ];
        let error =
            check_specializations(&mut registry, &classes, &DeclarativeConfig::default())
                .unwrap_err();
        assert!(matches!(
            error,
            ConfigurationError::InconsistentSpecialization { .. }
        ));

        // 发现顺序无关
        let mut registry = mailer_registry();
        registry.add(
            Component::new("app::BulkMailer", ComponentKind::Managed)
                .with_superclass("app::SmtpMailer"),
        );
        let reversed = vec![
            ClassMetadata::new("app::BulkMailer")
                .with_superclass("app::SmtpMailer")
                .specializes(),
            premium_specializes_smtp(),
        ];
        let error =
            check_specializations(&mut registry, &reversed, &DeclarativeConfig::default())
                .unwrap_err();
        assert!(matches!(
            error,
            ConfigurationError::InconsistentSpecialization { .. }
        ));
    }

    #[test]
    fn specializer_with_root_superclass_is_rejected() {
        let mut registry = ComponentRegistry::new();
        registry.add(Component::new("app::Orphan", ComponentKind::Managed));

        let classes = vec![ClassMetadata::new("app::Orphan").specializes()];
        let error =
            check_specializations(&mut registry, &classes, &DeclarativeConfig::default())
                .unwrap_err();
        assert!(matches!(
            error,
            ConfigurationError::TrivialSpecialization { .. }
        ));
    }

    #[test]
    fn name_moves_from_general_to_specializer() {
        let mut registry = ComponentRegistry::new();
        registry.add(
            Component::new("app::SmtpMailer", ComponentKind::Managed).with_name("mailer"),
        );
        registry.add(
            Component::new("app::PremiumMailer", ComponentKind::Managed)
                .with_superclass("app::SmtpMailer")
                .with_contract(TypeKey::of("app::SmtpMailer")),
        );

        let classes = vec![premium_specializes_smtp()];
        check_specializations(&mut registry, &classes, &DeclarativeConfig::default()).unwrap();

        let resolver = InjectionResolver::new(&registry);
        let by_name = resolver.select_by_name("mailer").unwrap().unwrap();
        assert_eq!(by_name.class_name, "app::PremiumMailer");
    }

    #[test]
    fn names_on_both_sides_are_rejected() {
        let mut registry = ComponentRegistry::new();
        registry.add(
            Component::new("app::SmtpMailer", ComponentKind::Managed).with_name("mailer"),
        );
        registry.add(
            Component::new("app::PremiumMailer", ComponentKind::Managed)
                .with_superclass("app::SmtpMailer"),
        );

        let classes = vec![ClassMetadata::new("app::PremiumMailer")
            .with_superclass("app::SmtpMailer")
            .with_name("premium")
            .specializes()];
        let error =
            check_specializations(&mut registry, &classes, &DeclarativeConfig::default())
                .unwrap_err();
        assert!(matches!(
            error,
            ConfigurationError::SpecializationNameClash { .. }
        ));
    }
}
