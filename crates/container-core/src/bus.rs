//! 扩展通知总线
//!
//! 按固定顺序向观察者派发通知。一轮通知内报告的错误先收集，
//! 轮末一次性聚合上报，保证单次部署暴露该轮的完整错误集合。

use component_model::{DeploymentError, DeploymentResult, ExtensionError};
use container_abstractions::{
    AfterDiscovery, AfterValidation, BeforeDiscovery, ContainerExtension, ProcessCandidate,
    ProcessInjectionTarget,
};
use tracing::{debug, error};

/// 扩展通知总线
#[derive(Default)]
pub struct NotificationBus {
    extensions: Vec<Box<dyn ContainerExtension>>,
}

impl NotificationBus {
    /// 创建空总线
    pub fn new() -> Self {
        Self::default()
    }

    /// 装载扩展
    pub fn install(&mut self, extension: Box<dyn ContainerExtension>) {
        debug!("装载扩展: {}", extension.name());
        self.extensions.push(extension);
    }

    /// 已装载的扩展数量
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// 总线是否为空
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// 触发发现前通知
    pub fn fire_before_discovery(&mut self) -> DeploymentResult<BeforeDiscovery> {
        let mut event = BeforeDiscovery::default();
        for extension in &mut self.extensions {
            extension.before_discovery(&mut event);
        }
        let errors = std::mem::take(&mut event.errors);
        Self::check_round("before_discovery", errors)?;
        Ok(event)
    }

    /// 触发处理候选类通知
    pub fn fire_process_candidate(&mut self, event: &mut ProcessCandidate) -> DeploymentResult<()> {
        for extension in &mut self.extensions {
            extension.process_candidate(event);
        }
        let errors = std::mem::take(&mut event.errors);
        Self::check_round("process_candidate", errors)
    }

    /// 触发处理注入目标通知
    pub fn fire_process_injection_target(
        &mut self,
        event: &mut ProcessInjectionTarget,
    ) -> DeploymentResult<()> {
        for extension in &mut self.extensions {
            extension.process_injection_target(event);
        }
        let errors = std::mem::take(&mut event.errors);
        Self::check_round("process_injection_target", errors)
    }

    /// 触发发现后通知
    pub fn fire_after_discovery(&mut self) -> DeploymentResult<AfterDiscovery> {
        let mut event = AfterDiscovery::default();
        for extension in &mut self.extensions {
            extension.after_discovery(&mut event);
        }
        let errors = std::mem::take(&mut event.errors);
        Self::check_round("after_discovery", errors)?;
        Ok(event)
    }

    /// 触发校验后通知
    pub fn fire_after_validation(&mut self) -> DeploymentResult<()> {
        let mut event = AfterValidation::default();
        for extension in &mut self.extensions {
            extension.after_validation(&mut event);
        }
        let errors = std::mem::take(&mut event.errors);
        Self::check_round("after_validation", errors)
    }

    /// 轮末检查：收集到任何错误则整体失败
    fn check_round(round: &str, errors: Vec<ExtensionError>) -> DeploymentResult<()> {
        if errors.is_empty() {
            return Ok(());
        }
        error!("通知轮 {} 收集到 {} 个扩展错误", round, errors.len());
        Err(DeploymentError::ExtensionRound {
            round: round.to_string(),
            errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Reporting;

    impl ContainerExtension for Reporting {
        fn name(&self) -> &str {
            "reporting"
        }

        fn before_discovery(&mut self, event: &mut BeforeDiscovery) {
            event.add_error("第一处问题");
            event.add_error("第二处问题");
        }
    }

    #[test]
    fn round_errors_are_aggregated() {
        let mut bus = NotificationBus::new();
        bus.install(Box::new(Reporting));

        let error = bus.fire_before_discovery().unwrap_err();
        match error {
            DeploymentError::ExtensionRound { round, errors } => {
                assert_eq!(round, "before_discovery");
                assert_eq!(errors.len(), 2);
            }
            other => panic!("意外的错误: {other}"),
        }
    }

    #[test]
    fn quiet_round_passes() {
        let mut bus = NotificationBus::new();
        assert!(bus.fire_before_discovery().is_ok());
        assert!(bus.fire_after_validation().is_ok());
    }
}
