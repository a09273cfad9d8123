//! 静态发现服务
//!
//! 以固定快照实现发现契约，宿主运行时用真正的扫描器替换。
//! 快照在一次部署过程中天然稳定。

use component_model::ClassMetadata;
use container_abstractions::{ConfigSource, DiscoveryService};

/// 静态发现服务
#[derive(Debug, Default)]
pub struct StaticDiscoveryService {
    classes: Vec<ClassMetadata>,
    sources: Vec<ConfigSource>,
}

impl StaticDiscoveryService {
    /// 创建空快照
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加候选类
    pub fn with_class(mut self, class: ClassMetadata) -> Self {
        self.classes.push(class);
        self
    }

    /// 追加配置源
    pub fn with_source(mut self, source: ConfigSource) -> Self {
        self.sources.push(source);
        self
    }
}

impl DiscoveryService for StaticDiscoveryService {
    fn candidate_classes(&self) -> &[ClassMetadata] {
        &self.classes
    }

    fn configuration_sources(&self) -> &[ConfigSource] {
        &self.sources
    }
}
