//! 发现服务抽象接口
//!
//! 扫描机制在容器核心之外，核心只消费稳定快照

use component_model::ClassMetadata;
use std::path::PathBuf;

/// 配置源
///
/// 逻辑名用于选择读取器和标注诊断信息。
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// 文件系统上的配置源
    File {
        /// 逻辑名
        name: String,
        /// 文件路径
        path: PathBuf,
    },
    /// 内联配置源（测试和程序化配置）
    Inline {
        /// 逻辑名
        name: String,
        /// 配置内容
        content: String,
    },
}

impl ConfigSource {
    /// 创建文件配置源，逻辑名取文件名
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Self::File { name, path }
    }

    /// 创建内联配置源
    pub fn inline(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Inline {
            name: name.into(),
            content: content.into(),
        }
    }

    /// 配置源的逻辑名
    pub fn name(&self) -> &str {
        match self {
            Self::File { name, .. } | Self::Inline { name, .. } => name,
        }
    }
}

/// 发现服务 trait
///
/// 返回值在一次部署过程中必须保持稳定。
pub trait DiscoveryService: Send + Sync {
    /// 候选组件类的描述符集合
    fn candidate_classes(&self) -> &[ClassMetadata];

    /// 声明式配置源集合
    fn configuration_sources(&self) -> &[ConfigSource];
}
