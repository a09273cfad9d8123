//! 声明式配置源读取器
//!
//! 支持 TOML 和 JSON 两种格式，解析出与注解路径同构的覆盖模型。
//! 两种读取器共用同一个原始文件模型。

use component_model::{ConfigurationError, ConfigurationResult, Qualifier, ScopeKind};
use container_abstractions::{ComponentOverride, ConfigSourceReader, DeclarativeConfig};
use serde::Deserialize;
use std::io::Read;

/// 原始配置文件模型
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    alternatives: RawAlternatives,
    #[serde(default)]
    specializations: Vec<String>,
    #[serde(default)]
    components: Vec<RawOverride>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAlternatives {
    #[serde(default)]
    enabled: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawOverride {
    class: String,
    #[serde(default)]
    scope: Option<ScopeKind>,
    #[serde(default)]
    qualifiers: Vec<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    alternative: Option<bool>,
}

impl From<RawConfig> for DeclarativeConfig {
    fn from(raw: RawConfig) -> Self {
        let overrides = raw
            .components
            .into_iter()
            .map(|raw| {
                let mut override_ = ComponentOverride::new(raw.class);
                override_.scope = raw.scope;
                override_.qualifiers = raw
                    .qualifiers
                    .iter()
                    .map(|q| Qualifier::parse(q))
                    .collect();
                override_.name = raw.name;
                override_.alternative = raw.alternative;
                override_
            })
            .collect();

        Self {
            enabled_alternatives: raw.alternatives.enabled,
            specializations: raw.specializations,
            overrides,
        }
    }
}

/// 把流读成字符串，I/O 失败包装成配置源读取错误
fn slurp(stream: &mut dyn Read, source_name: &str) -> ConfigurationResult<String> {
    let mut buffer = String::new();
    stream
        .read_to_string(&mut buffer)
        .map_err(|e| ConfigurationError::SourceRead {
            name: source_name.to_string(),
            source: e,
        })?;
    Ok(buffer)
}

/// TOML 配置源读取器
#[derive(Debug, Default)]
pub struct TomlConfigReader;

impl ConfigSourceReader for TomlConfigReader {
    fn name(&self) -> &str {
        "TomlConfigReader"
    }

    fn supports(&self, source_name: &str) -> bool {
        source_name.ends_with(".toml")
    }

    fn read(
        &self,
        stream: &mut dyn Read,
        source_name: &str,
    ) -> ConfigurationResult<DeclarativeConfig> {
        let text = slurp(stream, source_name)?;
        let raw: RawConfig = toml::from_str(&text)
            .map_err(|e| ConfigurationError::source_parse(source_name, e.to_string()))?;
        Ok(raw.into())
    }
}

/// JSON 配置源读取器
#[derive(Debug, Default)]
pub struct JsonConfigReader;

impl ConfigSourceReader for JsonConfigReader {
    fn name(&self) -> &str {
        "JsonConfigReader"
    }

    fn supports(&self, source_name: &str) -> bool {
        source_name.ends_with(".json")
    }

    fn read(
        &self,
        stream: &mut dyn Read,
        source_name: &str,
    ) -> ConfigurationResult<DeclarativeConfig> {
        let text = slurp(stream, source_name)?;
        let raw: RawConfig = serde_json::from_str(&text)
            .map_err(|e| ConfigurationError::source_parse(source_name, e.to_string()))?;
        Ok(raw.into())
    }
}
