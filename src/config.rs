// 该文件是 Lanfeng （岚风） 项目的一部分。
// src/config.rs - 检测类别配置
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// 内置的默认配置（COCO 91 类，torchvision 顺序）
const BUNDLED_CONFIG: &str = include_str!("../data_configs/test_image_config.yaml");

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("无法读取配置文件 {}: {}", .0.display(), .1)]
  Io(PathBuf, std::io::Error),
  #[error("配置解析错误: {0}")]
  Yaml(#[from] serde_yaml::Error),
  #[error("配置无效: {0}")]
  Invalid(String),
}

/// 检测类别配置
///
/// 类别下标即类别 ID，下标 0 保留给背景。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
  /// 类别数量
  #[serde(rename = "NC")]
  pub nc: usize,
  /// 类别名称列表
  #[serde(rename = "CLASSES")]
  pub classes: Vec<String>,
  /// 未指定输入时使用的图片路径
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image_path: Option<PathBuf>,
}

impl DetectionConfig {
  pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
    let config: DetectionConfig = serde_yaml::from_str(yaml)?;
    config.validate()?;
    Ok(config)
  }

  pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    debug!("读取配置文件: {}", path.display());
    let content =
      std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
    Self::from_yaml(&content)
  }

  /// 编译进程序的默认配置
  pub fn bundled() -> Result<Self, ConfigError> {
    Self::from_yaml(BUNDLED_CONFIG)
  }

  fn validate(&self) -> Result<(), ConfigError> {
    if self.nc == 0 {
      return Err(ConfigError::Invalid("NC 必须大于 0".to_string()));
    }
    if self.classes.is_empty() {
      return Err(ConfigError::Invalid("CLASSES 不能为空".to_string()));
    }
    if self.nc != self.classes.len() {
      warn!(
        "NC ({}) 与 CLASSES 长度 ({}) 不一致，以类别列表为准",
        self.nc,
        self.classes.len()
      );
    }
    Ok(())
  }

  pub fn num_classes(&self) -> usize {
    self.nc
  }
}

/// 配置来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
  Explicit,
  Checkpoint,
  Bundled,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
  pub config: DetectionConfig,
  pub source: ConfigSource,
}

/// 按优先级解析配置：显式配置文件 > 模型检查点内嵌配置 > 内置默认配置
///
/// `checkpoint` 为检查点内嵌的 YAML 文本，存在显式配置文件时不会被解析。
pub fn resolve(
  explicit: Option<&Path>,
  checkpoint: Option<&str>,
) -> Result<ResolvedConfig, ConfigError> {
  let resolved = if let Some(path) = explicit {
    ResolvedConfig {
      config: DetectionConfig::from_file(path)?,
      source: ConfigSource::Explicit,
    }
  } else if let Some(yaml) = checkpoint {
    ResolvedConfig {
      config: DetectionConfig::from_yaml(yaml)?,
      source: ConfigSource::Checkpoint,
    }
  } else {
    ResolvedConfig {
      config: DetectionConfig::bundled()?,
      source: ConfigSource::Bundled,
    }
  };

  info!(
    "使用 {:?} 配置: {} 个类别",
    resolved.source, resolved.config.nc
  );
  Ok(resolved)
}
