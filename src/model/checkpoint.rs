// 该文件是 Lanfeng （岚风） 项目的一部分。
// src/model/checkpoint.rs - 模型检查点
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

//! 训练得到的检查点是一个 ONNX 模型文件，附带两项自定义元数据：
//!
//! - `model_name`: 注册表中的结构名称
//! - `config`: YAML 格式的类别配置（`NC` 与 `CLASSES`）

use std::path::{Path, PathBuf};

use ort::session::Session;
use tracing::{debug, info};

use super::{Device, ModelError};

pub const MODEL_NAME_KEY: &str = "model_name";
pub const CONFIG_KEY: &str = "config";

/// 检查点内嵌的元数据
///
/// `config` 保留原始 YAML 文本，仅在没有显式配置文件时才由
/// [`crate::config::resolve`] 解析。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckpointMeta {
  pub model_name: Option<String>,
  pub config: Option<String>,
}

impl CheckpointMeta {
  /// 通过键值查询函数解析元数据
  pub fn from_lookup<F>(lookup: F) -> Result<Self, ModelError>
  where
    F: Fn(&str) -> Result<Option<String>, ModelError>,
  {
    let model_name = lookup(MODEL_NAME_KEY)?
      .map(|name| name.trim().to_string())
      .filter(|name| !name.is_empty());
    let config = lookup(CONFIG_KEY)?.filter(|yaml| !yaml.trim().is_empty());

    Ok(Self { model_name, config })
  }
}

pub struct Checkpoint {
  path: PathBuf,
  session: Session,
  meta: CheckpointMeta,
}

impl Checkpoint {
  pub fn load(path: impl AsRef<Path>, device: Device) -> Result<Self, ModelError> {
    let path = path.as_ref();
    info!("加载检查点: {}", path.display());
    let session = device.session_from_file(path)?;

    let meta = {
      let metadata = session
        .metadata()
        .map_err(|e| ModelError::Metadata(e.to_string()))?;
      CheckpointMeta::from_lookup(|key| {
        metadata
          .custom(key)
          .map_err(|e| ModelError::Metadata(e.to_string()))
      })?
    };

    debug!("检查点元数据: {:?}", meta);

    Ok(Self {
      path: path.to_path_buf(),
      session,
      meta,
    })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn meta(&self) -> &CheckpointMeta {
    &self.meta
  }

  pub(crate) fn into_session(self) -> Session {
    self.session
  }
}
