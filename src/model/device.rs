// 该文件是 Lanfeng （岚风） 项目的一部分。
// src/model/device.rs - 推理设备选择
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

use std::{fmt, path::Path, str::FromStr};

use ort::{
  execution_providers::{CUDAExecutionProvider, ExecutionProvider},
  session::{Session, builder::GraphOptimizationLevel},
};
use tracing::{info, warn};

use super::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
  Cpu,
  Cuda(i32),
}

impl Device {
  /// CUDA 可用时使用 `cuda:0`，否则回退到 CPU
  pub fn auto() -> Self {
    match CUDAExecutionProvider::default().is_available() {
      Ok(true) => Device::Cuda(0),
      Ok(false) => Device::Cpu,
      Err(e) => {
        warn!("查询 CUDA 可用性失败，使用 CPU: {}", e);
        Device::Cpu
      }
    }
  }

  pub(crate) fn session_from_file(&self, path: &Path) -> Result<Session, ModelError> {
    if !path.is_file() {
      return Err(ModelError::ModelFileMissing(path.display().to_string()));
    }

    let _ = ort::init().commit();

    let mut builder = Session::builder()
      .map_err(ModelError::session)?
      .with_optimization_level(GraphOptimizationLevel::Level3)
      .map_err(ModelError::session)?;

    match self {
      Device::Cuda(device_id) => {
        info!("使用 CUDA 执行后端, 设备 {}", device_id);
        builder = builder
          .with_execution_providers([CUDAExecutionProvider::default()
            .with_device_id(*device_id)
            .build()
            .error_on_failure()])
          .map_err(ModelError::session)?;
      }
      Device::Cpu => {
        info!("使用 CPU 执行后端");
      }
    }

    builder.commit_from_file(path).map_err(ModelError::session)
  }
}

impl FromStr for Device {
  type Err = ModelError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
      "cpu" => Ok(Device::Cpu),
      "cuda" | "gpu" => Ok(Device::Cuda(0)),
      _ => match s.strip_prefix("cuda:") {
        Some(id) => id
          .parse::<i32>()
          .ok()
          .filter(|id| *id >= 0)
          .map(Device::Cuda)
          .ok_or(ModelError::InvalidDevice(s.clone())),
        None => Err(ModelError::InvalidDevice(s.clone())),
      },
    }
  }
}

impl fmt::Display for Device {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Device::Cpu => write!(f, "cpu"),
      Device::Cuda(id) => write!(f, "cuda:{}", id),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_device_strings() {
    assert_eq!("cpu".parse::<Device>().unwrap(), Device::Cpu);
    assert_eq!("CUDA".parse::<Device>().unwrap(), Device::Cuda(0));
    assert_eq!("cuda:1".parse::<Device>().unwrap(), Device::Cuda(1));
    assert!("cuda:-1".parse::<Device>().is_err());
    assert!("tpu".parse::<Device>().is_err());
  }

  #[test]
  fn display_round_trips_through_parse() {
    let device = Device::Cuda(3);
    assert_eq!(device.to_string().parse::<Device>().unwrap(), device);
  }
}
