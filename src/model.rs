// 该文件是 Lanfeng （岚风） 项目的一部分。
// src/model.rs - 模型
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

use serde::Serialize;
use thiserror::Error;

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&mut self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectItem {
  pub class_id: u32,
  pub score: f32,
  pub bbox: [f32; 4], // [x_min, y_min, x_max, y_max]，原图像素坐标
}

#[derive(Debug, Clone, Default)]
pub struct DetectResult {
  pub items: Box<[DetectItem]>,
}

impl DetectResult {
  pub fn new(items: Vec<DetectItem>) -> Self {
    Self {
      items: items.into_boxed_slice(),
    }
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  /// 置信度不低于 `threshold` 的检测项
  pub fn above(&self, threshold: f32) -> impl Iterator<Item = &DetectItem> {
    self.items.iter().filter(move |item| item.score >= threshold)
  }
}

#[derive(Error, Debug)]
pub enum ModelError {
  #[error("ONNX Runtime 错误: {0}")]
  Ort(#[from] ort::Error),
  #[error("创建推理会话失败: {0}")]
  SessionBuild(String),
  #[error("模型文件不存在: {0}")]
  ModelFileMissing(String),
  #[error("读取模型元数据失败: {0}")]
  Metadata(String),
  #[error("未知的模型名称: {0}")]
  UnknownModel(String),
  #[error("模型输出形状不匹配: {0}")]
  OutputShape(String),
  #[error("类别 ID {label} 超出范围（类别数 {num_classes}）")]
  LabelOutOfRange { label: i64, num_classes: usize },
  #[error("设备描述无效: {0}")]
  InvalidDevice(String),
}

impl ModelError {
  pub(crate) fn session<E: std::fmt::Display>(err: E) -> Self {
    ModelError::SessionBuild(err.to_string())
  }
}

mod checkpoint;
mod device;
mod faster_rcnn;
pub mod registry;

pub use self::checkpoint::{Checkpoint, CheckpointMeta};
pub use self::device::Device;
pub use self::faster_rcnn::{FasterRcnn, FasterRcnnBuilder, decode_detections};
pub use self::registry::Architecture;
