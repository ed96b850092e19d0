// 该文件是 Lanfeng （岚风） 项目的一部分。
// src/model/faster_rcnn.rs - Faster R-CNN 推理
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

use std::path::Path;

use ndarray::ArrayViewD;
use ort::{session::Session, value::TensorRef};
use tracing::{debug, info};

use super::{Architecture, Checkpoint, DetectItem, DetectResult, Device, Model, ModelError};
use crate::frame::Frame;

// 导出约定：输入为 [1, 3, H, W] 的 0~1 浮点图像，
// 缩放、归一化与 NMS 均在图内完成
const INPUT_NAME: &str = "images";
const OUTPUT_BOXES: &str = "boxes";
const OUTPUT_LABELS: &str = "labels";
const OUTPUT_SCORES: &str = "scores";

pub struct FasterRcnn {
  name: &'static str,
  session: Session,
  num_classes: usize,
}

pub struct FasterRcnnBuilder {
  arch: &'static Architecture,
  num_classes: usize,
  device: Device,
}

impl FasterRcnnBuilder {
  pub fn new(arch: &'static Architecture) -> Self {
    Self {
      arch,
      num_classes: 91,
      device: Device::Cpu,
    }
  }

  pub fn num_classes(mut self, num_classes: usize) -> Self {
    self.num_classes = num_classes;
    self
  }

  pub fn device(mut self, device: Device) -> Self {
    self.device = device;
    self
  }

  /// 加载 COCO 预训练权重，不做任何修改
  pub fn build_pretrained(self, weights_dir: &Path) -> Result<FasterRcnn, ModelError> {
    let path = self.arch.pretrained_path(weights_dir);
    info!(
      "构建 {} ({}), 使用预训练权重: {}",
      self.arch.name,
      self.arch.backbone,
      path.display()
    );
    let session = self.device.session_from_file(&path)?;
    Ok(self.finish(session))
  }

  /// 使用训练得到的检查点权重
  pub fn build_from_checkpoint(self, checkpoint: Checkpoint) -> Result<FasterRcnn, ModelError> {
    info!(
      "构建 {} ({}), 使用检查点权重: {}",
      self.arch.name,
      self.arch.backbone,
      checkpoint.path().display()
    );
    Ok(self.finish(checkpoint.into_session()))
  }

  fn finish(self, session: Session) -> FasterRcnn {
    debug!("模型类别数: {}", self.num_classes);
    FasterRcnn {
      name: self.arch.name,
      session,
      num_classes: self.num_classes,
    }
  }
}

impl FasterRcnn {
  pub fn name(&self) -> &str {
    self.name
  }

  pub fn num_classes(&self) -> usize {
    self.num_classes
  }
}

impl Model for FasterRcnn {
  type Input = Frame;
  type Output = DetectResult;
  type Error = ModelError;

  fn infer(&mut self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    let tensor = input.to_nchw_tensor().into_dyn();

    debug!("执行模型推理: {:?}", tensor.shape());
    let outputs = self
      .session
      .run(ort::inputs![INPUT_NAME => TensorRef::from_array_view(tensor.view())?])?;

    let boxes = outputs[OUTPUT_BOXES].try_extract_array::<f32>()?;
    let labels = outputs[OUTPUT_LABELS].try_extract_array::<i64>()?;
    let scores = outputs[OUTPUT_SCORES].try_extract_array::<f32>()?;

    decode_detections(boxes, labels, scores, self.num_classes)
  }
}

/// 将三个输出张量复制到主机内存，组装为检测结果
pub fn decode_detections(
  boxes: ArrayViewD<'_, f32>,
  labels: ArrayViewD<'_, i64>,
  scores: ArrayViewD<'_, f32>,
  num_classes: usize,
) -> Result<DetectResult, ModelError> {
  let count = scores.len();
  if labels.len() != count || boxes.len() != count * 4 {
    return Err(ModelError::OutputShape(format!(
      "boxes {:?}, labels {:?}, scores {:?}",
      boxes.shape(),
      labels.shape(),
      scores.shape()
    )));
  }

  let coords: Vec<f32> = boxes.iter().copied().collect();
  let mut items = Vec::with_capacity(count);

  for ((bbox, &label), &score) in coords.chunks_exact(4).zip(labels.iter()).zip(scores.iter()) {
    if label < 0 || label as usize >= num_classes {
      return Err(ModelError::LabelOutOfRange { label, num_classes });
    }
    items.push(DetectItem {
      class_id: label as u32,
      score,
      bbox: [bbox[0], bbox[1], bbox[2], bbox[3]],
    });
  }

  debug!("检测到 {} 个物体", items.len());
  Ok(DetectResult::new(items))
}

#[cfg(test)]
mod tests {
  use super::*;
  use ndarray::{Array1, Array2};

  #[test]
  fn decodes_torchvision_layout() {
    let boxes = Array2::from_shape_vec((2, 4), vec![1.0, 2.0, 30.0, 40.0, 5.0, 6.0, 7.0, 8.0])
      .unwrap()
      .into_dyn();
    let labels = Array1::from_vec(vec![1i64, 3]).into_dyn();
    let scores = Array1::from_vec(vec![0.95f32, 0.12]).into_dyn();

    let result = decode_detections(boxes.view(), labels.view(), scores.view(), 4).unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(result.items[0].class_id, 1);
    assert_eq!(result.items[0].bbox, [1.0, 2.0, 30.0, 40.0]);
    assert_eq!(result.items[1].class_id, 3);
    assert_eq!(result.items[1].score, 0.12);
  }

  #[test]
  fn empty_outputs_give_empty_result() {
    let boxes = Array2::<f32>::zeros((0, 4)).into_dyn();
    let labels = Array1::<i64>::zeros(0).into_dyn();
    let scores = Array1::<f32>::zeros(0).into_dyn();

    let result = decode_detections(boxes.view(), labels.view(), scores.view(), 91).unwrap();
    assert!(result.is_empty());
  }

  #[test]
  fn label_outside_class_count_is_rejected() {
    let boxes = Array2::<f32>::zeros((1, 4)).into_dyn();
    let labels = Array1::from_vec(vec![5i64]).into_dyn();
    let scores = Array1::from_vec(vec![0.9f32]).into_dyn();

    let err = decode_detections(boxes.view(), labels.view(), scores.view(), 5).unwrap_err();
    assert!(matches!(
      err,
      ModelError::LabelOutOfRange {
        label: 5,
        num_classes: 5
      }
    ));
  }

  #[test]
  fn mismatched_lengths_are_rejected() {
    let boxes = Array2::<f32>::zeros((2, 4)).into_dyn();
    let labels = Array1::from_vec(vec![1i64]).into_dyn();
    let scores = Array1::from_vec(vec![0.9f32]).into_dyn();

    assert!(matches!(
      decode_detections(boxes.view(), labels.view(), scores.view(), 91),
      Err(ModelError::OutputShape(_))
    ));
  }
}
