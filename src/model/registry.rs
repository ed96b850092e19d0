// 该文件是 Lanfeng （岚风） 项目的一部分。
// src/model/registry.rs - 模型结构注册表
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

//! 可识别的 Faster R-CNN 结构名称。
//!
//! 网络结构本身位于导出的 ONNX 图中，这里只记录名称与对应的
//! COCO 预训练导出文件，供构建器选择。

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::ModelError;

pub const DEFAULT_MODEL: &str = "fasterrcnn_resnet50_fpn";

#[derive(Debug, PartialEq, Eq)]
pub struct Architecture {
  pub name: &'static str,
  pub backbone: &'static str,
}

impl Architecture {
  /// COCO 预训练导出文件名：`<name>_coco.onnx`
  pub fn pretrained_file(&self) -> String {
    format!("{}_coco.onnx", self.name)
  }

  pub fn pretrained_path(&self, weights_dir: &Path) -> PathBuf {
    weights_dir.join(self.pretrained_file())
  }
}

macro_rules! arch {
  ($name:literal, $backbone:literal) => {
    Architecture {
      name: $name,
      backbone: $backbone,
    }
  };
}

pub static ARCHITECTURES: &[Architecture] = &[
  arch!("fasterrcnn_resnet50_fpn", "ResNet-50 FPN"),
  arch!("fasterrcnn_resnet50_fpn_v2", "ResNet-50 FPN v2"),
  arch!("fasterrcnn_mobilenetv3_large_fpn", "MobileNetV3-Large FPN"),
  arch!("fasterrcnn_mobilenetv3_large_320_fpn", "MobileNetV3-Large 320 FPN"),
  arch!("fasterrcnn_resnet18", "ResNet-18"),
  arch!("fasterrcnn_resnet101", "ResNet-101"),
  arch!("fasterrcnn_resnet152", "ResNet-152"),
  arch!("fasterrcnn_squeezenet1_0", "SqueezeNet 1.0"),
  arch!("fasterrcnn_squeezenet1_1", "SqueezeNet 1.1"),
  arch!("fasterrcnn_darknet", "DarkNet"),
  arch!("fasterrcnn_mini_darknet", "Mini DarkNet"),
  arch!("fasterrcnn_efficientnet_b0", "EfficientNet-B0"),
  arch!("fasterrcnn_convnext_tiny", "ConvNeXt-Tiny"),
  arch!("fasterrcnn_convnext_small", "ConvNeXt-Small"),
  arch!("fasterrcnn_regnet_y_400mf", "RegNetY-400MF"),
  arch!("fasterrcnn_vgg16", "VGG-16"),
  arch!("fasterrcnn_nano", "Nano"),
];

pub fn lookup(name: &str) -> Option<&'static Architecture> {
  ARCHITECTURES.iter().find(|arch| arch.name == name)
}

pub fn default_architecture() -> &'static Architecture {
  lookup(DEFAULT_MODEL).unwrap_or(&ARCHITECTURES[0])
}

/// 无检查点时选择结构：请求名称无效则回退到默认结构
pub fn select(requested: Option<&str>) -> &'static Architecture {
  match requested {
    Some(name) => lookup(name).unwrap_or_else(|| {
      warn!("未知的模型名称 '{}', 回退到 {}", name, DEFAULT_MODEL);
      default_architecture()
    }),
    None => {
      info!("未指定模型名称, 使用 {}", DEFAULT_MODEL);
      default_architecture()
    }
  }
}

/// 加载检查点时选择结构：请求名称无效则回退到检查点内记录的名称
pub fn select_for_checkpoint(
  requested: Option<&str>,
  embedded: Option<&str>,
) -> Result<&'static Architecture, ModelError> {
  if let Some(name) = requested {
    if let Some(arch) = lookup(name) {
      return Ok(arch);
    }
    warn!("未知的模型名称 '{}', 改用检查点记录的模型名称", name);
  }

  let name = embedded.ok_or_else(|| {
    ModelError::UnknownModel(format!(
      "{} (检查点未记录 model_name)",
      requested.unwrap_or("<none>")
    ))
  })?;
  lookup(name).ok_or_else(|| ModelError::UnknownModel(name.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn names_are_unique() {
    for (i, arch) in ARCHITECTURES.iter().enumerate() {
      assert!(
        ARCHITECTURES[i + 1..].iter().all(|other| other.name != arch.name),
        "重复的结构名称: {}",
        arch.name
      );
    }
  }

  #[test]
  fn select_known_name() {
    let arch = select(Some("fasterrcnn_mobilenetv3_large_fpn"));
    assert_eq!(arch.name, "fasterrcnn_mobilenetv3_large_fpn");
    assert_eq!(
      arch.pretrained_path(Path::new("weights")),
      PathBuf::from("weights/fasterrcnn_mobilenetv3_large_fpn_coco.onnx")
    );
  }

  #[test]
  fn select_falls_back_to_default() {
    assert_eq!(select(Some("fasterrcnn_resnet5O_fpn")).name, DEFAULT_MODEL);
    assert_eq!(select(None).name, DEFAULT_MODEL);
  }

  #[test]
  fn checkpoint_name_used_when_request_is_unknown() {
    let arch = select_for_checkpoint(Some("typo"), Some("fasterrcnn_resnet18")).unwrap();
    assert_eq!(arch.name, "fasterrcnn_resnet18");

    let arch = select_for_checkpoint(None, Some("fasterrcnn_vgg16")).unwrap();
    assert_eq!(arch.name, "fasterrcnn_vgg16");
  }

  #[test]
  fn requested_name_wins_over_checkpoint() {
    let arch = select_for_checkpoint(Some("fasterrcnn_nano"), Some("fasterrcnn_vgg16")).unwrap();
    assert_eq!(arch.name, "fasterrcnn_nano");
  }

  #[test]
  fn checkpoint_without_usable_name_fails() {
    assert!(matches!(
      select_for_checkpoint(Some("typo"), None),
      Err(ModelError::UnknownModel(_))
    ));
    assert!(matches!(
      select_for_checkpoint(None, Some("not_a_model")),
      Err(ModelError::UnknownModel(_))
    ));
  }
}
