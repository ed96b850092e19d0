// 该文件是 Lanfeng （岚风） 项目的一部分。
// src/args.rs - 项目参数配置
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::PathBuf;

use clap::Parser;
use lanfeng::model::Device;

/// Lanfeng 批量检测推理
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入图片文件或目录（目录下收集 jpg/jpeg/png/ppm）
  /// 未指定时使用配置中的 image_path
  #[arg(short, long, value_name = "PATH")]
  pub input: Option<PathBuf>,

  /// 检测类别配置文件（YAML，包含 NC 与 CLASSES）
  #[arg(short, long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// 模型结构名称，如 fasterrcnn_resnet50_fpn
  #[arg(short, long, value_name = "NAME")]
  pub model: Option<String>,

  /// 训练得到的检查点（ONNX，内嵌 model_name 与 config 元数据）
  #[arg(short, long, value_name = "FILE")]
  pub weights: Option<PathBuf>,

  /// 检测阈值 (0.0 - 1.0)
  #[arg(
    short,
    long,
    visible_alias = "th",
    default_value = "0.3",
    value_name = "THRESHOLD"
  )]
  pub threshold: f32,

  /// 在预览窗口中逐帧显示结果
  #[arg(short, long, visible_alias = "si")]
  pub show_image: bool,

  /// 每张图片打开一个窗口显示，关闭后继续
  #[arg(short = 'p', long, visible_alias = "mpl")]
  pub mpl_show: bool,

  /// 推理设备：cpu、cuda 或 cuda:N，默认自动选择
  #[arg(short, long, value_name = "DEVICE")]
  pub device: Option<Device>,

  /// 结果目录的上级目录，每次运行在其中创建 res_N
  #[arg(long, default_value = "outputs/inference", value_name = "DIR")]
  pub output_dir: PathBuf,

  /// COCO 预训练模型所在目录（<name>_coco.onnx）
  #[arg(long, default_value = "weights", value_name = "DIR")]
  pub weights_dir: PathBuf,

  /// 标签字体文件（TrueType），默认搜索系统字体
  #[arg(long, value_name = "FILE")]
  pub font: Option<PathBuf>,

  /// 类别颜色的随机种子
  #[arg(long, default_value = "42")]
  pub seed: u64,

  /// 为每张图片写入 JSON 检测记录
  #[arg(long)]
  pub record: bool,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults() {
    let args = Args::try_parse_from(["lanfeng", "-i", "images"]).unwrap();
    assert_eq!(args.input, Some(PathBuf::from("images")));
    assert_eq!(args.threshold, 0.3);
    assert_eq!(args.seed, 42);
    assert_eq!(args.output_dir, PathBuf::from("outputs/inference"));
    assert!(args.device.is_none());
    assert!(!args.show_image && !args.mpl_show && !args.record);
  }

  #[test]
  fn short_and_alias_flags() {
    let args = Args::try_parse_from([
      "lanfeng", "-w", "best.onnx", "--th", "0.5", "--si", "--mpl", "-d", "cuda:1",
    ])
    .unwrap();
    assert_eq!(args.weights, Some(PathBuf::from("best.onnx")));
    assert_eq!(args.threshold, 0.5);
    assert!(args.show_image && args.mpl_show);
    assert_eq!(args.device, Some(Device::Cuda(1)));
  }

  #[test]
  fn rejects_bad_device() {
    assert!(Args::try_parse_from(["lanfeng", "-d", "tpu"]).is_err());
  }
}
