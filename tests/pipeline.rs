// 该文件是 Lanfeng （岚风） 项目的一部分。
// tests/pipeline.rs - 端到端流程测试（不依赖 ONNX 模型）
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

use std::convert::Infallible;

use image::{Rgb, RgbImage};
use lanfeng::{
  config::DetectionConfig,
  frame::Frame,
  input::{ImageFileInput, collect_images},
  model::{DetectItem, DetectResult, Model},
  output::{AnnotatedOutput, Annotator, Palette, RecordOutput, SaveImageFileOutput, create_result_dir},
  task::{BatchTask, Task},
};

/// 左上角像素为亮色的图片报告一个高置信度目标，其余图片只报告低置信度目标
struct BrightnessModel;

impl Model for BrightnessModel {
  type Input = Frame;
  type Output = DetectResult;
  type Error = Infallible;

  fn infer(&mut self, input: &Frame) -> Result<DetectResult, Infallible> {
    let score = if input.image.get_pixel(0, 0)[0] > 128 { 0.9 } else { 0.1 };
    Ok(DetectResult::new(vec![DetectItem {
      class_id: 1,
      score,
      bbox: [2.0, 2.0, 20.0, 20.0],
    }]))
  }
}

fn write_images(dir: &std::path::Path) {
  RgbImage::from_pixel(32, 32, Rgb([255, 255, 255]))
    .save(dir.join("bright.png"))
    .unwrap();
  RgbImage::from_pixel(32, 32, Rgb([0, 0, 0]))
    .save(dir.join("dark.jpg"))
    .unwrap();
  RgbImage::from_pixel(16, 16, Rgb([10, 10, 10]))
    .save(dir.join("small.ppm"))
    .unwrap();
  std::fs::write(dir.join("readme.md"), b"not an image").unwrap();
}

#[test]
fn collector_returns_every_supported_image() {
  let dir = tempfile::tempdir().unwrap();
  write_images(dir.path());
  assert_eq!(collect_images(dir.path()).unwrap().len(), 3);
}

#[test]
fn processes_directory_into_numbered_result_dir() {
  let input_dir = tempfile::tempdir().unwrap();
  write_images(input_dir.path());
  let output_base = tempfile::tempdir().unwrap();

  let config = DetectionConfig::bundled().unwrap();
  let result_dir = create_result_dir(output_base.path()).unwrap();
  assert!(result_dir.ends_with("res_1"));

  let annotator = Annotator::new(config.classes.clone(), Palette::seeded(config.classes.len(), 42));
  let output = AnnotatedOutput::new(annotator, 0.3, SaveImageFileOutput::new(&result_dir))
    .with_record(RecordOutput::new(&result_dir, config.classes.clone()));

  let input = ImageFileInput::open(input_dir.path()).unwrap();
  assert_eq!(input.len(), 3);

  let stats = BatchTask.run_task(input, BrightnessModel, output).unwrap();
  assert_eq!(stats.frame_count, 3);
  let average = stats.average_fps().unwrap();
  assert!((average - stats.total_fps / 3.0).abs() < 1e-9);

  for stem in ["bright", "dark", "small"] {
    assert!(result_dir.join(format!("{}.jpg", stem)).is_file(), "{} 未保存", stem);
    assert!(result_dir.join(format!("{}.json", stem)).is_file());
  }

  // 只有高置信度的图片被标注：与直接标注后再编码的结果逐字节一致
  let expected_dir = tempfile::tempdir().unwrap();
  let annotator = Annotator::new(config.classes.clone(), Palette::seeded(config.classes.len(), 42));
  let mut expected = RgbImage::from_pixel(32, 32, Rgb([255, 255, 255]));
  let plain = expected.clone();
  let item = DetectItem {
    class_id: 1,
    score: 0.9,
    bbox: [2.0, 2.0, 20.0, 20.0],
  };
  assert_eq!(annotator.annotate(&mut expected, &DetectResult::new(vec![item]), 0.3), 1);
  assert_eq!(*expected.get_pixel(2, 10), annotator.color_for(1));
  assert_ne!(expected, plain);

  expected.save(expected_dir.path().join("bright.jpg")).unwrap();
  plain.save(expected_dir.path().join("plain.jpg")).unwrap();
  let saved = std::fs::read(result_dir.join("bright.jpg")).unwrap();
  assert_eq!(saved, std::fs::read(expected_dir.path().join("bright.jpg")).unwrap());
  assert_ne!(saved, std::fs::read(expected_dir.path().join("plain.jpg")).unwrap());

  let dark = image::open(result_dir.join("dark.jpg")).unwrap().to_rgb8();
  assert!(dark.pixels().all(|p| p.0.iter().all(|&c| c < 16)));
}

#[test]
fn empty_directory_yields_no_average() {
  let input_dir = tempfile::tempdir().unwrap();
  let output_dir = tempfile::tempdir().unwrap();

  let annotator = Annotator::new(vec!["__background__".into()], Palette::seeded(1, 42));
  let output = AnnotatedOutput::new(annotator, 0.3, SaveImageFileOutput::new(output_dir.path()));

  let input = ImageFileInput::open(input_dir.path()).unwrap();
  assert!(input.is_empty());

  let stats = BatchTask.run_task(input, BrightnessModel, output).unwrap();
  assert_eq!(stats.frame_count, 0);
  assert_eq!(stats.average_fps(), None);
}
