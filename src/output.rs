// 该文件是 Lanfeng （岚风） 项目的一部分。
// src/output.rs - 输出定义
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

use thiserror::Error;
use tracing::debug;

use crate::{frame::Frame, model::DetectResult};

pub trait Render<Frame, Output>: Sized {
  type Error;
  fn render_result(&self, frame: &Frame, result: &Output) -> Result<(), Self::Error>;
}

pub mod draw;
mod record;
mod result_dir;
mod save_image_file;

pub use self::draw::{Annotator, Palette};
pub use self::record::{RecordOutput, RecordOutputError};
pub use self::result_dir::create_result_dir;
pub use self::save_image_file::{SaveImageFileError, SaveImageFileOutput};

#[cfg(feature = "display")]
mod display;
#[cfg(feature = "display")]
pub use self::display::{DisplayError, Preview, PreviewMode};

#[derive(Error, Debug)]
pub enum OutputError {
  #[error("保存图像文件错误: {0}")]
  SaveImageFileError(#[from] SaveImageFileError),
  #[error("检测记录错误: {0}")]
  RecordOutputError(#[from] RecordOutputError),
  #[cfg(feature = "display")]
  #[error("预览窗口错误: {0}")]
  DisplayError(#[from] DisplayError),
}

/// 标注并保存推理结果
///
/// 有检测结果时按阈值绘制标注并推送到预览窗口；无论是否有检测结果都保存图像。
pub struct AnnotatedOutput {
  annotator: Annotator,
  threshold: f32,
  saver: SaveImageFileOutput,
  record: Option<RecordOutput>,
  #[cfg(feature = "display")]
  previews: Vec<Preview>,
}

impl AnnotatedOutput {
  pub fn new(annotator: Annotator, threshold: f32, saver: SaveImageFileOutput) -> Self {
    Self {
      annotator,
      threshold,
      saver,
      record: None,
      #[cfg(feature = "display")]
      previews: Vec::new(),
    }
  }

  pub fn with_record(mut self, record: RecordOutput) -> Self {
    self.record = Some(record);
    self
  }

  #[cfg(feature = "display")]
  pub fn with_preview(mut self, preview: Preview) -> Self {
    self.previews.push(preview);
    self
  }
}

impl Render<Frame, DetectResult> for AnnotatedOutput {
  type Error = OutputError;

  fn render_result(&self, frame: &Frame, result: &DetectResult) -> Result<(), Self::Error> {
    let mut image = frame.image.clone();

    // 是否有检测结果按原始数量判断，阈值只在绘制时生效
    if !result.is_empty() {
      let drawn = self.annotator.annotate(&mut image, result, self.threshold);
      debug!(
        "{}: {} 个检测结果, 绘制 {} 个",
        frame.path.display(),
        result.len(),
        drawn
      );

      #[cfg(feature = "display")]
      for preview in &self.previews {
        preview.show(&image)?;
      }
    }

    self.saver.save(&frame.stem(), &image)?;

    if let Some(record) = &self.record {
      record.render_result(frame, result)?;
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::DetectItem;
  use image::{Rgb, RgbImage};
  use std::path::PathBuf;

  fn output(dir: &std::path::Path) -> AnnotatedOutput {
    let classes = vec!["__background__".to_string(), "person".to_string()];
    let annotator = Annotator::new(classes, Palette::seeded(2, 42));
    AnnotatedOutput::new(annotator, 0.5, SaveImageFileOutput::new(dir))
  }

  fn frame(name: &str) -> Frame {
    Frame::new(
      0,
      PathBuf::from(format!("/input/{}", name)),
      RgbImage::from_pixel(32, 32, Rgb([0, 0, 0])),
    )
  }

  #[test]
  fn image_without_detections_is_still_saved() {
    let dir = tempfile::tempdir().unwrap();
    output(dir.path())
      .render_result(&frame("empty.png"), &DetectResult::default())
      .unwrap();
    assert!(dir.path().join("empty.jpg").is_file());
  }

  #[test]
  fn low_confidence_detections_leave_image_unannotated() {
    let dir = tempfile::tempdir().unwrap();
    let out = output(dir.path());
    let result = DetectResult::new(vec![DetectItem {
      class_id: 1,
      score: 0.2,
      bbox: [4.0, 4.0, 20.0, 20.0],
    }]);

    out.render_result(&frame("low.jpeg"), &result).unwrap();

    let saved = image::open(dir.path().join("low.jpg")).unwrap().to_rgb8();
    assert!(saved.pixels().all(|p| p.0.iter().all(|&c| c < 16)));
  }

  #[test]
  fn record_written_next_to_image() {
    let dir = tempfile::tempdir().unwrap();
    let classes = vec!["__background__".to_string(), "person".to_string()];
    let out = output(dir.path()).with_record(RecordOutput::new(dir.path(), classes));
    let result = DetectResult::new(vec![DetectItem {
      class_id: 1,
      score: 0.8,
      bbox: [1.0, 1.0, 10.0, 10.0],
    }]);

    out.render_result(&frame("rec.png"), &result).unwrap();
    assert!(dir.path().join("rec.jpg").is_file());
    assert!(dir.path().join("rec.json").is_file());
  }
}
