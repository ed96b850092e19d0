// 该文件是 Lanfeng （岚风） 项目的一部分。
// src/output/record.rs - 检测结果记录
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::{
  frame::Frame,
  model::{DetectItem, DetectResult},
  output::Render,
};

#[derive(Error, Debug)]
pub enum RecordOutputError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("序列化错误: {0}")]
  JsonError(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct RecordEntry<'a> {
  class_name: &'a str,
  #[serde(flatten)]
  item: &'a DetectItem,
}

#[derive(Serialize)]
struct RecordFile<'a> {
  index: usize,
  image: &'a Path,
  width: u32,
  height: u32,
  detections: Vec<RecordEntry<'a>>,
}

/// 每张图片一个 `<stem>.json`，包含未经阈值过滤的全部检测结果
pub struct RecordOutput {
  directory: PathBuf,
  classes: Vec<String>,
}

impl RecordOutput {
  pub fn new(directory: impl Into<PathBuf>, classes: Vec<String>) -> Self {
    Self {
      directory: directory.into(),
      classes,
    }
  }

  fn record_path(&self, frame: &Frame) -> PathBuf {
    self.directory.join(format!("{}.json", frame.stem()))
  }
}

impl Render<Frame, DetectResult> for RecordOutput {
  type Error = RecordOutputError;

  fn render_result(&self, frame: &Frame, result: &DetectResult) -> Result<(), Self::Error> {
    let detections = result
      .items
      .iter()
      .map(|item| RecordEntry {
        class_name: self
          .classes
          .get(item.class_id as usize)
          .map(String::as_str)
          .unwrap_or(""),
        item,
      })
      .collect();

    let record = RecordFile {
      index: frame.index,
      image: &frame.path,
      width: frame.image.width(),
      height: frame.image.height(),
      detections,
    };

    let path = self.record_path(frame);
    std::fs::write(&path, serde_json::to_vec_pretty(&record)?)?;
    debug!("写入检测记录: {}", path.display());
    Ok(())
  }
}
