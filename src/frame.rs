// 该文件是 Lanfeng （岚风） 项目的一部分。
// src/frame.rs - 图像帧定义
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

use image::RgbImage;
use ndarray::Array4;

const RGB_CHANNELS: usize = 3;

/// 一张待推理的图像
#[derive(Debug, Clone)]
pub struct Frame {
  /// 在输入序列中的下标（从 0 开始）
  pub index: usize,
  /// 来源文件路径
  pub path: PathBuf,
  /// 原始 RGB 图像
  pub image: RgbImage,
}

impl Frame {
  pub fn new(index: usize, path: PathBuf, image: RgbImage) -> Self {
    Self { index, path, image }
  }

  pub fn width(&self) -> usize {
    self.image.width() as usize
  }

  pub fn height(&self) -> usize {
    self.image.height() as usize
  }

  /// 输出文件名（不含扩展名）：文件名中第一个 `.` 之前的部分
  pub fn stem(&self) -> String {
    image_stem(&self.path)
  }

  /// 转为 [1, 3, H, W] 的浮点张量，数值缩放到 [0, 1]
  pub fn to_nchw_tensor(&self) -> Array4<f32> {
    let (width, height) = (self.width(), self.height());
    let raw = self.image.as_raw();
    Array4::from_shape_fn((1, RGB_CHANNELS, height, width), |(_, c, y, x)| {
      raw[(y * width + x) * RGB_CHANNELS + c] as f32 / 255.0
    })
  }
}

pub fn image_stem(path: &Path) -> String {
  let file_name = path
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_default();
  match file_name.split_once('.') {
    Some((stem, _)) => stem.to_string(),
    None => file_name,
  }
}
