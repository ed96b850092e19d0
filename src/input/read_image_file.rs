// 该文件是 Lanfeng （岚风） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
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

use image::ImageReader;
use thiserror::Error;
use tracing::{debug, error};

use crate::{frame::Frame, input::collect_images};

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("无法打开图片文件 {}: {}", .0.display(), .1)]
  IoError(PathBuf, std::io::Error),
  #[error("无法解码图片文件 {}: {}", .0.display(), .1)]
  ImageLoadError(PathBuf, image::ImageError),
}

/// 逐张解码的图片输入
///
/// 图片在迭代时才被读取，解码得到的即为 RGB 顺序。
pub struct ImageFileInput {
  paths: std::vec::IntoIter<PathBuf>,
  index: usize,
  total: usize,
}

impl ImageFileInput {
  pub fn new(paths: Vec<PathBuf>) -> Self {
    let total = paths.len();
    Self {
      paths: paths.into_iter(),
      index: 0,
      total,
    }
  }

  /// 从文件或目录创建输入
  pub fn open(path: impl AsRef<Path>) -> Result<Self, ImageFileInputError> {
    let path = path.as_ref();
    let paths = collect_images(path).map_err(|e| ImageFileInputError::IoError(path.into(), e))?;
    Ok(Self::new(paths))
  }

  /// 图片总数
  pub fn len(&self) -> usize {
    self.total
  }

  pub fn is_empty(&self) -> bool {
    self.total == 0
  }

  fn load(index: usize, path: PathBuf) -> Result<Frame, ImageFileInputError> {
    debug!("读取图片: {}", path.display());
    let image = ImageReader::open(&path)
      .map_err(|e| ImageFileInputError::IoError(path.clone(), e))?
      .with_guessed_format()
      .map_err(|e| ImageFileInputError::IoError(path.clone(), e))?
      .decode()
      .map_err(|e| {
        error!("图片解码失败: {}", path.display());
        ImageFileInputError::ImageLoadError(path.clone(), e)
      })?
      .to_rgb8();

    Ok(Frame::new(index, path, image))
  }
}

impl Iterator for ImageFileInput {
  type Item = Result<Frame, ImageFileInputError>;

  fn next(&mut self) -> Option<Self::Item> {
    let path = self.paths.next()?;
    let index = self.index;
    self.index += 1;
    Some(Self::load(index, path))
  }
}
