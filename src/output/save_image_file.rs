// 该文件是 Lanfeng （岚风） 项目的一部分。
// src/output/save_image_file.rs - 保存图像文件
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

use std::path::PathBuf;

use image::RgbImage;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum SaveImageFileError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
}

/// 将图像以 JPEG 格式写入结果目录
pub struct SaveImageFileOutput {
  directory: PathBuf,
}

impl SaveImageFileOutput {
  pub fn new(directory: impl Into<PathBuf>) -> Self {
    Self {
      directory: directory.into(),
    }
  }

  /// 写入 `<directory>/<stem>.jpg`，返回写入路径
  pub fn save(&self, stem: &str, image: &RgbImage) -> Result<PathBuf, SaveImageFileError> {
    if !self.directory.exists() {
      std::fs::create_dir_all(&self.directory)?;
    }

    let path = self.directory.join(format!("{}.jpg", stem));
    image.save(&path)?;

    info!("保存图像到文件: {}", path.display());

    Ok(path)
  }
}
