// 该文件是 Lanfeng （岚风） 项目的一部分。
// src/input.rs - 图像输入
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

use tracing::debug;

mod read_image_file;
pub use self::read_image_file::{ImageFileInput, ImageFileInputError};

/// 目录模式下收集的图片扩展名，按此顺序分组返回
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "ppm"];

/// 收集待推理的图片路径
///
/// 若 `path` 是目录，返回其中扩展名属于 [`IMAGE_EXTENSIONS`] 的文件（不递归，
/// 大小写敏感，跳过以 `.` 开头的隐藏文件）；否则原样返回该路径，可读性留到解码时再检查。
pub fn collect_images(path: impl AsRef<Path>) -> std::io::Result<Vec<PathBuf>> {
  let path = path.as_ref();
  if !path.is_dir() {
    return Ok(vec![path.to_path_buf()]);
  }

  let mut entries = Vec::new();
  for entry in std::fs::read_dir(path)? {
    let entry = entry?;
    if entry.file_type()?.is_dir() || is_hidden(&entry.path()) {
      continue;
    }
    entries.push(entry.path());
  }

  let mut images = Vec::new();
  for ext in IMAGE_EXTENSIONS {
    let mut group: Vec<PathBuf> = entries
      .iter()
      .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(ext))
      .cloned()
      .collect();
    group.sort();
    images.extend(group);
  }

  debug!("目录 {} 中找到 {} 张图片", path.display(), images.len());
  Ok(images)
}

fn is_hidden(path: &Path) -> bool {
  path
    .file_name()
    .is_some_and(|name| name.to_string_lossy().starts_with('.'))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn single_file_is_returned_as_is() {
    let images = collect_images("/does/not/exist.jpg").unwrap();
    assert_eq!(images, vec![PathBuf::from("/does/not/exist.jpg")]);
  }

  #[test]
  fn groups_by_extension_order() {
    let dir = tempfile::tempdir().unwrap();
    for name in [
      "b.png", "a.png", "c.jpg", "d.ppm", "e.jpeg", "notes.txt", "f.JPG", ".hidden.jpg", "._a.png",
    ] {
      std::fs::write(dir.path().join(name), b"").unwrap();
    }
    std::fs::create_dir(dir.path().join("nested.jpg")).unwrap();

    let names: Vec<String> = collect_images(dir.path())
      .unwrap()
      .iter()
      .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
      .collect();

    assert_eq!(names, vec!["c.jpg", "e.jpeg", "a.png", "b.png", "d.ppm"]);
  }

  #[test]
  fn hidden_files_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["a.jpg", ".hidden.jpg", "._a.jpg"] {
      std::fs::write(dir.path().join(name), b"").unwrap();
    }

    let images = collect_images(dir.path()).unwrap();
    assert_eq!(images, vec![dir.path().join("a.jpg")]);
  }

  #[test]
  fn empty_directory_yields_nothing() {
    let dir = tempfile::tempdir().unwrap();
    assert!(collect_images(dir.path()).unwrap().is_empty());
  }
}
