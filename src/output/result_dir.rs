// 该文件是 Lanfeng （岚风） 项目的一部分。
// src/output/result_dir.rs - 推理结果目录
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

use tracing::info;

/// 在 `base` 下创建新的结果目录 `res_<N>`，N 为 `base` 中已有条目数加一
pub fn create_result_dir(base: impl AsRef<Path>) -> std::io::Result<PathBuf> {
  let base = base.as_ref();
  std::fs::create_dir_all(base)?;

  let present = std::fs::read_dir(base)?.count();
  let directory = base.join(format!("res_{}", present + 1));
  std::fs::create_dir_all(&directory)?;

  info!("结果目录: {}", directory.display());
  Ok(directory)
}
