// 该文件是 Lanfeng （岚风） 项目的一部分。
// src/task.rs - 批量推理任务
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

use std::time::{Duration, Instant};

use anyhow::Context;
use tracing::{debug, info};

use crate::{model::Model, output::Render};

pub trait Task<I, M, O>: Sized {
  type Output;
  type Error;
  fn run_task(self, input: I, model: M, output: O) -> Result<Self::Output, Self::Error>;
}

/// 吞吐统计
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunStats {
  pub frame_count: u64,
  pub total_fps: f64,
}

impl RunStats {
  /// 记录一帧的推理耗时，FPS 取耗时的倒数
  pub fn record(&mut self, elapsed: Duration) -> f64 {
    let fps = 1.0 / elapsed.as_secs_f64();
    self.total_fps += fps;
    self.frame_count += 1;
    fps
  }

  /// 平均 FPS；没有处理任何帧时为 `None`
  pub fn average_fps(&self) -> Option<f64> {
    if self.frame_count == 0 {
      return None;
    }
    Some(self.total_fps / self.frame_count as f64)
  }
}

/// 逐张处理所有输入，任何一步出错即终止整个任务
pub struct BatchTask;

impl<
  F,
  D,
  IE: std::error::Error + Sync + Send + 'static,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = Result<F, IE>>,
  M: Model<Input = F, Output = D, Error = ME>,
  O: Render<F, D, Error = RE>,
> Task<I, M, O> for BatchTask
{
  type Output = RunStats;
  type Error = anyhow::Error;

  fn run_task(self, input: I, mut model: M, output: O) -> Result<Self::Output, Self::Error> {
    info!("开始任务...");
    let mut stats = RunStats::default();

    for (i, frame) in input.enumerate() {
      let frame = frame.with_context(|| format!("读取第 {} 张图片失败", i + 1))?;

      let now = Instant::now();
      let result = model
        .infer(&frame)
        .with_context(|| format!("第 {} 张图片推理失败", i + 1))?;
      let elapsed = now.elapsed();

      let fps = stats.record(elapsed);
      debug!("({})推理完成，耗时: {:.2?}, FPS: {:.3}", i + 1, elapsed, fps);

      output
        .render_result(&frame, &result)
        .with_context(|| format!("第 {} 张图片输出失败", i + 1))?;

      println!("Image {} done...", i + 1);
      println!("{}", "-".repeat(50));
    }

    info!("任务完成，共处理 {} 张图片", stats.frame_count);
    Ok(stats)
  }
}
