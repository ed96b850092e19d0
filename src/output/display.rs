// 该文件是 Lanfeng （岚风） 项目的一部分。
// src/output/display.rs - GStreamer 预览窗口
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

//! # 预览窗口
//!
//! 通过 `autovideosink` 显示标注后的图像。
//!
//! - [`PreviewMode::Live`]: 保持一个窗口，逐帧推送，不阻塞推理
//! - [`PreviewMode::Blocking`]: 每张图片单独打开窗口，关闭窗口或等待超时后继续
//!
//! 没有可用显示设备时 `autovideosink` 会退化为 `fakesink`，此时不等待。

use gstreamer::{self as gst, prelude::*};
use gstreamer_app as gst_app;
use image::{DynamicImage, RgbImage};
use thiserror::Error;
use tracing::{debug, info, warn};

const LIVE_PIPELINE: &str =
  "appsrc name=src is-live=true format=time ! videoconvert ! autovideosink sync=false";
const BLOCKING_PIPELINE: &str =
  "appsrc name=src format=time ! videoconvert ! imagefreeze ! autovideosink";
/// 阻塞模式下单张图片的最长等待时间
const BLOCKING_TIMEOUT_SECS: u64 = 300;
const HEADLESS_SINK: &str = "fakesink";

/// GStreamer 预览错误类型
#[derive(Error, Debug)]
pub enum DisplayError {
  /// GStreamer 库错误
  #[error("GStreamer error: {0}")]
  GStreamerError(#[from] gst::glib::Error),
  /// 无法获取 appsrc 元素
  #[error("Failed to get appsrc element")]
  AppSrcNotFound,
  /// 管道错误
  #[error("Pipeline error: {0}")]
  PipelineError(String),
  /// 状态改变错误
  #[error("State change error: {0}")]
  StateChangeError(#[from] gst::StateChangeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewMode {
  Live,
  Blocking,
}

struct Pipeline {
  pipeline: gst::Pipeline,
  appsrc: gst_app::AppSrc,
}

impl Pipeline {
  fn launch(desc: &str) -> Result<Self, DisplayError> {
    debug!("创建预览管道: {}", desc);
    let pipeline = gst::parse::launch(desc)?
      .downcast::<gst::Pipeline>()
      .map_err(|_| DisplayError::PipelineError("Failed to create pipeline".to_string()))?;

    let appsrc = pipeline
      .by_name("src")
      .ok_or(DisplayError::AppSrcNotFound)?
      .downcast::<gst_app::AppSrc>()
      .map_err(|_| DisplayError::AppSrcNotFound)?;

    pipeline.set_state(gst::State::Playing)?;
    Ok(Self { pipeline, appsrc })
  }

  fn push(&self, image: &RgbImage) -> Result<(), DisplayError> {
    // RGBA 每行天然 4 字节对齐，免去 RGB 行跨度填充
    let rgba = DynamicImage::ImageRgb8(image.clone()).into_rgba8();
    let caps = gst::Caps::builder("video/x-raw")
      .field("format", "RGBA")
      .field("width", rgba.width() as i32)
      .field("height", rgba.height() as i32)
      .field("framerate", gst::Fraction::new(0, 1))
      .build();
    self.appsrc.set_caps(Some(&caps));

    let buffer = gst::Buffer::from_mut_slice(rgba.into_raw());
    self
      .appsrc
      .push_buffer(buffer)
      .map_err(|e| DisplayError::PipelineError(format!("Failed to push buffer: {:?}", e)))?;
    Ok(())
  }

  /// 管道中各元素的工厂名称，包括 `autovideosink` 选中的子元素
  fn element_factories(&self) -> Vec<String> {
    self
      .pipeline
      .iterate_recurse()
      .into_iter()
      .flatten()
      .filter_map(|element| element.factory())
      .map(|factory| factory.name().to_string())
      .collect()
  }

  /// 等待窗口关闭（错误消息）、流结束或超时
  ///
  /// `imagefreeze` 会吞掉上游的 EOS，窗口关闭时 sink 以错误消息通知。
  fn wait_closed(&self, timeout: gst::ClockTime) {
    let Some(bus) = self.pipeline.bus() else {
      return;
    };
    let message =
      bus.timed_pop_filtered(timeout, &[gst::MessageType::Eos, gst::MessageType::Error]);
    match message.as_ref().map(|message| message.view()) {
      Some(gst::MessageView::Error(err)) => debug!("预览窗口结束: {}", err.error()),
      Some(_) => debug!("预览流结束"),
      None => info!("预览等待超时（{}），继续处理", timeout),
    }
  }

  fn stop(&self) {
    let _ = self.appsrc.end_of_stream();
    if let Err(e) = self.pipeline.set_state(gst::State::Null) {
      warn!("Failed to stop GStreamer preview pipeline: {}", e);
    }
  }
}

/// 管道中是否只有无窗口的 sink
fn is_headless<S: AsRef<str>>(factories: &[S]) -> bool {
  factories.iter().any(|name| name.as_ref() == HEADLESS_SINK)
}

pub struct Preview {
  live: Option<Pipeline>,
}

impl Preview {
  pub fn new(mode: PreviewMode) -> Result<Self, DisplayError> {
    gst::init()?;

    let live = match mode {
      PreviewMode::Live => Some(Pipeline::launch(LIVE_PIPELINE)?),
      PreviewMode::Blocking => None,
    };

    info!("预览窗口已初始化: {:?}", mode);
    Ok(Self { live })
  }

  pub fn show(&self, image: &RgbImage) -> Result<(), DisplayError> {
    match &self.live {
      Some(pipeline) => pipeline.push(image),
      None => {
        let pipeline = Pipeline::launch(BLOCKING_PIPELINE)?;
        if is_headless(&pipeline.element_factories()) {
          warn!("没有可用的显示设备，跳过预览");
          pipeline.stop();
          return Ok(());
        }
        pipeline.push(image)?;
        let _ = pipeline.appsrc.end_of_stream();
        pipeline.wait_closed(gst::ClockTime::from_seconds(BLOCKING_TIMEOUT_SECS));
        pipeline.stop();
        Ok(())
      }
    }
  }
}

impl Drop for Preview {
  fn drop(&mut self) {
    if let Some(pipeline) = &self.live {
      pipeline.stop();
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fake_sink_means_no_window() {
    let headless = ["appsrc", "videoconvert", "imagefreeze", "autovideosink", "fakesink"];
    assert!(is_headless(&headless));

    let windowed = ["appsrc", "videoconvert", "imagefreeze", "autovideosink", "xvimagesink"];
    assert!(!is_headless(&windowed));
  }

  #[test]
  fn blocking_wait_is_bounded() {
    let timeout = gst::ClockTime::from_seconds(BLOCKING_TIMEOUT_SECS);
    assert!(timeout > gst::ClockTime::ZERO);
    assert!(BLOCKING_PIPELINE.contains("autovideosink"));
  }
}
