// 该文件是 Lanfeng （岚风） 项目的一部分。
// src/main.rs - 项目主程序
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

mod args;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use lanfeng::{
  config,
  input::ImageFileInput,
  model::{Checkpoint, Device, FasterRcnn, FasterRcnnBuilder, registry},
  output::{AnnotatedOutput, Annotator, Palette, RecordOutput, SaveImageFileOutput, draw},
  task::{BatchTask, Task},
};

fn build_model(
  args: &args::Args,
  device: Device,
) -> Result<(FasterRcnn, config::ResolvedConfig)> {
  match &args.weights {
    None => {
      let resolved = config::resolve(args.config.as_deref(), None)?;
      let arch = registry::select(args.model.as_deref());
      let model = FasterRcnnBuilder::new(arch)
        .num_classes(resolved.config.num_classes())
        .device(device)
        .build_pretrained(&args.weights_dir)?;
      Ok((model, resolved))
    }
    Some(weights) => {
      let checkpoint = Checkpoint::load(weights, device)
        .with_context(|| format!("无法加载检查点: {}", weights.display()))?;
      let meta = checkpoint.meta().clone();
      let resolved = config::resolve(args.config.as_deref(), meta.config.as_deref())?;

      info!("根据模型名称参数构建模型...");
      let arch = registry::select_for_checkpoint(args.model.as_deref(), meta.model_name.as_deref())?;
      let model = FasterRcnnBuilder::new(arch)
        .num_classes(resolved.config.num_classes())
        .device(device)
        .build_from_checkpoint(checkpoint)?;
      Ok((model, resolved))
    }
  }
}

fn build_output(
  args: &args::Args,
  classes: &[String],
  directory: &std::path::Path,
) -> Result<AnnotatedOutput> {
  let palette = Palette::seeded(classes.len(), args.seed);
  let annotator = Annotator::new(classes.to_vec(), palette);
  let annotator = match &args.font {
    Some(path) => annotator.with_font(
      draw::load_font(path).with_context(|| format!("无法加载字体: {}", path.display()))?,
    ),
    None => annotator.with_system_font(),
  };

  let mut output = AnnotatedOutput::new(
    annotator,
    args.threshold,
    SaveImageFileOutput::new(directory),
  );

  if args.record {
    output = output.with_record(RecordOutput::new(directory, classes.to_vec()));
  }

  #[cfg(feature = "display")]
  {
    use lanfeng::output::{Preview, PreviewMode};
    if args.show_image {
      output = output.with_preview(Preview::new(PreviewMode::Live)?);
    }
    if args.mpl_show {
      output = output.with_preview(Preview::new(PreviewMode::Blocking)?);
    }
  }
  #[cfg(not(feature = "display"))]
  if args.show_image || args.mpl_show {
    warn!("未启用 display 特性，忽略预览参数");
  }

  Ok(output)
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  let device = args.device.unwrap_or_else(Device::auto);
  info!("推理设备: {}", device);

  let result_dir = lanfeng::output::create_result_dir(&args.output_dir)
    .with_context(|| format!("无法创建结果目录: {}", args.output_dir.display()))?;

  let (model, resolved) = build_model(&args, device)?;
  info!("模型 {} 加载完成，类别数 {}", model.name(), model.num_classes());

  let input_path = match (&args.input, &resolved.config.image_path) {
    (Some(path), _) => path.clone(),
    (None, Some(path)) => path.clone(),
    (None, None) => anyhow::bail!("未指定输入路径，且配置中没有 image_path"),
  };
  let input = ImageFileInput::open(&input_path)?;
  println!("Test instances: {}", input.len());

  let output = build_output(&args, &resolved.config.classes, &result_dir)?;

  let stats = BatchTask.run_task(input, model, output)?;

  println!("TEST PREDICTIONS COMPLETE");
  match stats.average_fps() {
    Some(fps) => println!("Average FPS: {:.3}", fps),
    None => warn!("没有处理任何图片，无法计算平均 FPS"),
  }

  Ok(())
}
