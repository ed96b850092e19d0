// 该文件是 Lanfeng （岚风） 项目的一部分。
// src/output/draw.rs - 目标检测结果可视化
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::{
  drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size},
  rect::Rect,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, warn};

use crate::model::{DetectItem, DetectResult};

// 常见系统字体位置，未指定字体时依次尝试
const SYSTEM_FONTS: [&str; 6] = [
  "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
  "/usr/share/fonts/TTF/DejaVuSans.ttf",
  "/usr/share/fonts/dejavu/DejaVuSans.ttf",
  "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
  "/System/Library/Fonts/Supplemental/Arial.ttf",
  "C:\\Windows\\Fonts\\arial.ttf",
];

// 线宽相对图像尺寸的比例
const LINE_WIDTH_RATIO: f32 = 0.003;
const MIN_LINE_WIDTH: i32 = 2;
// 每单位线宽对应的字号（像素）
const FONT_PX_PER_LINE_WIDTH: f32 = 22.0 / 3.0;
const LABEL_PADDING: i32 = 3;
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// 每个类别一个固定颜色
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
  colors: Vec<Rgb<u8>>,
}

impl Palette {
  /// 用固定种子生成 `count` 个随机颜色，各通道均匀分布于 [0, 255)
  pub fn seeded(count: usize, seed: u64) -> Self {
    let mut rng = StdRng::seed_from_u64(seed);
    let colors = (0..count.max(1))
      .map(|_| {
        let mut channel = || rng.gen_range(0.0f64..255.0).round() as u8;
        Rgb([channel(), channel(), channel()])
      })
      .collect();
    Self { colors }
  }

  pub fn get(&self, index: usize) -> Rgb<u8> {
    self.colors[index % self.colors.len()]
  }
}

pub fn load_font(path: &Path) -> std::io::Result<FontVec> {
  let data = std::fs::read(path)?;
  FontVec::try_from_vec(data)
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
}

fn find_system_font() -> Option<FontVec> {
  SYSTEM_FONTS.iter().find_map(|candidate| {
    let font = load_font(Path::new(candidate)).ok()?;
    debug!("使用系统字体: {}", candidate);
    Some(font)
  })
}

/// 线宽：max(round((H + W + C) / 2 * 0.003), 2)
pub fn line_width(image: &RgbImage) -> i32 {
  let extent = (image.height() + image.width() + 3) as f32;
  ((extent / 2.0 * LINE_WIDTH_RATIO).round() as i32).max(MIN_LINE_WIDTH)
}

pub struct Annotator {
  classes: Vec<String>,
  palette: Palette,
  font: Option<FontVec>,
}

impl Annotator {
  /// 使用系统字体；找不到字体时只画框不写标签
  pub fn new(classes: Vec<String>, palette: Palette) -> Self {
    Self {
      classes,
      palette,
      font: None,
    }
  }

  pub fn with_system_font(mut self) -> Self {
    self.font = find_system_font();
    if self.font.is_none() {
      warn!("未找到可用字体，标注将不包含类别名称");
    }
    self
  }

  pub fn with_font(mut self, font: FontVec) -> Self {
    self.font = Some(font);
    self
  }

  pub fn class_name(&self, class_id: u32) -> String {
    match self.classes.get(class_id as usize) {
      Some(name) => name.clone(),
      None => format!("class_{}", class_id),
    }
  }

  /// 类别颜色取类别名称在列表中首次出现位置对应的颜色
  pub fn color_for(&self, class_id: u32) -> Rgb<u8> {
    let index = self
      .classes
      .get(class_id as usize)
      .and_then(|name| self.classes.iter().position(|c| c == name))
      .unwrap_or(class_id as usize);
    self.palette.get(index)
  }

  /// 绘制置信度不低于 `threshold` 的检测项，返回绘制数量
  pub fn annotate(&self, image: &mut RgbImage, result: &DetectResult, threshold: f32) -> usize {
    let lw = line_width(image);
    let mut drawn = 0;
    for item in result.above(threshold) {
      self.draw_item(image, item, lw);
      drawn += 1;
    }
    drawn
  }

  fn draw_item(&self, image: &mut RgbImage, item: &DetectItem, lw: i32) {
    let color = self.color_for(item.class_id);
    let [x_min, y_min, x_max, y_max] = item.bbox.map(|v| v as i32);

    draw_box(image, (x_min, y_min), (x_max, y_max), lw, color);

    let Some(font) = &self.font else {
      return;
    };

    let label = self.class_name(item.class_id);
    let scale = PxScale::from(lw as f32 * FONT_PX_PER_LINE_WIDTH);
    let (text_w, text_h) = text_size(scale, font, &label);
    let (text_w, text_h) = (text_w as i32, text_h as i32);
    if text_w <= 0 || text_h <= 0 {
      return;
    }

    // 上方空间足够时标签画在框外，否则画在框内
    let outside = y_min - text_h >= LABEL_PADDING;
    let label_y = if outside {
      y_min - text_h - LABEL_PADDING
    } else {
      y_min
    };
    let rect = Rect::at(x_min, label_y).of_size(text_w as u32, (text_h + LABEL_PADDING) as u32);
    draw_filled_rect_mut(image, rect, color);
    draw_text_mut(image, TEXT_COLOR, x_min, label_y + 1, scale, font, &label);
  }
}

fn draw_box(image: &mut RgbImage, p1: (i32, i32), p2: (i32, i32), lw: i32, color: Rgb<u8>) {
  let half = lw / 2;
  for t in 0..lw {
    let d = t - half;
    let (x0, y0, x1, y1) = (p1.0 - d, p1.1 - d, p2.0 + d, p2.1 + d);
    if x1 <= x0 || y1 <= y0 {
      continue;
    }
    let rect = Rect::at(x0, y0).of_size((x1 - x0 + 1) as u32, (y1 - y0 + 1) as u32);
    draw_hollow_rect_mut(image, rect, color);
  }
}
