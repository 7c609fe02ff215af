// 该文件是 Biaozhu （标注） 项目的一部分。
// src/bbox.rs - 检测框与标签绘制
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

use std::path::Path;

use ab_glyph::PxScale;
use image::{DynamicImage, ImageBuffer, Pixel};
use imageproc::{
  drawing::{draw_filled_rect_mut, draw_hollow_rect_mut},
  rect::Rect,
};
use tracing::{debug, warn};

use crate::{
  annotation::BoxAnnotation,
  color::{FromRgb, text_color_for},
  error::Result,
  font::LabelFont,
  geometry::{BoundingBox, BoxFormat, scaled_font_size},
};

const DEFAULT_LINE_WIDTH: u32 = 2;
const DEFAULT_FONT_SIZE: u32 = 18;

/// 检测框绘制参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxStyle {
  /// 坐标格式
  pub format: BoxFormat,
  /// 边框线宽（像素）
  pub width: u32,
  /// 参考对角线（1000 像素）下的字号
  pub font_size: u32,
}

impl Default for BoxStyle {
  fn default() -> Self {
    Self {
      format: BoxFormat::default(),
      width: DEFAULT_LINE_WIDTH,
      font_size: DEFAULT_FONT_SIZE,
    }
  }
}

impl BoxStyle {
  pub fn with_format(mut self, format: BoxFormat) -> Self {
    self.format = format;
    self
  }

  pub fn with_width(mut self, width: u32) -> Self {
    self.width = width;
    self
  }

  pub fn with_font_size(mut self, font_size: u32) -> Self {
    self.font_size = font_size;
    self
  }
}

/// 加载 `font` 字体文件后在图像副本上绘制检测框与标签
pub fn draw_bboxes(
  image: &DynamicImage,
  boxes: &[BoxAnnotation],
  font: impl AsRef<Path>,
  style: &BoxStyle,
) -> Result<DynamicImage> {
  let font = LabelFont::load(font)?;
  Ok(draw_bboxes_with_font(image, boxes, &font, style))
}

/// 使用已加载的字体在图像副本上绘制检测框与标签
///
/// RGB 与 RGBA 图像保持原有颜色模式；其余模式按是否带透明通道转换为 RGBA 或 RGB。
///
/// 图像过小时缩放后的字号可能为 0：此时不报错，只记录警告，
/// 边框与标签背景照常绘制，文字不可见。
/// 超出画布的坐标（包括极大值）按画布裁剪，不视为错误。
pub fn draw_bboxes_with_font(
  image: &DynamicImage,
  boxes: &[BoxAnnotation],
  font: &LabelFont,
  style: &BoxStyle,
) -> DynamicImage {
  let font_size = scaled_font_size(style.font_size, image.width(), image.height());
  if font_size == 0 && !boxes.is_empty() {
    warn!(
      "图像 {}x{} 过小，缩放后字号为 0，标签文字不可见",
      image.width(),
      image.height()
    );
  }

  let painter = BoxPainter {
    font,
    scale: font.scale(font_size),
    format: style.format,
    line_width: style.width,
  };

  match image {
    DynamicImage::ImageRgb8(canvas) => DynamicImage::ImageRgb8(painter.paint(canvas.clone(), boxes)),
    DynamicImage::ImageRgba8(canvas) => DynamicImage::ImageRgba8(painter.paint(canvas.clone(), boxes)),
    other if other.color().has_alpha() => {
      DynamicImage::ImageRgba8(painter.paint(other.to_rgba8(), boxes))
    }
    other => DynamicImage::ImageRgb8(painter.paint(other.to_rgb8(), boxes)),
  }
}

struct BoxPainter<'a> {
  font: &'a LabelFont,
  scale: PxScale,
  format: BoxFormat,
  line_width: u32,
}

impl BoxPainter<'_> {
  fn paint<P>(&self, mut canvas: ImageBuffer<P, Vec<u8>>, boxes: &[BoxAnnotation]) -> ImageBuffer<P, Vec<u8>>
  where
    P: Pixel<Subpixel = u8> + FromRgb,
  {
    for ann in boxes {
      let rect = self.format.normalize(ann.coords);
      let text = ann.label_text();
      let color = P::from_rgb(ann.color);
      debug!("绘制检测框 {} at {:?}", text, rect);

      self.draw_outline(&mut canvas, &rect, color);

      // 标签背景贴在边框上沿外侧，与左边对齐
      let (label_w, label_h) = self.font.measure(self.scale, &text);
      let (x1, y1, _, _) = rect.to_pixels();
      let text_y = y1.saturating_sub(label_h as i64);
      if let Some(tag) = clip_rect(
        (x1, text_y, x1.saturating_add(label_w as i64), y1),
        canvas.dimensions(),
      ) {
        draw_filled_rect_mut(&mut canvas, tag, color);
      }

      // 文字完全落在画布外时，原点可以收拢到画布附近而不改变可见结果
      let (cw, ch) = canvas.dimensions();
      let text_x = x1.clamp(-(label_w as i64) - 2, cw as i64) as i32;
      let text_y = text_y.clamp(-(label_h as i64) - 2, ch as i64) as i32;
      let text_color = P::from_rgb(text_color_for(ann.color));
      self
        .font
        .draw_text(&mut canvas, text_color, text_x, text_y, self.scale, &text);
    }
    canvas
  }

  // 线宽为 n 时，自外向内绘制 n 层一像素宽的边框
  fn draw_outline<P>(&self, canvas: &mut ImageBuffer<P, Vec<u8>>, rect: &BoundingBox, color: P)
  where
    P: Pixel<Subpixel = u8>,
  {
    let (cw, ch) = (canvas.width() as i64, canvas.height() as i64);
    let (x1, y1, x2, y2) = rect.to_pixels();

    // 四条边都在画布外侧的外圈不可见，从第一个可能可见的内圈开始
    let first = [
      (-1i64).saturating_sub(x1),
      (-1i64).saturating_sub(y1),
      x2.saturating_sub(cw),
      y2.saturating_sub(ch),
    ]
    .into_iter()
    .min()
    .unwrap_or(0)
    .max(0);

    for inset in first..self.line_width as i64 {
      let ring = (
        x1.saturating_add(inset),
        y1.saturating_add(inset),
        x2.saturating_sub(inset),
        y2.saturating_sub(inset),
      );
      let (rx1, ry1, rx2, ry2) = ring;
      // 内圈已交叉，或整圈移出画布后更内侧的圈也不可见
      if rx2 < rx1 || ry2 < ry1 || rx1 > cw || ry1 > ch || rx2 < -1 || ry2 < -1 {
        break;
      }
      if let Some(ring) = clip_rect(ring, canvas.dimensions()) {
        draw_hollow_rect_mut(canvas, ring, color);
      }
    }
  }
}

/// 将含端点的角点 `(x1, y1, x2, y2)` 裁剪到画布外扩一像素的范围
///
/// 裁剪后的边框在画布内的像素与原矩形一致，被移到外扩像素上的边不可见。
fn clip_rect((x1, y1, x2, y2): (i64, i64, i64, i64), (width, height): (u32, u32)) -> Option<Rect> {
  if x2 < x1 || y2 < y1 {
    return None;
  }
  let (w, h) = (width as i64, height as i64);
  let (x1, x2) = (x1.clamp(-1, w), x2.clamp(-1, w));
  let (y1, y2) = (y1.clamp(-1, h), y2.clamp(-1, h));
  Some(Rect::at(x1 as i32, y1 as i32).of_size((x2 - x1 + 1) as u32, (y2 - y1 + 1) as u32))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    color::{BLACK, WHITE},
    error::AnnotateError,
  };
  use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

  const FONT_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/DejaVuSans.ttf");
  const RED: Rgb<u8> = Rgb([255, 0, 0]);
  const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
  const YELLOW: Rgb<u8> = Rgb([255, 255, 0]);
  const GRAY: Rgb<u8> = Rgb([128, 128, 128]);

  fn canvas(w: u32, h: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, GRAY))
  }

  fn xyxy() -> BoxStyle {
    BoxStyle::default().with_format(BoxFormat::Xyxy)
  }

  #[test]
  fn default_style() {
    let style = BoxStyle::default();
    assert_eq!(style.format, BoxFormat::Xywh);
    assert_eq!(style.width, 2);
    assert_eq!(style.font_size, 18);
  }

  #[test]
  fn draws_outline_with_line_width() {
    let image = canvas(200, 200);
    let boxes = [BoxAnnotation::new([10.0, 10.0, 50.0, 50.0], "cat", RED)];

    let out = draw_bboxes(&image, &boxes, FONT_PATH, &xyxy()).unwrap().to_rgb8();

    for (x, y) in [(10, 30), (11, 30), (50, 30), (49, 30), (30, 50), (30, 49), (50, 50)] {
      assert_eq!(*out.get_pixel(x, y), RED, "({x}, {y})");
    }
    for (x, y) in [(12, 30), (30, 30), (48, 30), (9, 30), (51, 30), (30, 51)] {
      assert_eq!(*out.get_pixel(x, y), GRAY, "({x}, {y})");
    }
  }

  #[test]
  fn keeps_dimensions_and_leaves_input_untouched() {
    let image = canvas(320, 240);
    let before = image.clone();
    let boxes = [BoxAnnotation::new([20.0, 40.0, 100.0, 80.0], "dog", GREEN).with_prob(0.5)];

    let out = draw_bboxes(&image, &boxes, FONT_PATH, &BoxStyle::default()).unwrap();

    assert_eq!((out.width(), out.height()), (320, 240));
    assert_eq!(image, before);
    assert_ne!(out, image);
  }

  #[test]
  fn label_tag_sits_above_box_with_contrasting_text() {
    let image = canvas(1000, 1000);
    let font = LabelFont::load(FONT_PATH).unwrap();
    let boxes = [BoxAnnotation::new([100.0, 200.0, 300.0, 400.0], "cat", RED)];

    let out = draw_bboxes_with_font(&image, &boxes, &font, &xyxy()).to_rgb8();

    let scale = font.scale(scaled_font_size(18, 1000, 1000));
    let (label_w, label_h) = font.measure(scale, "cat");
    assert!(label_w > 0 && label_h > 0);

    let px = |x: u32, y: u32| *out.get_pixel(x, y);
    let tag = (100..=100 + label_w).flat_map(|x| (200 - label_h..=200).map(move |y| px(x, y)));
    let (mut red, mut light) = (0, 0);
    for p in tag {
      if p == RED {
        red += 1;
      } else if p[1] > 200 && p[2] > 200 {
        light += 1;
      }
      assert_ne!(p, GRAY);
    }
    assert!(red > 0);
    assert!(light > 0, "红色背景上应为白色文字");

    // 标签右侧与上方保持原样
    assert_eq!(*out.get_pixel(100 + label_w + 2, 200 - label_h / 2), GRAY);
    assert_eq!(*out.get_pixel(100, 200 - label_h - 2), GRAY);
  }

  #[test]
  fn bright_color_gets_dark_text() {
    let image = canvas(1000, 1000);
    let font = LabelFont::embedded().unwrap();
    let boxes = [BoxAnnotation::new([100.0, 200.0, 300.0, 400.0], "bus", YELLOW)];

    let out = draw_bboxes_with_font(&image, &boxes, &font, &xyxy()).to_rgb8();

    let (label_w, label_h) = font.measure(font.scale(25), "bus");
    let px = |x: u32, y: u32| *out.get_pixel(x, y);
    let dark = (100..=100 + label_w)
      .flat_map(|x| (200 - label_h..=200).map(move |y| px(x, y)))
      .filter(|p| p[0] < 60 && p[1] < 60)
      .count();
    assert!(dark > 0, "黄色背景上应为黑色文字");
    assert_eq!(text_color_for(YELLOW), BLACK);
    assert_eq!(text_color_for(RED), WHITE);
  }

  #[test]
  fn cxywh_boxes_are_centered() {
    let image = canvas(200, 200);
    let boxes = [BoxAnnotation::new([100.0, 100.0, 40.0, 20.0], "c", RED)];
    let style = BoxStyle::default().with_format(BoxFormat::Cxywh).with_width(1);

    let out = draw_bboxes(&image, &boxes, FONT_PATH, &style).unwrap().to_rgb8();

    assert_eq!(*out.get_pixel(80, 100), RED);
    assert_eq!(*out.get_pixel(120, 100), RED);
    assert_eq!(*out.get_pixel(100, 110), RED);
    assert_eq!(*out.get_pixel(81, 100), GRAY);
  }

  #[test]
  fn later_boxes_draw_over_earlier() {
    let image = canvas(200, 200);
    let boxes = [
      BoxAnnotation::new([50.0, 50.0, 60.0, 60.0], "a", RED),
      BoxAnnotation::new([50.0, 50.0, 60.0, 60.0], "b", GREEN),
    ];

    let out = draw_bboxes(&image, &boxes, FONT_PATH, &BoxStyle::default()).unwrap().to_rgb8();

    assert_eq!(*out.get_pixel(50, 80), GREEN);
    assert_eq!(*out.get_pixel(110, 80), GREEN);
  }

  #[test]
  fn off_canvas_boxes_are_clipped() {
    let image = canvas(50, 50);
    let boxes = [
      BoxAnnotation::new([-20.0, -20.0, 40.0, 40.0], "edge", RED),
      BoxAnnotation::new([500.0, 500.0, 10.0, 10.0], "gone", GREEN),
    ];

    let out = draw_bboxes(&image, &boxes, FONT_PATH, &BoxStyle::default()).unwrap().to_rgb8();

    assert_eq!(out.dimensions(), (50, 50));
    assert_eq!(*out.get_pixel(20, 5), RED);
    assert!(out.pixels().all(|p| *p != GREEN));
  }

  #[test]
  fn huge_coordinates_are_clipped() {
    let image = canvas(50, 50);
    let font = LabelFont::embedded().unwrap();
    let boxes = [BoxAnnotation::new([-3.0e9, 0.0, 3.0e9, 10.0], "wide", RED)];

    let out = draw_bboxes_with_font(&image, &boxes, &font, &xyxy()).to_rgb8();

    for x in [0, 25, 49] {
      assert_eq!(*out.get_pixel(x, 0), RED);
      assert_eq!(*out.get_pixel(x, 1), RED);
      assert_eq!(*out.get_pixel(x, 10), RED);
      assert_eq!(*out.get_pixel(x, 5), GRAY);
    }
  }

  #[test]
  fn extreme_coordinates_and_line_width_do_not_overflow() {
    let image = canvas(50, 50);
    let font = LabelFont::embedded().unwrap();
    let boxes = [
      BoxAnnotation::new([f32::MIN, f32::MIN, f32::MAX, f32::MAX], "all", GREEN),
      BoxAnnotation::new([-3.0e9, -3.0e9, 3.0e9, 3.0e9], "fill", RED),
    ];
    let style = xyxy().with_width(u32::MAX);

    let out = draw_bboxes_with_font(&image, &boxes, &font, &style).to_rgb8();

    // 线宽足够大时，各圈边框铺满画布
    assert!(out.pixels().all(|p| *p == RED));
  }

  #[test]
  fn rgba_input_stays_rgba() {
    let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 0])));
    let boxes = [BoxAnnotation::new([10.0, 30.0, 20.0, 20.0], "x", RED)];

    let out = draw_bboxes(&image, &boxes, FONT_PATH, &BoxStyle::default()).unwrap();

    let out = out.as_rgba8().expect("RGBA 输出");
    assert_eq!(*out.get_pixel(10, 40), Rgba([255, 0, 0, 255]));
  }

  #[test]
  fn grayscale_input_is_drawn_in_rgb() {
    let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(64, 64, Luma([128])));
    let boxes = [BoxAnnotation::new([10.0, 20.0, 30.0, 30.0], "g", RED)];

    let out = draw_bboxes(&image, &boxes, FONT_PATH, &BoxStyle::default()).unwrap();

    let out = out.as_rgb8().expect("RGB 输出");
    assert_eq!(*out.get_pixel(10, 30), RED);
  }

  #[test]
  fn missing_font_fails_before_drawing() {
    let image = canvas(10, 10);
    let boxes = [BoxAnnotation::new([1.0, 1.0, 2.0, 2.0], "x", RED)];
    let result = draw_bboxes(&image, &boxes, "/no/such/font.ttf", &BoxStyle::default());
    assert!(matches!(result, Err(AnnotateError::FontRead { .. })));
  }

  #[test]
  fn tiny_image_still_draws_boxes() {
    let image = canvas(20, 20);
    let boxes = [BoxAnnotation::new([5.0, 5.0, 10.0, 10.0], "tiny", RED).with_prob(0.9)];

    let out = draw_bboxes(&image, &boxes, FONT_PATH, &BoxStyle::default()).unwrap().to_rgb8();

    assert_eq!(*out.get_pixel(5, 10), RED);
  }

  #[test]
  fn zero_font_size_draws_boxes_without_text() {
    let image = canvas(100, 100);
    let boxes = [BoxAnnotation::new([40.0, 40.0, 20.0, 20.0], "hidden", RED)];
    let style = BoxStyle::default().with_font_size(0);

    let out = draw_bboxes_with_font(&image, &boxes, &LabelFont::embedded().unwrap(), &style).to_rgb8();

    assert_eq!(*out.get_pixel(40, 40), RED);
    assert_eq!(*out.get_pixel(60, 50), RED);
    assert_eq!(*out.get_pixel(50, 50), GRAY);
    // 红底标签的文字为白色，字号为 0 时不应出现
    assert!(out.pixels().all(|p| *p == RED || *p == GRAY));
  }
}
