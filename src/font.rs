// 该文件是 Biaozhu （标注） 项目的一部分。
// src/font.rs - 标签字体加载与文本排版
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

use ab_glyph::{Font, FontArc, PxScale};
use image::Pixel;
use imageproc::{
  definitions::Clamp,
  drawing::{Canvas, draw_text_mut, text_size},
};
use tracing::debug;

use crate::error::{AnnotateError, Result};

// 多行标签的行间距（像素）
const LINE_SPACING: u32 = 4;

/// 标签字体
#[derive(Clone)]
pub struct LabelFont {
  font: FontArc,
}

impl LabelFont {
  /// 从字体文件加载（TrueType / OpenType）
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| AnnotateError::FontRead {
      path: path.to_path_buf(),
      source,
    })?;
    let font = FontArc::try_from_vec(data)?;
    debug!("加载字体: {}", path.display());
    Ok(Self { font })
  }

  /// 内置的 DejaVu Sans 字体
  pub fn embedded() -> Result<Self> {
    let font_data: &'static [u8] = include_bytes!("../assets/DejaVuSans.ttf");
    let font = FontArc::try_from_slice(font_data)?;
    Ok(Self { font })
  }

  /// 将字号（em 像素）换算为 ab_glyph 的像素缩放
  pub fn scale(&self, size: u32) -> PxScale {
    let size = size as f32;
    match self.font.units_per_em() {
      Some(units_per_em) => PxScale::from(size * self.font.height_unscaled() / units_per_em),
      None => PxScale::from(size),
    }
  }

  // 行距取字母 "A" 的渲染高度加行间距，与 Pillow 的多行文本排版一致
  fn line_advance(&self, scale: PxScale) -> u32 {
    text_size(scale, &self.font, "A").1 + LINE_SPACING
  }

  /// 测量文本渲染后的包围尺寸 `(宽, 高)`，以 `(0, 0)` 为原点，支持 `\n` 分行
  ///
  /// 相邻两行的起点间隔为字母 `A` 的高度加 4 像素。
  pub fn measure(&self, scale: PxScale, text: &str) -> (u32, u32) {
    let advance = self.line_advance(scale);
    let mut width = 0;
    let mut height = 0;

    for (i, line) in text.split('\n').enumerate() {
      let (w, h) = text_size(scale, &self.font, line);
      width = width.max(w);
      height = height.max(i as u32 * advance + h);
    }

    (width, height)
  }

  /// 从 `(x, y)` 开始逐行绘制文本
  pub fn draw_text<C>(&self, canvas: &mut C, color: C::Pixel, x: i32, y: i32, scale: PxScale, text: &str)
  where
    C: Canvas,
    <C::Pixel as Pixel>::Subpixel: Into<f32> + Clamp<f32>,
  {
    let advance = self.line_advance(scale) as i32;
    for (i, line) in text.split('\n').enumerate() {
      draw_text_mut(canvas, color, x, y + i as i32 * advance, scale, &self.font, line);
    }
  }
}

impl std::fmt::Debug for LabelFont {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("LabelFont").finish_non_exhaustive()
  }
}
