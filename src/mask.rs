// 该文件是 Biaozhu （标注） 项目的一部分。
// src/mask.rs - 分割掩码叠加
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

use image::{DynamicImage, Rgb, Rgba, RgbaImage, imageops};
use tracing::debug;

use crate::{
  annotation::MaskAnnotation,
  error::{AnnotateError, Result},
};

pub const DEFAULT_MASK_ALPHA: f32 = 0.3;

/// 将掩码按顺序叠加到图像副本上，返回 RGBA 图像
///
/// 置信度严格大于 `conf_threshold` 的像素以 `color` 着色，透明度为 `round(alpha * 255)`，
/// 其余像素完全透明。后叠加的掩码覆盖在先前结果之上。
/// 所有掩码的尺寸都会在合成前检查，不匹配时不产生任何输出。
///
/// 叠加采用 Porter-Duff source-over（`imageops::overlay`）。底图不透明时，
/// 结果与按掩码透明度直接粘贴一致；底图半透明时，颜色不会被底图的透明度冲淡。
pub fn draw_masks(
  image: &DynamicImage,
  masks: &[MaskAnnotation],
  conf_threshold: f32,
  alpha: f32,
) -> Result<RgbaImage> {
  let expected = (image.width(), image.height());
  if let Some(bad) = masks.iter().find(|m| m.dimensions() != expected) {
    return Err(AnnotateError::ShapeMismatch {
      expected,
      actual: bad.dimensions(),
    });
  }

  let alpha = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
  let mut annotated = image.to_rgba8();

  for MaskAnnotation { mask, label, color } in masks {
    debug!("叠加掩码: {}", label);
    let overlay = mask_overlay(mask, *color, conf_threshold, alpha);
    imageops::overlay(&mut annotated, &overlay, 0, 0);
  }

  Ok(annotated)
}

/// 掩码转为 RGBA 叠加层
fn mask_overlay(
  mask: &ndarray::Array2<f32>,
  Rgb([r, g, b]): Rgb<u8>,
  conf_threshold: f32,
  alpha: u8,
) -> RgbaImage {
  let (rows, cols) = mask.dim();
  RgbaImage::from_fn(cols as u32, rows as u32, |x, y| {
    if mask[[y as usize, x as usize]] > conf_threshold {
      Rgba([r, g, b, alpha])
    } else {
      Rgba([0, 0, 0, 0])
    }
  })
}
