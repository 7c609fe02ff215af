// 该文件是 Biaozhu （标注） 项目的一部分。
// src/color.rs - 颜色工具
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

use image::{Rgb, Rgba};

use crate::error::{AnnotateError, Result};

pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

// 亮度分界（通道均值）
const CONTRAST_PIVOT: f32 = 127.5;

/// 可由 RGB 颜色构造的像素类型，绘制时用于统一 RGB / RGBA 画布
pub trait FromRgb {
  fn from_rgb(color: Rgb<u8>) -> Self;
}

impl FromRgb for Rgb<u8> {
  fn from_rgb(color: Rgb<u8>) -> Self {
    color
  }
}

impl FromRgb for Rgba<u8> {
  fn from_rgb(Rgb([r, g, b]): Rgb<u8>) -> Self {
    Rgba([r, g, b, u8::MAX])
  }
}

/// 根据背景色亮度选择文字颜色：亮背景用黑字，暗背景用白字
pub fn text_color_for(background: Rgb<u8>) -> Rgb<u8> {
  let Rgb([r, g, b]) = background;
  let mean = (r as f32 + g as f32 + b as f32) / 3.0;
  if mean > CONTRAST_PIVOT { BLACK } else { WHITE }
}

/// 解析 `#rrggbb` 或 `#rgb` 形式的颜色
pub fn parse_hex(text: &str) -> Result<Rgb<u8>> {
  let invalid = || AnnotateError::InvalidColor(text.to_string());
  let hex = text.trim().strip_prefix('#').ok_or_else(invalid)?;
  if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
    return Err(invalid());
  }

  let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

  match hex.len() {
    6 => Ok(Rgb([
      channel(&hex[0..2])?,
      channel(&hex[2..4])?,
      channel(&hex[4..6])?,
    ])),
    3 => {
      let mut rgb = [0u8; 3];
      for (i, c) in rgb.iter_mut().enumerate() {
        *c = channel(&hex[i..i + 1])? * 0x11;
      }
      Ok(Rgb(rgb))
    }
    _ => Err(invalid()),
  }
}

/// 生成 `n` 种色相均匀分布的颜色
pub fn palette(n: usize) -> Vec<Rgb<u8>> {
  (0..n)
    .map(|i| {
      let hue = (i as f32 / n as f32) * 360.0;
      hsv_to_rgb(hue, 0.8, 0.9)
    })
    .collect()
}

/// HSV 转 RGB
fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb<u8> {
  let c = v * s;
  let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
  let m = v - c;

  let (r, g, b) = match h {
    h if h < 60.0 => (c, x, 0.0),
    h if h < 120.0 => (x, c, 0.0),
    h if h < 180.0 => (0.0, c, x),
    h if h < 240.0 => (0.0, x, c),
    h if h < 300.0 => (x, 0.0, c),
    _ => (c, 0.0, x),
  };

  Rgb([
    ((r + m) * 255.0).round() as u8,
    ((g + m) * 255.0).round() as u8,
    ((b + m) * 255.0).round() as u8,
  ])
}
