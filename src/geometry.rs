// 该文件是 Biaozhu （标注） 项目的一部分。
// src/geometry.rs - 边框格式与几何换算
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

use std::{fmt, str::FromStr};

use crate::error::AnnotateError;

/// 参考对角线长度（像素），字体大小按图像对角线相对它缩放
pub const REFERENCE_DIAGONAL: f64 = 1000.0;

/// 边框坐标格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxFormat {
  /// 左上角 x, y 与宽高
  #[default]
  Xywh,
  /// 左上角与右下角
  Xyxy,
  /// 中心点 x, y 与宽高
  Cxywh,
}

impl BoxFormat {
  pub const fn name(self) -> &'static str {
    match self {
      BoxFormat::Xywh => "xywh",
      BoxFormat::Xyxy => "xyxy",
      BoxFormat::Cxywh => "cxywh",
    }
  }

  /// 将该格式下的四个坐标换算为 `(x1, y1, x2, y2)`
  pub fn normalize(self, coords: [f32; 4]) -> BoundingBox {
    let [a, b, c, d] = coords;
    match self {
      BoxFormat::Xywh => BoundingBox::new(a, b, a + c, b + d),
      BoxFormat::Xyxy => BoundingBox::new(a, b, c, d),
      BoxFormat::Cxywh => {
        let (x, y) = (a - c / 2.0, b - d / 2.0);
        BoundingBox::new(x, y, x + c, y + d)
      }
    }
  }
}

impl FromStr for BoxFormat {
  type Err = AnnotateError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "xywh" => Ok(BoxFormat::Xywh),
      "xyxy" => Ok(BoxFormat::Xyxy),
      "cxywh" => Ok(BoxFormat::Cxywh),
      other => Err(AnnotateError::InvalidBoxFormat(other.to_string())),
    }
  }
}

impl fmt::Display for BoxFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// 轴对齐矩形 `(x1, y1)` - `(x2, y2)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
  pub x1: f32,
  pub y1: f32,
  pub x2: f32,
  pub y2: f32,
}

impl BoundingBox {
  pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
    Self { x1, y1, x2, y2 }
  }

  pub fn width(&self) -> f32 {
    self.x2 - self.x1
  }

  pub fn height(&self) -> f32 {
    self.y2 - self.y1
  }

  pub fn area(&self) -> f32 {
    self.width() * self.height()
  }

  /// 取整后的像素角点 `(x1, y1, x2, y2)`，角点均包含在矩形内
  ///
  /// 超出 `i64` 范围的坐标饱和到边界值。
  pub fn to_pixels(&self) -> (i64, i64, i64, i64) {
    (
      self.x1.round() as i64,
      self.y1.round() as i64,
      self.x2.round() as i64,
      self.y2.round() as i64,
    )
  }
}

/// 按图像对角线缩放字体大小: `floor(font_size * hypot(w, h) / 1000)`
pub fn scaled_font_size(font_size: u32, width: u32, height: u32) -> u32 {
  let diagonal = (width as f64).hypot(height as f64);
  (font_size as f64 * diagonal / REFERENCE_DIAGONAL).floor() as u32
}
