// 该文件是 Biaozhu （标注） 项目的一部分。
// src/error.rs - 标注错误定义
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

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotateError {
  #[error("不支持的边框格式 '{0}'，可选 'xywh'、'xyxy' 或 'cxywh'")]
  InvalidBoxFormat(String),
  #[error("{what} 数量不匹配: 期望 {expected}, 实际 {actual}")]
  LengthMismatch {
    what: &'static str,
    expected: usize,
    actual: usize,
  },
  #[error("掩码尺寸不匹配: 期望 {}x{}, 实际 {}x{}", expected.0, expected.1, actual.0, actual.1)]
  ShapeMismatch {
    /// 图像的 (宽, 高)
    expected: (u32, u32),
    /// 掩码的 (宽, 高)
    actual: (u32, u32),
  },
  #[error("无法读取字体文件 {}: {source}", path.display())]
  FontRead {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("无效的字体数据: {0}")]
  InvalidFont(#[from] ab_glyph::InvalidFont),
  #[error("无效的颜色: {0}")]
  InvalidColor(String),
}

impl AnnotateError {
  pub(crate) fn length_mismatch(what: &'static str, expected: usize, actual: usize) -> Self {
    Self::LengthMismatch {
      what,
      expected,
      actual,
    }
  }
}

pub type Result<T> = std::result::Result<T, AnnotateError>;
