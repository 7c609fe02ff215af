// 该文件是 Biaozhu （标注） 项目的一部分。
// src/annotation.rs - 标注记录
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

use image::Rgb;
use ndarray::{Array2, Array4, Axis, s};

use crate::error::{AnnotateError, Result};

/// 单个检测框：坐标（格式由绘制参数决定）、标签、颜色与可选置信度
#[derive(Debug, Clone, PartialEq)]
pub struct BoxAnnotation {
  pub coords: [f32; 4],
  pub label: String,
  pub color: Rgb<u8>,
  pub prob: Option<f32>,
}

impl BoxAnnotation {
  pub fn new(coords: [f32; 4], label: impl Into<String>, color: Rgb<u8>) -> Self {
    Self {
      coords,
      label: label.into(),
      color,
      prob: None,
    }
  }

  pub fn with_prob(mut self, prob: f32) -> Self {
    self.prob = Some(prob);
    self
  }

  /// 标签文本，有置信度时追加百分比，如 `cat: 87.65%`
  pub fn label_text(&self) -> String {
    match self.prob {
      Some(prob) => format!("{}: {:.2}%", self.label, prob * 100.0),
      None => self.label.clone(),
    }
  }

  /// 由并列的坐标、标签、颜色（及置信度）序列组装记录，长度必须一致
  pub fn zip(
    boxes: &[[f32; 4]],
    labels: &[impl AsRef<str>],
    colors: &[Rgb<u8>],
    probs: Option<&[f32]>,
  ) -> Result<Vec<Self>> {
    let n = boxes.len();
    check_len("标签", n, labels.len())?;
    check_len("颜色", n, colors.len())?;
    if let Some(probs) = probs {
      check_len("置信度", n, probs.len())?;
    }

    Ok(
      boxes
        .iter()
        .zip(labels)
        .zip(colors)
        .enumerate()
        .map(|(i, ((coords, label), color))| Self {
          coords: *coords,
          label: label.as_ref().to_string(),
          color: *color,
          prob: probs.map(|p| p[i]),
        })
        .collect(),
    )
  }
}

/// 单个分割掩码：逐像素置信度（高 x 宽）、标签与颜色
///
/// 标签随记录携带，合成掩码时并不绘制。
#[derive(Debug, Clone, PartialEq)]
pub struct MaskAnnotation {
  pub mask: Array2<f32>,
  pub label: String,
  pub color: Rgb<u8>,
}

impl MaskAnnotation {
  pub fn new(mask: Array2<f32>, label: impl Into<String>, color: Rgb<u8>) -> Self {
    Self {
      mask,
      label: label.into(),
      color,
    }
  }

  /// 掩码尺寸 `(宽, 高)`
  pub fn dimensions(&self) -> (u32, u32) {
    let (rows, cols) = self.mask.dim();
    (cols as u32, rows as u32)
  }

  /// 拆分模型输出的掩码张量 `(数量, 1, 高, 宽)`，每个掩码取单例轴的第 0 个切片
  ///
  /// 掩码数量以标签数量为准，掩码与颜色都必须与之一致。
  pub fn from_stacked(
    masks: &Array4<f32>,
    labels: &[impl AsRef<str>],
    colors: &[Rgb<u8>],
  ) -> Result<Vec<Self>> {
    let n = labels.len();
    check_len("掩码", n, masks.len_of(Axis(0)))?;
    check_len("颜色", n, colors.len())?;
    if n > 0 && masks.len_of(Axis(1)) == 0 {
      return Err(AnnotateError::length_mismatch("掩码通道", 1, 0));
    }

    Ok(
      labels
        .iter()
        .zip(colors)
        .enumerate()
        .map(|(i, (label, color))| Self {
          mask: masks.slice(s![i, 0, .., ..]).to_owned(),
          label: label.as_ref().to_string(),
          color: *color,
        })
        .collect(),
    )
  }
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
  if expected == actual {
    Ok(())
  } else {
    Err(AnnotateError::length_mismatch(what, expected, actual))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const RED: Rgb<u8> = Rgb([255, 0, 0]);
  const BLUE: Rgb<u8> = Rgb([0, 0, 255]);

  #[test]
  fn label_text_without_prob_is_verbatim() {
    let ann = BoxAnnotation::new([0.0; 4], "cat", RED);
    assert_eq!(ann.label_text(), "cat");
  }

  #[test]
  fn label_text_with_prob_appends_percentage() {
    let ann = BoxAnnotation::new([0.0; 4], "cat", RED).with_prob(0.8765);
    assert_eq!(ann.label_text(), "cat: 87.65%");
    let ann = BoxAnnotation::new([0.0; 4], "dog", RED).with_prob(1.0);
    assert_eq!(ann.label_text(), "dog: 100.00%");
  }

  #[test]
  fn zip_parallel_sequences() {
    let anns = BoxAnnotation::zip(
      &[[1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0]],
      &["cat", "dog"],
      &[RED, BLUE],
      Some(&[0.5, 0.25]),
    )
    .unwrap();

    assert_eq!(anns.len(), 2);
    assert_eq!(anns[1].coords, [5.0, 6.0, 7.0, 8.0]);
    assert_eq!(anns[1].label, "dog");
    assert_eq!(anns[1].color, BLUE);
    assert_eq!(anns[1].label_text(), "dog: 25.00%");
  }

  #[test]
  fn zip_rejects_short_sequences() {
    let err = BoxAnnotation::zip(&[[0.0; 4], [0.0; 4]], &["cat"], &[RED, BLUE], None).unwrap_err();
    assert!(matches!(
      err,
      AnnotateError::LengthMismatch {
        expected: 2,
        actual: 1,
        ..
      }
    ));

    let err = BoxAnnotation::zip(&[[0.0; 4]], &["cat"], &[RED], Some(&[])).unwrap_err();
    assert!(matches!(err, AnnotateError::LengthMismatch { .. }));
  }

  #[test]
  fn from_stacked_takes_first_channel() {
    let mut masks = Array4::<f32>::zeros((2, 1, 3, 4));
    masks[[1, 0, 2, 3]] = 0.9;

    let anns = MaskAnnotation::from_stacked(&masks, &["a", "b"], &[RED, BLUE]).unwrap();
    assert_eq!(anns.len(), 2);
    assert_eq!(anns[0].dimensions(), (4, 3));
    assert_eq!(anns[0].mask.sum(), 0.0);
    assert_eq!(anns[1].mask[[2, 3]], 0.9);
    assert_eq!(anns[1].label, "b");
  }

  #[test]
  fn from_stacked_checks_counts() {
    let masks = Array4::<f32>::zeros((1, 1, 2, 2));
    assert!(MaskAnnotation::from_stacked(&masks, &["a", "b"], &[RED, BLUE]).is_err());
    assert!(MaskAnnotation::from_stacked(&masks, &["a"], &[]).is_err());
    let no_channel = Array4::<f32>::zeros((1, 0, 2, 2));
    assert!(MaskAnnotation::from_stacked(&no_channel, &["a"], &[RED]).is_err());
  }

  #[test]
  fn from_stacked_accepts_empty_batch() {
    let labels: [&str; 0] = [];
    for shape in [(0, 0, 2, 2), (0, 1, 2, 2)] {
      let masks = Array4::<f32>::zeros(shape);
      let anns = MaskAnnotation::from_stacked(&masks, &labels, &[]).unwrap();
      assert!(anns.is_empty());
    }
  }
}
