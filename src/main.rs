// 该文件是 Biaozhu （标注） 项目的一部分。
// src/main.rs - 命令行主程序
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

mod args;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use clap::Parser;
use image::{DynamicImage, Rgb};
use ndarray::Array2;
use serde::Deserialize;
use tracing::info;

use biaozhu::{
  BoxAnnotation, BoxStyle, FromUrl, LabelFont, MaskAnnotation,
  color::{palette, parse_hex},
  draw_bboxes_with_font, draw_masks,
  input::ImageFileInput,
  output::SaveImageFileOutput,
};

use args::{Args, Command};

/// 标注文件中的一条检测框记录
#[derive(Deserialize, Debug)]
struct BoxRecord {
  bbox: [f32; 4],
  label: String,
  #[serde(default)]
  color: Option<String>,
  #[serde(default)]
  prob: Option<f32>,
}

fn load_box_annotations(path: &Path) -> Result<Vec<BoxAnnotation>> {
  let text = std::fs::read_to_string(path)
    .with_context(|| format!("无法读取标注文件 {}", path.display()))?;
  let records: Vec<BoxRecord> = serde_json::from_str(&text)
    .with_context(|| format!("标注文件格式错误 {}", path.display()))?;

  let fallback = palette(records.len());
  records
    .into_iter()
    .zip(fallback)
    .map(|(record, fallback)| -> Result<BoxAnnotation> {
      let color = match record.color.as_deref() {
        Some(hex) => parse_hex(hex)?,
        None => fallback,
      };
      let mut annotation = BoxAnnotation::new(record.bbox, record.label, color);
      annotation.prob = record.prob;
      Ok(annotation)
    })
    .collect()
}

fn load_mask(path: &Path) -> Result<Array2<f32>> {
  let luma = image::open(path)
    .with_context(|| format!("无法读取掩码 {}", path.display()))?
    .to_luma8();
  let (w, h) = luma.dimensions();
  Ok(Array2::from_shape_fn((h as usize, w as usize), |(y, x)| {
    luma.get_pixel(x as u32, y as u32)[0] as f32 / 255.0
  }))
}

fn load_mask_annotations(
  paths: &[PathBuf],
  labels: &[String],
  colors: &[Rgb<u8>],
) -> Result<Vec<MaskAnnotation>> {
  let n = paths.len();
  ensure!(labels.is_empty() || labels.len() == n, "标签数量 {} 与掩码数量 {} 不一致", labels.len(), n);
  ensure!(colors.is_empty() || colors.len() == n, "颜色数量 {} 与掩码数量 {} 不一致", colors.len(), n);

  let fallback = palette(n);
  paths
    .iter()
    .enumerate()
    .map(|(i, path)| -> Result<MaskAnnotation> {
      let label = match labels.get(i) {
        Some(label) => label.clone(),
        None => path
          .file_stem()
          .map(|s| s.to_string_lossy().into_owned())
          .unwrap_or_default(),
      };
      let color = colors.get(i).copied().unwrap_or(fallback[i]);
      Ok(MaskAnnotation::new(load_mask(path)?, label, color))
    })
    .collect()
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("输入图像: {}", args.input);
  info!("输出图像: {}", args.output);

  let image = ImageFileInput::from_url(&args.input)?.into_image();
  let output = SaveImageFileOutput::from_url(&args.output)?;

  let annotated = match args.command {
    Command::Boxes {
      annotations,
      font,
      format,
      width,
      font_size,
    } => {
      let boxes = load_box_annotations(&annotations)?;
      let font = match font {
        Some(path) => LabelFont::load(path)?,
        None => LabelFont::embedded()?,
      };
      let style = BoxStyle::default()
        .with_format(format)
        .with_width(width)
        .with_font_size(font_size);
      info!("绘制 {} 个检测框", boxes.len());
      draw_bboxes_with_font(&image, &boxes, &font, &style)
    }
    Command::Masks {
      masks,
      labels,
      colors,
      threshold,
      alpha,
    } => {
      let masks = load_mask_annotations(&masks, &labels, &colors)?;
      info!("叠加 {} 个掩码", masks.len());
      DynamicImage::ImageRgba8(draw_masks(&image, &masks, threshold, alpha)?)
    }
  };

  output.save(&annotated)?;

  Ok(())
}
