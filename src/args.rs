// 该文件是 Biaozhu （标注） 项目的一部分。
// src/args.rs - 命令行参数
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

use clap::{Parser, Subcommand};
use url::Url;

use biaozhu::{BoxFormat, color::parse_hex};
use image::Rgb;

/// Biaozhu 标注工具
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入图像，如 image:///data/in.jpg
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,

  /// 输出图像，如 image:///data/out.png
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// 绘制检测框与标签
  Boxes {
    /// 标注文件（JSON 数组，元素形如 {"bbox": [..], "label": "cat", "color": "#ff0000", "prob": 0.87}）
    #[arg(long, value_name = "FILE")]
    annotations: PathBuf,

    /// 字体文件路径，缺省使用内置字体
    #[arg(long, value_name = "FONT")]
    font: Option<PathBuf>,

    /// 坐标格式: xywh、xyxy 或 cxywh
    #[arg(long, default_value = "xywh", value_name = "FORMAT")]
    format: BoxFormat,

    /// 边框线宽
    #[arg(long, default_value = "2", value_name = "PIXELS")]
    width: u32,

    /// 参考对角线 1000 像素下的字号
    #[arg(long, default_value = "18", value_name = "SIZE")]
    font_size: u32,
  },

  /// 叠加分割掩码
  Masks {
    /// 掩码图像（灰度值 / 255 作为置信度），可重复
    #[arg(long = "mask", value_name = "FILE", required = true)]
    masks: Vec<PathBuf>,

    /// 每个掩码的标签，数量与掩码一致
    #[arg(long = "label", value_name = "LABEL")]
    labels: Vec<String>,

    /// 每个掩码的颜色（#rrggbb），缺省自动分配
    #[arg(long = "color", value_name = "COLOR", value_parser = parse_hex)]
    colors: Vec<Rgb<u8>>,

    /// 置信度阈值 (0.0 - 1.0)
    #[arg(long, default_value = "0.5", value_name = "THRESHOLD")]
    threshold: f32,

    /// 掩码不透明度 (0.0 - 1.0)
    #[arg(long, default_value = "0.3", value_name = "ALPHA")]
    alpha: f32,
  },
}
