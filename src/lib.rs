//! DAIFRACT - DAI Mandelbrot Demo in Rust
//!
//! DAIパーソナルコンピュータのグラフィックROM相当の描画面と、
//! その上に描く4色マンデルブロ集合:
//! - 倍精度エスケープタイム計算
//! - 反復回数による4色バンド分類
//! - 実軸対称を利用した上下反転描画
//! - DAIの16色テーブル、グラフィックモード、PNG出力

pub mod palette;
pub mod canvas;
pub mod fractal;
pub mod demo;
pub mod screenshot;
pub mod config;
