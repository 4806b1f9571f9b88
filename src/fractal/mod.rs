//! マンデルブロ集合ジェネレータ
//!
//! 各ピクセルのエスケープタイムを倍精度で計算し、4色のバンドに分類して
//! Canvas に点を打つ。描画範囲が実軸に対して対称な場合は下半分だけを計算し、
//! 同じ色を上下反転した行にも描く。

pub mod escape;
pub mod params;

pub use escape::{classify, escape_time, Band};
pub use params::{EscapeThresholds, FractalParams, FractalSettings, ParamError, PixelMapping, PlaneWindow};

use crate::canvas::Canvas;
use crate::palette::ColorIndex;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 並列描画で1回にまとめて計算する行数
pub const PARALLEL_CHUNK_ROWS: usize = 16;

/// 行と行の間で確認される中断フラグ
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// 描画結果の統計
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderReport {
    /// 計算した行数（反転描画した行は含まない）
    pub rows_rendered: usize,
    /// 分類したピクセル数
    pub pixels: u64,
    /// バンドごとのピクセル数（パレット順）
    pub band_counts: [u64; 4],
    /// 途中で中断されたか
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl RenderReport {
    fn add_row(&mut self, bands: &[Band]) {
        self.rows_rendered += 1;
        self.pixels += bands.len() as u64;
        for band in bands {
            self.band_counts[band.slot()] += 1;
        }
    }
}

/// フラクタル描画エンジン
#[derive(Debug, Clone)]
pub struct FractalEngine {
    params: FractalParams,
    re_step: f64,
    im_step: f64,
    mirrored: bool,
}

impl FractalEngine {
    pub fn new(params: FractalParams) -> Self {
        let grid = params.grid();
        let window = params.window();
        let (w_div, h_div) = match params.mapping() {
            PixelMapping::Span => (grid.width, grid.height),
            PixelMapping::Inclusive => (grid.xmax().max(1), grid.ymax().max(1)),
        };
        FractalEngine {
            params,
            re_step: window.width() / w_div as f64,
            im_step: window.height() / h_div as f64,
            mirrored: window.is_symmetric(),
        }
    }

    pub fn params(&self) -> &FractalParams {
        &self.params
    }

    /// 上下反転描画を使うか
    pub fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    /// ピクセル座標を複素平面の点に変換
    pub fn pixel_to_plane(&self, x: u16, y: u16) -> (f64, f64) {
        let window = self.params.window();
        let re = x as f64 * self.re_step + window.re_min;
        let im = y as f64 * self.im_step + window.im_min;
        (re, im)
    }

    pub fn escape_count(&self, x: u16, y: u16) -> u32 {
        let (re, im) = self.pixel_to_plane(x, y);
        escape_time(re, im, self.params.max_iterations())
    }

    pub fn pixel_band(&self, x: u16, y: u16) -> Band {
        classify(self.escape_count(x, y), self.params.max_iterations(), self.params.thresholds())
    }

    pub fn pixel_color(&self, x: u16, y: u16) -> ColorIndex {
        self.pixel_band(x, y).color(&self.params.palette())
    }

    /// 計算する行の順序（上から下へ）
    ///
    /// 対称な範囲では H/2 から 0 まで、それ以外は全行
    pub fn row_order(&self) -> impl Iterator<Item = u16> {
        let grid = self.params.grid();
        let top = if self.mirrored { grid.height / 2 } else { grid.ymax() };
        (0..=top).rev()
    }

    /// 1行分のバンドを計算（x の降順）
    fn compute_row(&self, y: u16) -> Vec<Band> {
        (0..self.params.grid().width)
            .rev()
            .map(|x| self.pixel_band(x, y))
            .collect()
    }

    /// 計算済みの行を Canvas に描く
    fn flush_row<C: Canvas + ?Sized>(&self, y: u16, bands: &[Band], canvas: &mut C) {
        let palette = self.params.palette();
        let width = self.params.grid().width;
        let mirror_y = self.params.grid().ymax() - y;
        for (x, band) in (0..width).rev().zip(bands) {
            let color = band.color(&palette);
            canvas.plot_dot(x, y, color);
            if self.mirrored {
                canvas.plot_dot(x, mirror_y, color);
            }
        }
    }

    /// 1行を計算して描く（反転行も含む）
    pub fn render_row<C: Canvas + ?Sized>(&self, y: u16, canvas: &mut C) -> [u64; 4] {
        let bands = self.compute_row(y);
        self.flush_row(y, &bands, canvas);
        let mut counts = [0u64; 4];
        for band in &bands {
            counts[band.slot()] += 1;
        }
        counts
    }

    /// パレットとモードを設定する
    pub fn prepare<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.set_palette(self.params.palette());
        canvas.set_mode(self.params.grid());
    }

    /// バンド3の色で外枠を描く
    pub fn draw_border<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        let grid = self.params.grid();
        let (xmax, ymax) = (grid.xmax(), grid.ymax());
        let color = self.params.palette().band3();
        canvas.draw_line(0, 0, 0, ymax, color);
        canvas.draw_line(0, ymax, xmax, ymax, color);
        canvas.draw_line(xmax, 0, xmax, ymax, color);
        canvas.draw_line(xmax, 0, 0, 0, color);
    }

    /// 全体を描画する
    pub fn generate<C: Canvas + ?Sized>(&self, canvas: &mut C) -> RenderReport {
        self.generate_with_cancel(canvas, &CancelToken::new())
    }

    /// 中断可能な描画。中断された場合は外枠を描かない
    pub fn generate_with_cancel<C: Canvas + ?Sized>(&self, canvas: &mut C, cancel: &CancelToken) -> RenderReport {
        let start = Instant::now();
        self.log_start("sequential");
        self.prepare(canvas);

        let mut report = RenderReport::default();
        for y in self.row_order() {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            let bands = self.compute_row(y);
            self.flush_row(y, &bands, canvas);
            report.add_row(&bands);
            if report.rows_rendered % 32 == 0 {
                log::debug!("Rendered {} rows (y = {})", report.rows_rendered, y);
            }
        }

        self.finish(canvas, report, start)
    }

    /// 行をスレッドプールで並列計算し、呼び出しスレッドで逐次順に描く
    ///
    /// Canvas への呼び出し順は generate と同一
    pub fn generate_parallel<C: Canvas + ?Sized>(&self, canvas: &mut C, cancel: &CancelToken) -> RenderReport {
        let start = Instant::now();
        self.log_start("parallel");
        self.prepare(canvas);

        let rows: Vec<u16> = self.row_order().collect();
        let mut report = RenderReport::default();
        'chunks: for chunk in rows.chunks(PARALLEL_CHUNK_ROWS) {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            let computed: Vec<Option<Vec<Band>>> = chunk
                .par_iter()
                .map(|&y| {
                    if cancel.is_cancelled() {
                        None
                    } else {
                        Some(self.compute_row(y))
                    }
                })
                .collect();
            for (&y, bands) in chunk.iter().zip(computed) {
                match bands {
                    Some(bands) => {
                        self.flush_row(y, &bands, canvas);
                        report.add_row(&bands);
                    }
                    None => {
                        report.cancelled = true;
                        break 'chunks;
                    }
                }
            }
            log::debug!("Rendered {} rows", report.rows_rendered);
        }

        self.finish(canvas, report, start)
    }

    fn log_start(&self, how: &str) {
        let grid = self.params.grid();
        log::info!(
            "Rendering {}x{} ({}), {} iterations, palette [{}], {}",
            grid.width,
            grid.height,
            how,
            self.params.max_iterations(),
            self.params.palette(),
            if self.mirrored { "mirrored" } else { "full grid" }
        );
    }

    fn finish<C: Canvas + ?Sized>(&self, canvas: &mut C, mut report: RenderReport, start: Instant) -> RenderReport {
        if report.cancelled {
            log::warn!("Rendering cancelled after {} rows", report.rows_rendered);
        } else {
            self.draw_border(canvas);
        }
        report.elapsed = start.elapsed();
        log::info!(
            "Rendered {} pixels in {:?} (bands {:?})",
            report.pixels,
            report.elapsed,
            report.band_counts
        );
        report
    }
}
