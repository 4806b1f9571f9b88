//! DAI グラフィック描画面
//!
//! ROMのグラフィックルーチン（MODE, COLORG, DOT, DRAW, FILL, SCRN）に
//! 相当する操作を Canvas トレイトとして定義し、メモリ上のフレームバッファで実装する。
//! 座標系はDAIと同じく左下が (0,0)。

use crate::palette::{ColorIndex, Palette};
use serde::{Deserialize, Serialize};

/// 描画グリッド（ピクセル数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    pub width: u16,
    pub height: u16,
}

impl Default for GridSpec {
    /// モード6 (336x256)
    fn default() -> Self {
        GridSpec { width: 336, height: 256 }
    }
}

impl GridSpec {
    pub fn new(width: u16, height: u16) -> Self {
        GridSpec { width, height }
    }

    /// X座標の最大値（DAIの XMAX）
    pub fn xmax(&self) -> u16 {
        self.width.saturating_sub(1)
    }

    /// Y座標の最大値（DAIの YMAX）
    pub fn ymax(&self) -> u16 {
        self.height.saturating_sub(1)
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// DAIのグラフィックモード
///
/// 奇数コードは画面下部に4行のテキスト領域を持つ "A" モード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicsMode {
    Mode1,
    Mode1A,
    Mode2,
    Mode2A,
    Mode3,
    Mode3A,
    Mode4,
    Mode4A,
    Mode5,
    Mode5A,
    Mode6,
    Mode6A,
}

impl GraphicsMode {
    const ALL: [GraphicsMode; 12] = [
        GraphicsMode::Mode1,
        GraphicsMode::Mode1A,
        GraphicsMode::Mode2,
        GraphicsMode::Mode2A,
        GraphicsMode::Mode3,
        GraphicsMode::Mode3A,
        GraphicsMode::Mode4,
        GraphicsMode::Mode4A,
        GraphicsMode::Mode5,
        GraphicsMode::Mode5A,
        GraphicsMode::Mode6,
        GraphicsMode::Mode6A,
    ];

    /// MODE命令に渡すコード (0-11) から変換
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn grid(self) -> GridSpec {
        match self.code() / 4 {
            0 => GridSpec::new(72, 65),
            1 => GridSpec::new(160, 130),
            _ => GridSpec::new(336, 256),
        }
    }

    pub fn colors(self) -> u8 {
        if (self.code() / 2) % 2 == 0 {
            16
        } else {
            4
        }
    }

    pub fn has_text_area(self) -> bool {
        self.code() % 2 == 1
    }

    pub fn name(self) -> String {
        let number = self.code() / 2 + 1;
        if self.has_text_area() {
            format!("mode {}A", number)
        } else {
            format!("mode {}", number)
        }
    }
}

/// グラフィック描画先
///
/// DAIのROMと同様にエラーは返さない。範囲外の扱いは実装側が決める。
pub trait Canvas {
    /// 画面モードを変更し、背景色でクリアする
    fn set_mode(&mut self, grid: GridSpec);
    /// 4色モードのパレットを設定する
    fn set_palette(&mut self, palette: Palette);
    /// 点を描く
    fn plot_dot(&mut self, x: u16, y: u16, color: ColorIndex);
    /// 両端を含む直線を描く
    fn draw_line(&mut self, x0: u16, y0: u16, x1: u16, y1: u16, color: ColorIndex);
    /// 指定色を読み出す（SCRN相当）
    fn pixel_color(&self, x: u16, y: u16) -> Option<ColorIndex>;

    /// 両端を含む矩形を塗りつぶす
    fn fill_rect(&mut self, x0: u16, y0: u16, x1: u16, y1: u16, color: ColorIndex) {
        let (lo, hi) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        for y in lo..=hi {
            self.draw_line(x0, y, x1, y, color);
        }
    }
}

/// インデックスカラーのフレームバッファ
pub struct FrameBuffer {
    grid: GridSpec,
    palette: Palette,
    pixels: Vec<ColorIndex>,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new(GridSpec::default())
    }
}

impl FrameBuffer {
    pub fn new(grid: GridSpec) -> Self {
        let palette = Palette::default();
        FrameBuffer {
            grid,
            palette,
            pixels: vec![palette.background(); grid.pixel_count()],
        }
    }

    pub fn grid(&self) -> GridSpec {
        self.grid
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    /// 背景色でクリア
    pub fn clear(&mut self) {
        let bg = self.palette.background();
        self.pixels.iter_mut().for_each(|p| *p = bg);
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        if self.grid.contains(x, y) {
            Some(y as usize * self.grid.width as usize + x as usize)
        } else {
            None
        }
    }

    /// 色ごとのピクセル数
    pub fn histogram(&self) -> [usize; 16] {
        let mut counts = [0usize; 16];
        for p in &self.pixels {
            counts[p.value() as usize] += 1;
        }
        counts
    }

    /// 0x00RRGGBB 形式に変換（上の行から順、整数倍に拡大）
    pub fn to_argb(&self, scale: usize) -> Vec<u32> {
        let scale = scale.max(1);
        let width = self.grid.width as usize;
        let height = self.grid.height as usize;
        let out_width = width * scale;
        let mut out = Vec::with_capacity(out_width * height * scale);
        for row in (0..height).rev() {
            let start = row * width;
            let mut line = Vec::with_capacity(out_width);
            for p in &self.pixels[start..start + width] {
                let rgb = p.rgb();
                line.extend(std::iter::repeat(rgb).take(scale));
            }
            for _ in 0..scale {
                out.extend_from_slice(&line);
            }
        }
        out
    }
}

impl Canvas for FrameBuffer {
    fn set_mode(&mut self, grid: GridSpec) {
        if grid != self.grid {
            log::debug!("Screen mode changed to {}x{}", grid.width, grid.height);
            self.grid = grid;
            self.pixels = vec![self.palette.background(); grid.pixel_count()];
        } else {
            self.clear();
        }
    }

    fn set_palette(&mut self, palette: Palette) {
        log::debug!("Palette set to {}", palette);
        self.palette = palette;
    }

    fn plot_dot(&mut self, x: u16, y: u16, color: ColorIndex) {
        match self.index(x, y) {
            Some(i) => self.pixels[i] = color,
            None => log::debug!("Dot outside screen ignored: ({}, {})", x, y),
        }
    }

    fn draw_line(&mut self, x0: u16, y0: u16, x1: u16, y1: u16, color: ColorIndex) {
        // Bresenham
        let (mut x, mut y) = (x0 as i32, y0 as i32);
        let (x1, y1) = (x1 as i32, y1 as i32);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.plot_dot(x as u16, y as u16, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn pixel_color(&self, x: u16, y: u16) -> Option<ColorIndex> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    fn fill_rect(&mut self, x0: u16, y0: u16, x1: u16, y1: u16, color: ColorIndex) {
        let (xl, xh) = (x0.min(x1), x0.max(x1).min(self.grid.xmax()));
        let (yl, yh) = (y0.min(y1), y0.max(y1).min(self.grid.ymax()));
        if !self.grid.contains(xl, yl) {
            return;
        }
        let width = self.grid.width as usize;
        for y in yl..=yh {
            let row = y as usize * width;
            self.pixels[row + xl as usize..=row + xh as usize].fill(color);
        }
    }
}
