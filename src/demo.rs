//! グラフィックテスト画面
//!
//! 矩形、対角線、中央の点を描き、SCRN相当の読み出しで色を確認する

use crate::canvas::{Canvas, GraphicsMode};
use crate::palette::{ColorIndex, Palette};

/// 読み出した色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphicsProbe {
    /// (10, 40) の色（背景 15 のはず）
    pub background: Option<ColorIndex>,
    /// 中央の点（5 のはず）
    pub center: Option<ColorIndex>,
    /// 下端の矩形（3 のはず）
    pub rectangle: Option<ColorIndex>,
}

impl GraphicsProbe {
    pub fn expected() -> Self {
        GraphicsProbe {
            background: Some(ColorIndex::WHITE),
            center: Some(ColorIndex::GREEN),
            rectangle: Some(ColorIndex::RED),
        }
    }
}

/// テスト画面を描いて色を読み出す
pub fn draw_graphics_test<C: Canvas + ?Sized>(canvas: &mut C) -> GraphicsProbe {
    let mode = GraphicsMode::Mode6A;
    let grid = mode.grid();
    let (xmax, ymax) = (grid.xmax(), grid.ymax());

    canvas.set_palette(Palette::default());
    canvas.set_mode(grid);
    log::info!("Graphics test in {} ({}x{})", mode.name(), grid.width, grid.height);

    canvas.fill_rect(0, 0, xmax, 20, ColorIndex::RED);
    canvas.draw_line(0, 0, xmax, ymax, ColorIndex::ORANGE);
    canvas.draw_line(0, ymax, xmax, 0, ColorIndex::ORANGE);
    canvas.plot_dot(xmax / 2, ymax / 2, ColorIndex::GREEN);

    let probe = GraphicsProbe {
        background: canvas.pixel_color(10, 40),
        center: canvas.pixel_color(xmax / 2, ymax / 2),
        rectangle: canvas.pixel_color(xmax / 2, 0),
    };
    log::info!(
        "Background color {:?}, center color {:?}, rectangle color {:?}",
        probe.background.map(ColorIndex::value),
        probe.center.map(ColorIndex::value),
        probe.rectangle.map(ColorIndex::value)
    );
    probe
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{FrameBuffer, GridSpec};

    #[test]
    fn test_graphics_probe() {
        let mut fb = FrameBuffer::new(GridSpec::new(8, 8));
        let probe = draw_graphics_test(&mut fb);
        assert_eq!(fb.grid(), GridSpec::new(336, 256));
        assert_eq!(probe, GraphicsProbe::expected());
    }

    #[test]
    fn test_cross_reaches_corners() {
        let mut fb = FrameBuffer::default();
        draw_graphics_test(&mut fb);
        assert_eq!(fb.pixel_color(335, 255), Some(ColorIndex::ORANGE));
        assert_eq!(fb.pixel_color(0, 255), Some(ColorIndex::ORANGE));
        // 矩形の上に線が描かれる
        assert_eq!(fb.pixel_color(0, 0), Some(ColorIndex::ORANGE));
        assert_eq!(fb.pixel_color(335, 20), Some(ColorIndex::RED));
    }
}
