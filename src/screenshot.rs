//! PNG出力

use crate::canvas::FrameBuffer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// 拡大率の上限
pub const MAX_SCALE: usize = 16;

/// 拡大率を 1..=MAX_SCALE に収める
pub fn clamp_scale(scale: usize) -> usize {
    scale.clamp(1, MAX_SCALE)
}

/// 0x00RRGGBB のバッファを8bit RGBに展開
pub fn argb_to_rgb(fb: &[u32]) -> Vec<u8> {
    let mut rgb_data = Vec::with_capacity(fb.len() * 3);
    for pixel in fb {
        rgb_data.push(((pixel >> 16) & 0xFF) as u8); // R
        rgb_data.push(((pixel >> 8) & 0xFF) as u8);  // G
        rgb_data.push((pixel & 0xFF) as u8);         // B
    }
    rgb_data
}

/// PNGとして書き出す
pub fn write_png<W: Write>(out: W, framebuffer: &FrameBuffer, scale: usize) -> Result<(), Box<dyn std::error::Error>> {
    let scale = clamp_scale(scale);
    let grid = framebuffer.grid();
    let width = grid.width as u32 * scale as u32;
    let height = grid.height as u32 * scale as u32;

    let mut encoder = png::Encoder::new(out, width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(&argb_to_rgb(&framebuffer.to_argb(scale)))?;
    Ok(())
}

/// PNGファイルに保存
pub fn save_png<P: AsRef<Path>>(path: P, framebuffer: &FrameBuffer, scale: usize) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(path.as_ref())?;
    write_png(BufWriter::new(file), framebuffer, scale)?;
    log::info!("Saved {}", path.as_ref().display());
    Ok(())
}

/// タイムスタンプ付きのファイル名を生成
pub fn timestamped_path(dir: &Path, prefix: &str) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("{}_{}.png", prefix, stamp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Canvas, GridSpec};
    use crate::palette::ColorIndex;

    #[test]
    fn test_argb_to_rgb() {
        assert_eq!(argb_to_rgb(&[0xFFA500, 0x00008B]), vec![0xFF, 0xA5, 0x00, 0x00, 0x00, 0x8B]);
    }

    #[test]
    fn test_png_header_and_size() {
        let mut fb = FrameBuffer::new(GridSpec::new(3, 2));
        fb.plot_dot(0, 0, ColorIndex::RED);

        let mut bytes = Vec::new();
        write_png(&mut bytes, &fb, 2).unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);

        let decoder = png::Decoder::new(bytes.as_slice());
        let reader = decoder.read_info().unwrap();
        let info = reader.info();
        assert_eq!((info.width, info.height), (6, 4));
        assert_eq!(info.color_type, png::ColorType::Rgb);
    }

    #[test]
    fn test_huge_scale_is_clamped() {
        let fb = FrameBuffer::new(GridSpec::new(2, 1));
        let mut bytes = Vec::new();
        write_png(&mut bytes, &fb, usize::MAX).unwrap();

        let decoder = png::Decoder::new(bytes.as_slice());
        let reader = decoder.read_info().unwrap();
        let info = reader.info();
        assert_eq!((info.width, info.height), (2 * MAX_SCALE as u32, MAX_SCALE as u32));
        assert_eq!(clamp_scale(0), 1);
    }

    #[test]
    fn test_timestamped_path() {
        let path = timestamped_path(Path::new("shots"), "mandelbrot");
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("mandelbrot_"));
        assert!(name.ends_with(".png"));
        assert_eq!(path.parent(), Some(Path::new("shots")));
    }
}
