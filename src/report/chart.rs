use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{ImageFormat, RgbImage};
use plotters::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::color::bar_color;
use crate::data::histogram::Bin;

/// Smallest chart side, in pixels, that leaves room for the labels.
pub const MIN_SIDE: u32 = 64;
/// Largest chart side, in pixels.
pub const MAX_SIDE: u32 = 4096;

const Y_DESC: &str = "Frequency";
const FONT: &str = "sans-serif";

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("chart size {width}x{height} is too small")]
    TooSmall { width: u32, height: u32 },
    #[error("chart size {width}x{height} exceeds {max} pixels per side", max = MAX_SIDE)]
    TooLarge { width: u32, height: u32 },
    #[error("drawing chart: {0}")]
    Draw(String),
    #[error("encoding chart as PNG: {0}")]
    Encode(#[from] image::ImageError),
}

fn draw_error(err: impl std::fmt::Display) -> ChartError {
    ChartError::Draw(err.to_string())
}

/// One chart rendered twice, as base64 PNG strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPair {
    pub title: String,
    pub thumb: String,
    pub full: String,
}

/// Render `bins` as a titled bar chart of `width` x `height` pixels.
///
/// The x axis has one segment per bin, labelled with the bin label and
/// described by `x_desc`; the y axis counts rows. Bars keep the order given.
pub fn render_bar_chart(
    title: &str,
    x_desc: &str,
    bins: &[Bin],
    width: u32,
    height: u32,
) -> Result<RgbImage, ChartError> {
    if width < MIN_SIDE || height < MIN_SIDE {
        return Err(ChartError::TooSmall { width, height });
    }
    if width > MAX_SIDE || height > MAX_SIDE {
        return Err(ChartError::TooLarge { width, height });
    }

    let mut buf = vec![0u8; width as usize * height as usize * 3];
    draw_bars(&mut buf, (width, height), title, x_desc, bins)?;
    RgbImage::from_raw(width, height, buf)
        .ok_or_else(|| ChartError::Draw("pixel buffer does not match the chart size".into()))
}

fn draw_bars(
    buf: &mut [u8],
    (width, height): (u32, u32),
    title: &str,
    x_desc: &str,
    bins: &[Bin],
) -> Result<(), ChartError> {
    let root = BitMapBackend::with_buffer(buf, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_error)?;

    // Text and margins are laid out for 900x600 and scaled from there.
    let scale = (width as f64 / 900.0).min(height as f64 / 600.0);
    let px = |base: f64| ((base * scale).round() as i32).max(1);

    let n = bins.len() as u32;
    let max = bins.iter().map(|b| count_u32(b.count)).max().unwrap_or(0);
    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, px(30.0)))
        .margin(px(10.0))
        .x_label_area_size(px(50.0))
        .y_label_area_size(px(60.0))
        .build_cartesian_2d((0u32..n.max(1)).into_segmented(), 0u32..max + max / 10 + 1)
        .map_err(draw_error)?;

    let label_of = |value: &SegmentValue<u32>| match value {
        SegmentValue::CenterOf(i) => bins
            .get(*i as usize)
            .map(|b| b.label.clone())
            .unwrap_or_default(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bins.len().max(1))
        .x_label_formatter(&label_of)
        .x_label_style((FONT, px(16.0)))
        .y_label_style((FONT, px(16.0)))
        .x_desc(x_desc)
        .y_desc(Y_DESC)
        .axis_desc_style((FONT, px(18.0)))
        .draw()
        .map_err(draw_error)?;

    let gap = px(12.0) as u32;
    chart
        .draw_series(bins.iter().enumerate().map(|(i, bin)| {
            let [r, g, b] = bar_color(i, bins.len());
            let x = i as u32;
            let mut bar = Rectangle::new(
                [
                    (SegmentValue::Exact(x), 0),
                    (SegmentValue::Exact(x + 1), count_u32(bin.count)),
                ],
                RGBColor(r, g, b).filled(),
            );
            bar.set_margin(0, 0, gap, gap);
            bar
        }))
        .map_err(draw_error)?;

    root.present().map_err(draw_error)
}

fn count_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Encode an image as PNG bytes.
pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>, ChartError> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

fn render_base64(title: &str, x_desc: &str, bins: &[Bin], [width, height]: [u32; 2]) -> Result<String, ChartError> {
    let png = encode_png(&render_bar_chart(title, x_desc, bins, width, height)?)?;
    Ok(STANDARD.encode(png))
}

/// Render a thumbnail and a full-size version of the same chart.
pub fn chart_pair(
    title: &str,
    x_desc: &str,
    bins: &[Bin],
    thumb_size: [u32; 2],
    full_size: [u32; 2],
) -> Result<ChartPair, ChartError> {
    Ok(ChartPair {
        title: title.to_string(),
        thumb: render_base64(title, x_desc, bins, thumb_size)?,
        full: render_base64(title, x_desc, bins, full_size)?,
    })
}

#[cfg(test)]
mod tests {
    use image::Rgb;

    use super::*;

    const BLANK: Rgb<u8> = Rgb([255, 255, 255]);

    fn bins() -> Vec<Bin> {
        vec![
            Bin {
                label: "tcp".into(),
                count: 10,
            },
            Bin {
                label: "udp".into(),
                count: 5,
            },
        ]
    }

    fn bar_pixels(img: &RgbImage, index: usize, n: usize) -> usize {
        let colour = Rgb(bar_color(index, n));
        img.pixels().filter(|p| **p == colour).count()
    }

    #[test]
    fn bars_are_drawn_in_their_palette_colours() {
        let img = render_bar_chart("protocol_type - Full", "protocol_type", &bins(), 450, 300).unwrap();
        assert_eq!(img.dimensions(), (450, 300));
        let tall = bar_pixels(&img, 0, 2);
        let short = bar_pixels(&img, 1, 2);
        assert!(short > 0);
        // twice the count, so clearly more coloured area
        assert!(tall > short * 3 / 2, "tall {tall}, short {short}");
    }

    #[test]
    fn empty_series_still_renders_a_frame() {
        let img = render_bar_chart("empty", "protocol_type", &[], 300, 200).unwrap();
        assert!(img.pixels().any(|p| *p == BLANK));
        assert!(img.pixels().any(|p| *p != BLANK));
    }

    #[test]
    fn rejects_degenerate_sizes() {
        assert!(matches!(
            render_bar_chart("t", "x", &bins(), 0, 100),
            Err(ChartError::TooSmall { .. })
        ));
        assert!(matches!(
            render_bar_chart("t", "x", &bins(), MIN_SIDE - 1, 300),
            Err(ChartError::TooSmall { .. })
        ));
    }

    #[test]
    fn rejects_oversized_charts_before_allocating() {
        assert!(matches!(
            render_bar_chart("t", "x", &bins(), 100_000, 100_000),
            Err(ChartError::TooLarge {
                width: 100_000,
                height: 100_000
            })
        ));
    }

    #[test]
    fn pair_encodes_two_png_sizes() {
        let pair = chart_pair(
            "protocol_type - Train",
            "protocol_type",
            &bins(),
            [180, 120],
            [420, 300],
        )
        .unwrap();
        assert_eq!(pair.title, "protocol_type - Train");
        let thumb = STANDARD.decode(&pair.thumb).unwrap();
        let full = STANDARD.decode(&pair.full).unwrap();
        assert_eq!(&thumb[1..4], b"PNG");
        let decoded = image::load_from_memory(&full).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (420, 300));
    }
}
