//! Terminal rendering of image tensors
//!
//! Maps pixel brightness onto a character ramp, downsampling to fit the
//! terminal. Characters are roughly twice as tall as wide, so rows are
//! sampled at twice the horizontal step to keep the aspect ratio.

use super::ImageTensor;

// Dark to bright
const RAMP: [char; 10] = [' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Render an image as ASCII, at most `max_width` characters wide
pub fn render(image: &ImageTensor, max_width: usize) -> String {
    let max_width = max_width.max(1);
    let x_step = image.width().div_ceil(max_width).max(1);
    let y_step = (x_step * 2).max(1);

    let mut out = String::new();
    let mut y = 0;
    while y < image.height() {
        let mut x = 0;
        while x < image.width() {
            let v = image.luma(y, x).clamp(0.0, 1.0);
            let idx = (v * (RAMP.len() - 1) as f32).round() as usize;
            out.push(RAMP[idx.min(RAMP.len() - 1)]);
            x += x_step;
        }
        out.push('\n');
        y += y_step;
    }
    out
}

/// Render an image inside a titled frame
pub fn render_titled(image: &ImageTensor, title: Option<&str>, max_width: usize) -> String {
    let body = render(image, max_width);
    let body_width = body.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    let width = body_width.max(title.map_or(0, |t| t.chars().count() + 2));

    let mut out = String::new();
    out.push_str(&"═".repeat(width));
    out.push('\n');
    if let Some(title) = title {
        out.push_str(&format!("  {title}\n"));
        out.push_str(&"─".repeat(width));
        out.push('\n');
    }
    out.push_str(&body);
    out.push_str(&"═".repeat(width));
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn gradient(width: usize) -> ImageTensor {
        let mut data = Array3::zeros((1, 1, width));
        for x in 0..width {
            data[[0, 0, x]] = x as f32 / (width - 1) as f32;
        }
        ImageTensor::new(data).unwrap()
    }

    #[test]
    fn test_render_ramp_endpoints() {
        let rendered = render(&gradient(10), 80);
        let row: Vec<char> = rendered.trim_end().chars().collect();
        assert_eq!(row.len(), 10);
        assert_eq!(row[0], ' ');
        assert_eq!(row[9], '@');
    }

    #[test]
    fn test_render_downsamples_to_width() {
        let rendered = render(&gradient(200), 50);
        let row_len = rendered.lines().next().unwrap().chars().count();
        assert!(row_len <= 50);
    }

    #[test]
    fn test_render_clamps_out_of_range_values() {
        let mut data = Array3::zeros((1, 1, 2));
        data[[0, 0, 0]] = -5.0;
        data[[0, 0, 1]] = 5.0;
        let image = ImageTensor::new(data).unwrap();

        let rendered = render(&image, 80);
        let row: Vec<char> = rendered.trim_end().chars().collect();
        assert_eq!(row, vec![' ', '@']);
    }

    #[test]
    fn test_render_titled_frame() {
        let out = render_titled(&gradient(10), Some("sample batch"), 80);
        assert!(out.starts_with('═'));
        assert!(out.contains("  sample batch\n"));
        assert!(out.trim_end().ends_with('═'));
    }

    #[test]
    fn test_render_titled_without_title() {
        let out = render_titled(&gradient(10), None, 80);
        assert!(!out.contains('─'));
    }
}
