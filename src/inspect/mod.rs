//! Image tensor inspection
//!
//! Assembles CHW image tensors into grids, reverses dataset normalization,
//! and renders the result to the terminal for a quick visual check of what
//! a data loader is actually feeding the model.

mod render;

pub use render::{render, render_titled};

use ndarray::Array3;

use crate::{Error, Result};

/// Default number of images per grid row
pub const DEFAULT_NROW: usize = 8;

/// Default padding (in pixels) around each image in a grid
pub const GRID_PADDING: usize = 2;

/// Terminal width used by the display helpers
pub const DISPLAY_WIDTH: usize = 80;

/// A CHW image tensor with 1 (grayscale) or 3 (RGB) channels
///
/// Values are nominally in `[0, 1]` once dataset normalization has been
/// reversed; rendering clamps to that range.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    data: Array3<f32>,
}

impl ImageTensor {
    /// Wrap a CHW array; the channel dimension must be 1 or 3
    pub fn new(data: Array3<f32>) -> Result<Self> {
        let channels = data.shape()[0];
        if channels != 1 && channels != 3 {
            return Err(Error::InvalidParameter(format!(
                "image must have 1 or 3 channels, got {channels}"
            )));
        }
        Ok(Self { data })
    }

    /// Build an image from a flat CHW buffer
    pub fn from_flat(channels: usize, height: usize, width: usize, data: Vec<f32>) -> Result<Self> {
        let shaped = Array3::from_shape_vec((channels, height, width), data).map_err(|e| {
            Error::InvalidParameter(format!("flat buffer does not match shape: {e}"))
        })?;
        Self::new(shaped)
    }

    /// Number of channels (1 or 3)
    pub fn channels(&self) -> usize {
        self.data.shape()[0]
    }

    /// Image height in pixels
    pub fn height(&self) -> usize {
        self.data.shape()[1]
    }

    /// Image width in pixels
    pub fn width(&self) -> usize {
        self.data.shape()[2]
    }

    /// Underlying CHW array
    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    /// Perceptual brightness of one pixel
    pub fn luma(&self, y: usize, x: usize) -> f32 {
        if self.channels() == 1 {
            self.data[[0, y, x]]
        } else {
            0.2126 * self.data[[0, y, x]]
                + 0.7152 * self.data[[1, y, x]]
                + 0.0722 * self.data[[2, y, x]]
        }
    }
}

/// Per-channel normalization parameters of a dataset
///
/// Reverses the standard `(x - mean) / std` input transform so images
/// render in their original value range.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalization {
    mean: Vec<f32>,
    std: Vec<f32>,
}

impl Normalization {
    /// Create normalization parameters; lengths must match and be 1 or 3
    pub fn new(mean: Vec<f32>, std: Vec<f32>) -> Result<Self> {
        if mean.len() != std.len() {
            return Err(Error::InvalidParameter(format!(
                "mean has {} channels but std has {}",
                mean.len(),
                std.len()
            )));
        }
        if mean.len() != 1 && mean.len() != 3 {
            return Err(Error::InvalidParameter(format!(
                "normalization must cover 1 or 3 channels, got {}",
                mean.len()
            )));
        }
        if std.iter().any(|&s| s == 0.0) {
            return Err(Error::InvalidParameter(
                "std must not contain zeros".to_string(),
            ));
        }
        Ok(Self { mean, std })
    }

    /// Per-channel means
    pub fn mean(&self) -> &[f32] {
        &self.mean
    }

    /// Per-channel standard deviations
    pub fn std(&self) -> &[f32] {
        &self.std
    }

    /// Reverse the normalization: `x * std + mean` per channel
    pub fn denormalize(&self, image: &ImageTensor) -> Result<ImageTensor> {
        if image.channels() != self.mean.len() {
            return Err(Error::InvalidParameter(format!(
                "image has {} channels but normalization covers {}",
                image.channels(),
                self.mean.len()
            )));
        }

        let mut data = image.data.clone();
        for (ch, mut plane) in data.outer_iter_mut().enumerate() {
            let mean = self.mean[ch];
            let std = self.std[ch];
            plane.mapv_inplace(|v| v * std + mean);
        }

        ImageTensor::new(data)
    }
}

/// Tile images into a single grid image, row-major
///
/// Every image must share the same shape. Each cell is surrounded by
/// `padding` zero-valued pixels, matching the conventional grid layout of
/// dataset preview tooling.
pub fn make_grid(images: &[ImageTensor], nrow: usize, padding: usize) -> Result<ImageTensor> {
    if images.is_empty() {
        return Err(Error::InvalidParameter(
            "cannot build a grid from zero images".to_string(),
        ));
    }
    if nrow == 0 {
        return Err(Error::InvalidParameter("nrow must be at least 1".to_string()));
    }

    let first = &images[0];
    let (channels, height, width) = (first.channels(), first.height(), first.width());
    for (idx, image) in images.iter().enumerate() {
        if image.data.shape() != first.data.shape() {
            return Err(Error::InvalidParameter(format!(
                "image {idx} has shape {:?}, expected {:?}",
                image.data.shape(),
                first.data.shape()
            )));
        }
    }

    let ncol = nrow.min(images.len());
    let rows = images.len().div_ceil(ncol);

    let grid_height = rows * (height + padding) + padding;
    let grid_width = ncol * (width + padding) + padding;
    let mut grid = Array3::zeros((channels, grid_height, grid_width));

    for (idx, image) in images.iter().enumerate() {
        let row = idx / ncol;
        let col = idx % ncol;
        let y0 = padding + row * (height + padding);
        let x0 = padding + col * (width + padding);

        for ch in 0..channels {
            for y in 0..height {
                for x in 0..width {
                    grid[[ch, y0 + y, x0 + x]] = image.data[[ch, y, x]];
                }
            }
        }
    }

    ImageTensor::new(grid)
}

/// Print a single image to stdout, optionally reversing normalization
pub fn display_image(
    image: &ImageTensor,
    normalization: Option<&Normalization>,
    title: Option<&str>,
) -> Result<()> {
    let image = match normalization {
        Some(norm) => norm.denormalize(image)?,
        None => image.clone(),
    };
    println!("{}", render_titled(&image, title, DISPLAY_WIDTH));
    Ok(())
}

/// Print a batch of images as a grid
pub fn display_grid(
    images: &[ImageTensor],
    normalization: Option<&Normalization>,
    title: Option<&str>,
    nrow: usize,
) -> Result<()> {
    let grid = make_grid(images, nrow, GRID_PADDING)?;
    display_image(&grid, normalization, title)
}

/// Print a dataset sample (images plus labels) as a grid
pub fn display_sample(
    images: &[ImageTensor],
    labels: &[i64],
    normalization: Option<&Normalization>,
) -> Result<()> {
    let title = format!("labels: {labels:?}");
    display_grid(images, normalization, Some(&title), DEFAULT_NROW)
}
