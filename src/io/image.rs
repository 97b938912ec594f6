//! PNG sample loading and solved-grid export

use crate::io::configuration::MAX_SAMPLE_TILES;
use crate::io::error::{Result, WfcError};
use crate::spatial::grid::SolvedGrid;
use image::{ImageBuffer, Rgba, RgbaImage};
use ndarray::Array2;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// A sample image reduced to tile labels
///
/// Each distinct RGBA colour is one tile; labels follow the sorted colour
/// order so the same image always yields the same labels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    /// Tile label per pixel, indexed `[row, col]`
    pub labels: Array2<usize>,
    /// Colour of each tile label
    pub palette: Vec<[u8; 4]>,
}

impl Sample {
    /// Label the pixels of an in-memory image
    ///
    /// # Errors
    ///
    /// Returns an error if the image is empty or has more than
    /// [`MAX_SAMPLE_TILES`] distinct colours
    pub fn from_rgba(image: &RgbaImage) -> Result<Self> {
        let (width, height) = (image.width() as usize, image.height() as usize);
        if width == 0 || height == 0 {
            return Err(WfcError::InvalidSourceData {
                reason: "Sample image has no pixels".to_string(),
            });
        }

        let colours: BTreeSet<[u8; 4]> = image.pixels().map(|pixel| pixel.0).collect();
        if colours.len() > MAX_SAMPLE_TILES {
            return Err(WfcError::InvalidSourceData {
                reason: format!(
                    "Sample has {} colours, at most {MAX_SAMPLE_TILES} are supported",
                    colours.len()
                ),
            });
        }

        let palette: Vec<[u8; 4]> = colours.into_iter().collect();
        let label_of: HashMap<[u8; 4], usize> = palette
            .iter()
            .enumerate()
            .map(|(label, &colour)| (colour, label))
            .collect();

        let mut labels = Array2::zeros((height, width));
        for (x, y, pixel) in image.enumerate_pixels() {
            if let (Some(slot), Some(&label)) =
                (labels.get_mut((y as usize, x as usize)), label_of.get(&pixel.0))
            {
                *slot = label;
            }
        }

        Ok(Self { labels, palette })
    }

    /// Number of distinct tiles
    pub fn tile_count(&self) -> usize {
        self.palette.len()
    }
}

/// Load a PNG sample and label its colours
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded, or the decoded
/// image is not a usable sample
pub fn load_sample_png<P: AsRef<Path>>(path: P) -> Result<Sample> {
    let path_buf = path.as_ref().to_path_buf();
    let image = image::open(&path_buf).map_err(|e| WfcError::ImageLoad {
        path: path_buf,
        source: e,
    })?;
    Sample::from_rgba(&image.to_rgba8())
}

/// Export a solved grid as a PNG, one pixel per cell
///
/// Unsolved cells are written fully transparent.
///
/// # Errors
///
/// Returns an error if:
/// - The grid has no cells
/// - A committed tile has no colour in `palette`
/// - The parent directory cannot be created
/// - The image cannot be saved to the specified path
pub fn export_solved_grid_png<P: AsRef<Path>>(
    grid: &SolvedGrid,
    palette: &[[u8; 4]],
    output_path: P,
) -> Result<()> {
    let output_path = output_path.as_ref();
    let (rows, cols) = grid.tiles().dim();
    if rows == 0 || cols == 0 {
        return Err(WfcError::InvalidSourceData {
            reason: "Solved grid has no cells".to_string(),
        });
    }

    let mut img: RgbaImage = ImageBuffer::new(cols as u32, rows as u32);
    for ((row, col), &value) in grid.tiles().indexed_iter() {
        let colour = match usize::try_from(value) {
            Ok(tile) => *palette.get(tile).ok_or_else(|| WfcError::InvalidSourceData {
                reason: format!("Tile {tile} has no colour in a palette of {}", palette.len()),
            })?,
            Err(_) => [0, 0, 0, 0],
        };
        img.put_pixel(col as u32, row as u32, Rgba(colour));
    }

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| WfcError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }

    img.save(output_path).map_err(|e| WfcError::ImageExport {
        path: output_path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
