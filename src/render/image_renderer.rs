use super::Renderer;
use crate::palette::Palette;
use crate::snapshot::Snapshot;

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use log::info;
use std::path::PathBuf;

/// Image file renderer that saves the final maze to disk
pub struct ImageRenderer {
    output_path: PathBuf,
    cell_size: u32,
    palette: Palette,
}

impl ImageRenderer {
    pub fn new(output_path: PathBuf, cell_size: u32) -> Self {
        Self {
            output_path,
            cell_size,
            palette: Palette::default(),
        }
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Paints every cell as a `cell_size` square.
    pub fn render(&self, snapshot: &Snapshot) -> RgbaImage {
        let side = snapshot.size() as u32 * self.cell_size;
        let mut canvas = RgbaImage::new(side, side);

        for (x, y, cell) in snapshot.iter() {
            let [r, g, b] = self.palette.color(cell);
            let rect = Rect::at(
                x as i32 * self.cell_size as i32,
                y as i32 * self.cell_size as i32,
            )
            .of_size(self.cell_size, self.cell_size);

            draw_filled_rect_mut(&mut canvas, rect, Rgba([r, g, b, 255]));
        }

        canvas
    }
}

impl Renderer for ImageRenderer {
    type Error = String;

    fn initialize(&mut self, grid_size: usize) -> Result<(), Self::Error> {
        if self.cell_size == 0 {
            return Err("Cell size must be at least 1 pixel".to_string());
        }

        if grid_size == 0 {
            return Err("Nothing to render".to_string());
        }

        Ok(())
    }

    fn finalize(&mut self, snapshot: &Snapshot) -> Result<(), Self::Error> {
        let image = self.render(snapshot);

        image
            .save(&self.output_path)
            .map_err(|e| format!("Failed to save image: {}", e))?;

        info!("Saved maze to {}", self.output_path.display());

        Ok(())
    }
}
