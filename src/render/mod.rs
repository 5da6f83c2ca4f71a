pub mod events;

#[cfg(feature = "visual")]
pub mod sdl_renderer;

#[cfg(feature = "image-output")]
pub mod image_renderer;

pub use events::RenderEvent;

use crate::snapshot::Snapshot;

/// Consumer of generation progress. Renderers only ever see snapshots and
/// never touch the live grid.
pub trait Renderer {
    type Error;

    /// Initialize the renderer for a grid of `grid_size` × `grid_size` cells
    fn initialize(&mut self, grid_size: usize) -> Result<(), Self::Error>;

    /// Handle a render event during generation
    fn handle_event(&mut self, event: &RenderEvent) -> Result<(), Self::Error> {
        let _ = event;
        Ok(())
    }

    /// Update renderer with the latest snapshot (for visual renderers)
    fn update(&mut self, snapshot: &Snapshot) -> Result<(), Self::Error> {
        let _ = snapshot;
        Ok(())
    }

    /// Check if the user wants to quit (for interactive renderers)
    fn should_quit(&mut self) -> bool {
        false
    }

    /// Finalize rendering with the final snapshot (e.g. save to file)
    fn finalize(&mut self, snapshot: &Snapshot) -> Result<(), Self::Error>;
}
