use super::{RenderEvent, Renderer};
use crate::palette::Palette;
use crate::snapshot::Snapshot;

use log::debug;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::Color;
use sdl2::rect::Rect;
use sdl2::render::Canvas;
use sdl2::video::{FullscreenType, Window};
use sdl2::EventPump;

/// SDL2 window showing the carvers as they go
pub struct SdlRenderer {
    canvas: Canvas<Window>,
    events: EventPump,
    palette: Palette,
    cell_size: u32,
    render_every_frame: bool,
    should_quit: bool,
    frame_counter: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct SdlConfig {
    pub grid_size: usize,
    pub cell_size: u32,
    pub vsync: bool,
    pub fullscreen: bool,
    pub render_every_frame: bool,
}

impl SdlRenderer {
    pub fn new(config: &SdlConfig) -> Result<Self, String> {
        let context = sdl2::init()?;
        let video = context.video()?;
        let side = config.grid_size as u32 * config.cell_size;

        let mut window = video
            .window("Maze Generation Visualization", side, side)
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        if config.fullscreen {
            window.set_fullscreen(FullscreenType::True)?;
        }

        if window.fullscreen_state() != FullscreenType::Off {
            context.mouse().show_cursor(false);
        }

        let mut builder = window.into_canvas();

        if config.vsync {
            builder = builder.present_vsync();
        }

        let canvas = builder.build().map_err(|e| e.to_string())?;
        let events = context.event_pump()?;

        Ok(Self {
            canvas,
            events,
            palette: Palette::default(),
            cell_size: config.cell_size,
            render_every_frame: config.render_every_frame,
            should_quit: false,
            frame_counter: 0,
        })
    }

    fn handle_events(&mut self) {
        for event in self.events.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => {
                    self.should_quit = true;
                }
                _ => {}
            }
        }
    }

    fn draw(&mut self, snapshot: &Snapshot) -> Result<(), String> {
        let [r, g, b] = self.palette.wall;
        self.canvas.set_draw_color(Color::RGB(r, g, b));
        self.canvas.clear();

        for (x, y, cell) in snapshot.iter() {
            let [r, g, b] = self.palette.color(cell);
            let rect = Rect::new(
                x as i32 * self.cell_size as i32,
                y as i32 * self.cell_size as i32,
                self.cell_size,
                self.cell_size,
            );

            self.canvas.set_draw_color(Color::RGB(r, g, b));
            self.canvas.fill_rect(rect)?;
        }

        self.canvas.present();
        Ok(())
    }
}

impl Renderer for SdlRenderer {
    type Error = String;

    fn initialize(&mut self, grid_size: usize) -> Result<(), Self::Error> {
        if grid_size == 0 || self.cell_size == 0 {
            return Err("Window would be empty".to_string());
        }

        Ok(())
    }

    fn handle_event(&mut self, event: &RenderEvent) -> Result<(), Self::Error> {
        if let RenderEvent::Started { seed } = event {
            self.canvas
                .window_mut()
                .set_title(&format!("Maze Generation Visualization ({})", seed))
                .map_err(|e| e.to_string())?;
        }

        Ok(())
    }

    fn should_quit(&mut self) -> bool {
        self.should_quit
    }

    fn update(&mut self, snapshot: &Snapshot) -> Result<(), Self::Error> {
        self.handle_events();

        if self.should_quit {
            debug!("Window closed");
            return Ok(());
        }

        self.frame_counter += 1;

        // Draw every frame in slow mode, otherwise every 4th frame
        if self.render_every_frame || self.frame_counter % 4 == 0 {
            self.draw(snapshot)?;
        }

        Ok(())
    }

    fn finalize(&mut self, snapshot: &Snapshot) -> Result<(), Self::Error> {
        self.draw(snapshot)
    }
}
