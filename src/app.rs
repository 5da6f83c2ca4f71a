use crate::cli::AppConfig;

use quad_carve::coordinator::{Generation, GenerationHandle, Generator, Maze, Outcome};
use quad_carve::render::{RenderEvent, Renderer};
use quad_carve::Owner;

#[cfg(any(feature = "visual", test))]
use quad_carve::snapshot::Snapshot;

#[cfg(feature = "visual")]
use quad_carve::render::sdl_renderer::{SdlConfig, SdlRenderer};

use quad_carve::render::image_renderer::ImageRenderer;

use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use std::time::{Duration, Instant};

type BoxedRenderer = Box<dyn Renderer<Error = String>>;

pub struct MazeApp {
    config: AppConfig,
}

impl MazeApp {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let mut renderers = self.create_renderers()?;

        for renderer in &mut renderers {
            renderer.initialize(self.config.maze.size)?;
        }

        let progress = self.progress_bar()?;

        let generation = if self.config.sequential {
            self.run_sequential(&mut renderers, &progress)?
        } else {
            self.run_threaded(&mut renderers, &progress)?
        };

        progress.finish();

        let report = &generation.report;
        let steps = report.steps;
        let end_event = match report.outcome {
            Outcome::Completed => RenderEvent::Completed { steps },
            Outcome::Cancelled => RenderEvent::Cancelled { steps },
        };

        for renderer in &mut renderers {
            renderer.handle_event(&end_event)?;
        }

        let mut snapshot = generation.snapshot;

        if let Some(exits) = self.config.exits {
            let mut rng = XorShiftRng::seed_from_u64(report.seed);
            snapshot = snapshot.enclosed(exits, &mut rng);
        }

        #[cfg(feature = "visual")]
        if let Some(delay) = self.config.renderer.hold {
            info!("Holding the final maze for {} seconds", delay);
            hold(
                &mut renderers,
                &snapshot,
                Duration::from_secs_f32(delay),
                self.config.renderer.frame_interval(),
            )?;
        }

        for renderer in &mut renderers {
            renderer.finalize(&snapshot)?;
        }

        let cells = snapshot.owner_counts();

        info!(
            "Generation {:?} after {} steps, {} cells carved (N {}, S {}, E {}, W {})",
            report.outcome,
            report.steps,
            report.total_carved(),
            report.carved[Owner::North],
            report.carved[Owner::South],
            report.carved[Owner::East],
            report.carved[Owner::West],
        );
        info!(
            "{} passages; cells held N {}, S {}, E {}, W {}",
            snapshot.passage_count(),
            cells[Owner::North],
            cells[Owner::South],
            cells[Owner::East],
            cells[Owner::West],
        );

        Ok(())
    }

    fn progress_bar(&self) -> Result<ProgressBar, Box<dyn std::error::Error>> {
        let progress = ProgressBar::new(0);
        progress.enable_steady_tick(Duration::from_millis(200));
        progress.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>5}/{len} {per_sec:>12}",
                )?
                .progress_chars("#>-"),
        );

        Ok(progress)
    }

    fn run_threaded(
        &self,
        renderers: &mut [BoxedRenderer],
        progress: &ProgressBar,
    ) -> Result<Generation, Box<dyn std::error::Error>> {
        let handle = Generator::new(&self.config.maze)?.start()?;

        progress.set_length(handle.carvable_estimate() as u64);
        emit(renderers, &RenderEvent::Started { seed: handle.seed() })?;

        let frame = self.config.renderer.frame_interval();

        while !handle.is_finished() {
            if renderers.iter_mut().any(|r| r.should_quit()) {
                handle.stop();
                break;
            }

            self.poll(&handle, renderers, progress)?;
            std::thread::sleep(frame);
        }

        Ok(handle.join()?)
    }

    fn poll(
        &self,
        handle: &GenerationHandle,
        renderers: &mut [BoxedRenderer],
        progress: &ProgressBar,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let snapshot = handle.snapshot();
        let carved = handle.carved();

        progress.set_position(carved as u64);

        let event = RenderEvent::Progress {
            steps: handle.steps(),
            carved,
        };

        for renderer in renderers.iter_mut() {
            renderer.handle_event(&event)?;
            renderer.update(&snapshot)?;
        }

        Ok(())
    }

    fn run_sequential(
        &self,
        renderers: &mut [BoxedRenderer],
        progress: &ProgressBar,
    ) -> Result<Generation, Box<dyn std::error::Error>> {
        let mut maze = Maze::new(&self.config.maze)?;
        progress.set_length(maze.grid().carvable_estimate() as u64);
        emit(renderers, &RenderEvent::Started { seed: maze.seed() })?;

        let frame = self.config.renderer.frame_interval();
        let mut last_frame = Instant::now();
        let mut outcome = Outcome::Completed;

        while maze.step()? {
            if let Some(delay) = self.config.maze.step_delay {
                std::thread::sleep(delay);
            }

            if last_frame.elapsed() < frame {
                continue;
            }
            last_frame = Instant::now();

            if renderers.iter_mut().any(|r| r.should_quit()) {
                outcome = Outcome::Cancelled;
                break;
            }

            let carved = maze.grid().journal().len();
            progress.set_position(carved as u64);

            let snapshot = maze.snapshot();
            let event = RenderEvent::Progress {
                steps: maze.steps(),
                carved,
            };

            for renderer in renderers.iter_mut() {
                renderer.handle_event(&event)?;
                renderer.update(&snapshot)?;
            }
        }

        Ok(Generation {
            report: maze.report(outcome),
            snapshot: maze.snapshot(),
            journal: maze.grid().journal().to_vec(),
        })
    }

    fn create_renderers(&self) -> Result<Vec<BoxedRenderer>, Box<dyn std::error::Error>> {
        let mut renderers: Vec<BoxedRenderer> = Vec::new();

        // Add SDL2 renderer if requested
        #[cfg(feature = "visual")]
        if self.config.renderer.visual {
            let sdl_config = SdlConfig {
                grid_size: self.config.maze.size,
                cell_size: self.config.renderer.cell_size,
                vsync: self.config.renderer.vsync,
                fullscreen: self.config.renderer.fullscreen,
                render_every_frame: self.config.renderer.slow,
            };

            renderers.push(Box::new(SdlRenderer::new(&sdl_config)?));
        }

        // Add image renderer if output path is specified
        if let Some(output_path) = &self.config.output_path {
            let image_renderer = ImageRenderer::new(output_path.clone(), self.config.renderer.cell_size);
            renderers.push(Box::new(image_renderer));
        }

        Ok(renderers)
    }
}

fn emit(renderers: &mut [BoxedRenderer], event: &RenderEvent) -> Result<(), String> {
    for renderer in renderers.iter_mut() {
        renderer.handle_event(event)?;
    }

    Ok(())
}

/// Keeps redrawing `snapshot` and pumping window events until `duration`
/// passes or a renderer asks to quit.
#[cfg(any(feature = "visual", test))]
fn hold(
    renderers: &mut [BoxedRenderer],
    snapshot: &Snapshot,
    duration: Duration,
    frame: Duration,
) -> Result<(), String> {
    let deadline = Instant::now() + duration;

    while Instant::now() < deadline {
        for renderer in renderers.iter_mut() {
            renderer.update(snapshot)?;
        }

        if renderers.iter_mut().any(|r| r.should_quit()) {
            break;
        }

        std::thread::sleep(frame.min(deadline.saturating_duration_since(Instant::now())));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quad_carve::config::MazeConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingRenderer {
        updates: Arc<AtomicUsize>,
        quit_after: Option<usize>,
    }

    impl Renderer for CountingRenderer {
        type Error = String;

        fn initialize(&mut self, _grid_size: usize) -> Result<(), Self::Error> {
            Ok(())
        }

        fn update(&mut self, _snapshot: &Snapshot) -> Result<(), Self::Error> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn should_quit(&mut self) -> bool {
            self.quit_after
                .map_or(false, |limit| self.updates.load(Ordering::SeqCst) >= limit)
        }

        fn finalize(&mut self, _snapshot: &Snapshot) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    fn final_snapshot() -> Snapshot {
        let mut maze = Maze::new(&MazeConfig::new(12, 2).with_seed(3)).unwrap();
        maze.run().unwrap();
        maze.snapshot()
    }

    #[test]
    fn hold_keeps_redrawing_until_it_expires() {
        let updates = Arc::new(AtomicUsize::new(0));
        let mut renderers: Vec<BoxedRenderer> = vec![Box::new(CountingRenderer {
            updates: Arc::clone(&updates),
            quit_after: None,
        })];

        let started = Instant::now();
        hold(
            &mut renderers,
            &final_snapshot(),
            Duration::from_millis(60),
            Duration::from_millis(5),
        )
        .unwrap();

        assert!(started.elapsed() >= Duration::from_millis(60));
        // enough frames to get past any every-nth-frame drawing gate
        assert!(updates.load(Ordering::SeqCst) >= 4);
    }

    #[test]
    fn hold_ends_when_the_window_closes() {
        let updates = Arc::new(AtomicUsize::new(0));
        let mut renderers: Vec<BoxedRenderer> = vec![Box::new(CountingRenderer {
            updates: Arc::clone(&updates),
            quit_after: Some(2),
        })];

        let started = Instant::now();
        hold(
            &mut renderers,
            &final_snapshot(),
            Duration::from_secs(30),
            Duration::from_millis(1),
        )
        .unwrap();

        assert!(started.elapsed() < Duration::from_secs(30));
        assert_eq!(updates.load(Ordering::SeqCst), 2);
    }
}
