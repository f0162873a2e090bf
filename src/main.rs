//! Headless scroll driver.
//!
//! ```text
//! scrolly [--scene PATH] [--config PATH]
//! ```
//!
//! Loads a scene into an in-memory document, scrolls through its positions
//! and prints every style write as one JSON object per line. Set `RUST_LOG`
//! to see engine logs on stderr.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use serde::Serialize;

use scrolly_config::ScrollyConfig;
use scrolly_motion::{ElementId, MemoryDocument, MotionManager, ThemeModule};

mod scene;
use scene::{DEFAULT_SCENE, Scene};

/// Simulated frame interval.
const FRAME_MS: f64 = 16.0;

/// Upper bound on frames spent settling after the last scroll position.
const MAX_SETTLE_FRAMES: usize = 600;

#[derive(Debug, Default)]
struct Args {
    scene: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--scene" => args.scene = Some(iter.next().context("--scene needs a path")?.into()),
            "--config" => args.config = Some(iter.next().context("--config needs a path")?.into()),
            "-h" | "--help" => {
                println!("usage: scrolly [--scene PATH] [--config PATH]");
                std::process::exit(0);
            }
            other => bail!("unexpected argument `{other}`"),
        }
    }
    Ok(args)
}

/// One printed style write.
#[derive(Debug, Serialize)]
struct StyleLine<'a> {
    frame: u64,
    element: &'a str,
    property: &'a str,
    value: &'a str,
}

struct Driver<'a> {
    manager: MotionManager,
    document: MemoryDocument,
    names: &'a IndexMap<ElementId, String>,
    clock: f64,
    out: io::StdoutLock<'static>,
}

impl Driver<'_> {
    fn frame(&mut self) -> Result<bool> {
        self.clock += FRAME_MS;
        let mut again = self.manager.on_frame(&mut self.document, self.clock);
        again |= self.manager.poll_timers(&mut self.document, self.clock);
        self.flush()?;
        Ok(again)
    }

    /// Scroll to `y` and run the frame the scroll asks for (or one already pending).
    fn scroll_to(&mut self, y: f64, mut pending: bool) -> Result<bool> {
        self.document.set_scroll_y(y);
        let entries = self.document.intersections(self.manager.tracked());
        pending |= self.manager.on_intersection(&entries);
        pending |= self.manager.on_scroll(self.clock);
        if pending { self.frame() } else { Ok(false) }
    }

    /// Run frames and timers until nothing is left to do.
    fn settle(&mut self, mut pending: bool) -> Result<usize> {
        for frames in 0..MAX_SETTLE_FRAMES {
            if !pending {
                let Some(due) = self.manager.next_timer() else {
                    return Ok(frames);
                };
                self.clock = self.clock.max(due);
                pending = self.manager.poll_timers(&mut self.document, self.clock);
                if !pending {
                    continue;
                }
            }
            pending = self.frame()?;
        }
        log::warn!("still moving after {MAX_SETTLE_FRAMES} frames");
        Ok(MAX_SETTLE_FRAMES)
    }

    fn flush(&mut self) -> Result<()> {
        let frame = self.manager.metrics().frames;
        for record in self.document.take_style_log() {
            let element = self.names.get(&record.element).map_or("?", String::as_str);
            let line = StyleLine {
                frame,
                element,
                property: &record.property,
                value: &record.value,
            };
            serde_json::to_writer(&mut self.out, &line)?;
            writeln!(self.out)?;
        }
        for event in self.manager.drain_events() {
            log::info!("event: {}", serde_json::to_string(&event)?);
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let _ = env_logger::try_init();
    let args = parse_args()?;

    let scene = match &args.scene {
        Some(path) => Scene::load(path)?,
        None => Scene::from_toml_str(DEFAULT_SCENE)?,
    };
    let stage = scene.stage();

    let builder = MotionManager::builder().module(ThemeModule::new());
    let builder = match &args.config {
        Some(path) => builder.config_file(path),
        None => builder.config(ScrollyConfig::load()),
    };
    let mut manager = builder.build().context("failed to set up motion manager")?;

    for (element, descriptors) in &stage.tracked {
        manager.track(*element, descriptors.clone());
    }
    log::info!(
        "scrolly: {} elements, {} positions, viewport {}x{}",
        manager.len(),
        scene.positions.len(),
        scene.viewport.width,
        scene.viewport.height
    );

    let mut driver = Driver {
        manager,
        document: stage.document,
        names: &stage.names,
        clock: 0.0,
        out: io::stdout().lock(),
    };

    driver.manager.start(&mut driver.document);
    let mut pending = driver.frame()?;
    for &y in &scene.positions {
        pending = driver.scroll_to(y, pending)?;
    }
    let frames = driver.settle(pending)?;
    log::info!(
        "scrolly: settled after {frames} extra frames, theme {:?}, metrics {}",
        driver.document.root_attribute("data-theme"),
        serde_json::to_string(&driver.manager.metrics())?
    );

    driver.manager.stop(&mut driver.document);
    driver.flush()?;
    Ok(())
}
