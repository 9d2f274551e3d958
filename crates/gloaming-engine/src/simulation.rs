//! Headless day/night simulation.
//!
//! Builds a session, walks the player around a demo map and composes the
//! lighting overlay every frame, logging clock ticks and overlay colors.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use gloaming_common::{AreaId, EventId, GloamingResult, MapId, TilePoint};
use gloaming_gameplay::{handler, Clock, ClockEvent, Handler, PublisherKind};
use gloaming_kernel::{Area, AreaSet, BlendMode};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::commands::Command;
use crate::config::GloamingConfig;
use crate::context::{GameContext, CLOCK_SAVE_FILE};
use crate::host::HeadlessHost;
use crate::runtime::Runtime;

/// Demo map id.
pub const DEMO_MAP: MapId = MapId::new(1);
const DEMO_MAP_WIDTH: f32 = 40.0;
const DEMO_MAP_HEIGHT: f32 = 30.0;
/// Frames between two player steps.
const STEP_FRAMES: u64 = 30;

/// What to simulate.
#[derive(Debug, Clone)]
pub struct SimulationOptions {
    /// Frames to run
    pub frames: u64,
    /// Log the overlay every this many frames (0 = never)
    pub log_every: u64,
    /// Commands run after entering the map, before the first frame
    pub commands: Vec<Command>,
    /// Session directory, restored when it holds a save and written at the end
    pub session: Option<PathBuf>,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            frames: 3600,
            log_every: 300,
            commands: vec![Command::Start],
            session: None,
        }
    }
}

/// Outcome of a simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    /// Frames run
    pub frames: u64,
    /// Frames that produced an overlay
    pub overlays: u64,
    /// Hour ticks seen
    pub hours_ticks: u64,
    /// Clock label at the end, e.g. `Day 1 05:00`
    pub final_label: String,
    /// Overlay color at the end as CSS `rgba(...)`
    pub final_color: Option<String>,
}

/// Parses a command file: one JSON command per line, blank lines and lines
/// starting with `#` ignored.
pub fn parse_commands(text: &str) -> GloamingResult<Vec<Command>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(Command::parse)
        .collect()
}

fn demo_areas() -> AreaSet {
    let room = |id: u32, x: f32, y: f32, width: f32, height: f32| Area {
        id: AreaId::new(id),
        map_id: DEMO_MAP,
        name: "inn".to_string(),
        x,
        y,
        width,
        height,
    };
    AreaSet::for_map(
        DEMO_MAP,
        vec![room(1, 4.0, 4.0, 8.0, 6.0), room(2, 12.0, 6.0, 4.0, 4.0)],
    )
}

fn demo_host(config: &GloamingConfig) -> HeadlessHost {
    let mut host = HeadlessHost::new(config.screen);
    host.load_map(DEMO_MAP_WIDTH, DEMO_MAP_HEIGHT, TilePoint::new(2.0, 12.0));
    host.add_event(EventId::new(1), "Campfire", TilePoint::new(20.0, 14.0));
    host.add_event(EventId::new(2), "Hearth", TilePoint::new(8.0, 6.0));
    host
}

fn open_session(config: GloamingConfig, dir: Option<&Path>) -> GloamingResult<GameContext> {
    match dir {
        Some(dir) if dir.join(CLOCK_SAVE_FILE).exists() => GameContext::load_session(config, dir),
        _ => GameContext::new(config),
    }
}

fn tick_logger(counter: Arc<Mutex<u64>>) -> Handler {
    handler(move |publisher| {
        if let Some(clock) = publisher.downcast_ref::<Clock>() {
            *counter.lock() += 1;
            info!(time = %clock.label(), "Hour passed");
        }
    })
}

/// Runs a simulation.
pub fn run(
    config: GloamingConfig,
    options: &SimulationOptions,
) -> GloamingResult<SimulationReport> {
    let context = Arc::new(open_session(config, options.session.as_deref())?);
    let mut host = demo_host(context.config());

    let hours_ticks = Arc::new(Mutex::new(0));
    context.bus().subscribe(
        ClockEvent::HoursTick.name(),
        PublisherKind::Clock,
        tick_logger(Arc::clone(&hours_ticks)),
    );
    context.bus().subscribe(
        ClockEvent::DaysTick.name(),
        PublisherKind::Clock,
        handler(|publisher| {
            if let Some(clock) = publisher.downcast_ref::<Clock>() {
                info!(day = clock.days(), "New day");
            }
        }),
    );

    let mut runtime = Runtime::new(Arc::clone(&context));
    runtime.enter_map(DEMO_MAP, demo_areas());
    for command in &options.commands {
        runtime.execute(command, &host)?;
    }

    let mut overlays = 0;
    let mut direction = 1.0;
    for frame_index in 1..=options.frames {
        if frame_index % STEP_FRAMES == 0 {
            let player = host.player();
            if player.x + direction < 0.0 || player.x + direction >= DEMO_MAP_WIDTH {
                direction = -direction;
            }
            host.move_player(TilePoint::new(player.x + direction, player.y));
        }

        let Some(frame) = runtime.frame(&host)? else {
            continue;
        };
        overlays += 1;
        if options.log_every > 0 && frame_index % options.log_every == 0 {
            let fill = frame
                .fill
                .map_or_else(|| "none".to_string(), |c| c.to_rgba(None));
            let time = context.clock().lock().label();
            info!(
                frame = frame_index,
                %time,
                %fill,
                cut_outs = frame.ops_with(BlendMode::DestinationOut).count(),
                highlights = frame.ops_with(BlendMode::HardLight).count(),
                "Overlay"
            );
        }
    }

    if let Some(dir) = &options.session {
        context.save_session(dir)?;
    }

    let report = SimulationReport {
        frames: options.frames,
        overlays,
        hours_ticks: *hours_ticks.lock(),
        final_label: context.clock().lock().label(),
        final_color: runtime.overlay_color().map(|c| c.to_rgba(None)),
    };
    debug!(?report, "Simulation finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let text = "# dawn\n{\"command\": \"setHours\", \"hours\": 5}\n\n{\"command\": \"start\"}\n";
        let commands = parse_commands(text).expect("valid");
        assert_eq!(commands, vec![Command::SetHours { hours: 5 }, Command::Start]);

        assert!(parse_commands("{\"command\": \"jump\"}").is_err());
    }

    #[test]
    fn test_short_run() {
        let mut config = GloamingConfig::default();
        config.clock.frames_per_minute = 1;
        let options = SimulationOptions {
            frames: 120,
            log_every: 0,
            commands: vec![Command::Start],
            session: None,
        };

        let report = run(config, &options).expect("ran");
        assert_eq!(report.overlays, 120);
        assert_eq!(report.hours_ticks, 2);
        assert_eq!(report.final_label, "Day 1 02:00");
        assert!(report.final_color.is_some());
    }
}
