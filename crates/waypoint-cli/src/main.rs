use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use kurbo::{Rect, Size};
use serde::Serialize;
use std::path::PathBuf;
use std::rc::Rc;
use waypoint_core::{TourKey, TourProgress};
use waypoint_geometry::{Alignment, AlignmentEngine, PreferredSide};
use waypoint_storage::{ProgressStore, SqliteProgressStore};

mod demo;
mod settings;

use settings::Settings;

#[derive(Parser, Debug)]
#[command(author, version, about = "Guided tour engine tools", long_about = None)]
struct Args {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Progress database, overriding the settings file
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute where a callout goes for the given geometry
    Align {
        /// Anchor rectangle as x,y,width,height
        #[arg(long, value_parser = parse_rect)]
        anchor: Rect,
        /// Container rectangle as x,y,width,height
        #[arg(long, value_parser = parse_rect)]
        container: Rect,
        /// Callout size as width,height (defaults to the configured size)
        #[arg(long, value_parser = parse_size)]
        size: Option<Size>,
        #[arg(long, value_enum, default_value_t = SideArg::Bottom)]
        preferred: SideArg,
        /// Alignment used for the previous frame
        #[arg(long, value_enum)]
        previous: Option<AlignmentArg>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Inspect or reset persisted tour progress
    Progress {
        #[command(subcommand)]
        action: ProgressAction,
    },
    /// Run a scripted tour against a simulated workbench
    Demo {
        /// Close the callout of the step with this sequence index
        #[arg(long)]
        close_at: Option<u32>,
        /// Keep progress in memory instead of the database
        #[arg(long)]
        in_memory: bool,
    },
    /// Write the effective settings to the settings file
    InitSettings,
}

#[derive(Subcommand, Debug)]
enum ProgressAction {
    Show {
        #[arg(long)]
        json: bool,
    },
    Reset {
        tour: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SideArg {
    Top,
    Right,
    Bottom,
    Left,
    Centered,
}

impl From<SideArg> for PreferredSide {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Top => PreferredSide::Top,
            SideArg::Right => PreferredSide::Right,
            SideArg::Bottom => PreferredSide::Bottom,
            SideArg::Left => PreferredSide::Left,
            SideArg::Centered => PreferredSide::Centered,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum AlignmentArg {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    LeftTop,
    LeftBottom,
    RightTop,
    RightBottom,
    InnerLeft,
    InnerRight,
    Middle,
}

impl From<AlignmentArg> for Alignment {
    fn from(alignment: AlignmentArg) -> Self {
        match alignment {
            AlignmentArg::TopLeft => Alignment::TopLeft,
            AlignmentArg::TopRight => Alignment::TopRight,
            AlignmentArg::BottomLeft => Alignment::BottomLeft,
            AlignmentArg::BottomRight => Alignment::BottomRight,
            AlignmentArg::LeftTop => Alignment::LeftTop,
            AlignmentArg::LeftBottom => Alignment::LeftBottom,
            AlignmentArg::RightTop => Alignment::RightTop,
            AlignmentArg::RightBottom => Alignment::RightBottom,
            AlignmentArg::InnerLeft => Alignment::InnerLeft,
            AlignmentArg::InnerRight => Alignment::InnerRight,
            AlignmentArg::Middle => Alignment::Middle,
        }
    }
}

fn parse_numbers<const N: usize>(value: &str) -> Result<[f64; N], String> {
    let numbers = value
        .split(',')
        .map(|part| part.trim().parse::<f64>().map_err(|e| format!("'{part}': {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    numbers
        .try_into()
        .map_err(|numbers: Vec<f64>| format!("expected {N} numbers, got {}", numbers.len()))
}

fn parse_rect(value: &str) -> Result<Rect, String> {
    let [x, y, w, h] = parse_numbers::<4>(value)?;
    Ok(Rect::new(x, y, x + w, y + h))
}

fn parse_size(value: &str) -> Result<Size, String> {
    let [w, h] = parse_numbers::<2>(value)?;
    Ok(Size::new(w, h))
}

#[derive(Serialize)]
struct AlignReport {
    alignment: Alignment,
    origin: [f64; 2],
    size: [f64; 2],
    pointer_tip: Option<[f64; 2]>,
    outline_svg: String,
}

fn progress_line(progress: &TourProgress) -> String {
    format!(
        "{:<24} {:>3}/{:<3} {:>4.0}%  {}",
        progress.tour_key.to_string(),
        progress.highest_index_reached,
        progress.total_length,
        progress.fraction() * 100.0,
        if progress.completed { "completed" } else { "in progress" }
    )
}

fn open_store(settings: &Settings) -> Result<SqliteProgressStore> {
    let path = settings.progress_db_path();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating progress directory {:?}", dir))?;
    }
    tracing::debug!("Opening progress database {:?}", path);
    SqliteProgressStore::open(&path).with_context(|| format!("opening {:?}", path))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let settings_path = args.settings.clone().or_else(Settings::default_path);
    let mut settings = match &settings_path {
        Some(path) => Settings::load_from(path),
        None => Settings::default(),
    };
    if let Some(db) = args.db {
        settings.progress_db = Some(db);
    }
    let default_size = Size::new(settings.callout.width, settings.callout.height);

    match args.command {
        Command::Align {
            anchor,
            container,
            size,
            preferred,
            previous,
            json,
        } => {
            let engine = AlignmentEngine::new(settings.metrics);
            let size = size.unwrap_or(default_size);
            let placement = engine.layout(
                anchor,
                container,
                size,
                previous.map(Alignment::from),
                preferred.into(),
            );
            let tip = placement.pointer_tip(engine.metrics());
            if json {
                let report = AlignReport {
                    alignment: placement.alignment,
                    origin: [placement.origin.x, placement.origin.y],
                    size: [size.width, size.height],
                    pointer_tip: tip.map(|p| [p.x, p.y]),
                    outline_svg: placement.outline.to_svg(),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("alignment:   {:?}", placement.alignment);
                println!(
                    "origin:      ({:.1}, {:.1})",
                    placement.origin.x, placement.origin.y
                );
                match tip {
                    Some(tip) => println!("pointer tip: ({:.1}, {:.1})", tip.x, tip.y),
                    None => println!("pointer tip: none"),
                }
            }
        }
        Command::Progress { action } => {
            let store = open_store(&settings)?;
            match action {
                ProgressAction::Show { json } => {
                    let all = store.all()?;
                    if json {
                        println!("{}", serde_json::to_string_pretty(&all)?);
                    } else if all.is_empty() {
                        println!("No tour progress recorded.");
                    } else {
                        for progress in all {
                            println!("{}", progress_line(&progress));
                        }
                    }
                }
                ProgressAction::Reset { tour } => {
                    if store.reset(&TourKey::new(tour.as_str()))? {
                        println!("Reset progress of '{}'.", tour);
                    } else {
                        println!("No progress recorded for '{}'.", tour);
                    }
                }
            }
        }
        Command::Demo {
            close_at,
            in_memory,
        } => {
            let store: Rc<dyn ProgressStore> = if in_memory {
                Rc::new(waypoint_storage::InMemoryProgressStore::new())
            } else {
                Rc::new(open_store(&settings)?)
            };
            let outcome = demo::run(
                store.clone(),
                demo::DemoOptions {
                    metrics: settings.metrics,
                    callout_size: default_size,
                    close_at,
                },
            )?;
            let progress = store.progress(&TourKey::new(demo::DEMO_TOUR))?;
            println!(
                "Tour ended: {:?} (reached {}/{})",
                outcome, progress.highest_index_reached, progress.total_length
            );
        }
        Command::InitSettings => {
            let path = settings_path.context("no settings location available")?;
            settings.save_to(&path)?;
            println!("Wrote settings to {:?}", path);
        }
    }

    Ok(())
}
