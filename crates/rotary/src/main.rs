use clap::{Args, Parser, Subcommand};
use rotary::layout::{
    DEFAULT_INDICATOR_ANGLE, DEFAULT_OPTIONS, DEFAULT_RETURN_SPEED, SegmentRole,
};
use rotary::{Degrees, Dial, DialLayout, ManualTicks, OptionIndex, Phase, Rotation, TICK_INTERVAL};
use std::time::Instant;

/// Ticks between two lines of the animation trace.
const TRACE_EVERY: usize = 4;

#[derive(Parser, Debug)]
#[command(name = "rotary", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct DialArgs {
    /// Number of selectable options
    #[arg(short = 'n', long, default_value_t = DEFAULT_OPTIONS)]
    options: usize,

    /// Direction the dial turns away from rest (cw or ccw)
    #[arg(short = 'r', long, default_value_t = Rotation::Clockwise)]
    rotation: Rotation,

    /// Polar angle of the indicator in degrees (0 = right, counter-clockwise)
    #[arg(short = 'i', long, default_value_t = DEFAULT_INDICATOR_ANGLE, allow_hyphen_values = true)]
    indicator: f64,

    /// Return speed in degrees per second
    #[arg(short = 's', long, default_value_t = DEFAULT_RETURN_SPEED)]
    speed: f64,
}

impl DialArgs {
    fn layout(&self) -> anyhow::Result<DialLayout> {
        Ok(DialLayout::builder()
            .options(self.options)
            .rotation(self.rotation)
            .indicator_angle(self.indicator)
            .return_speed(self.speed)
            .build()?)
    }
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Print every segment and the offsets that align it with the indicator
    Layout {
        #[command(flatten)]
        dial: DialArgs,
    },
    /// Replay a drag of the given size, release it and trace the return to rest
    Replay {
        #[command(flatten)]
        dial: DialArgs,

        /// Degrees to drag in the dial's rotation sense (negative drags the wrong way)
        #[arg(short = 'd', long, allow_hyphen_values = true)]
        drag: f64,

        /// Number of pointer moves the drag is split into
        #[arg(long, default_value_t = 8)]
        steps: usize,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Layout { dial } => print_layout(&dial.layout()?),
        Commands::Replay { dial, drag, steps } => replay(dial.layout()?, drag, steps.max(1)),
    }
    Ok(())
}

fn print_layout(layout: &DialLayout) {
    println!(
        "{} options, {} segments of {}, rotation {}, max offset {}",
        layout.options(),
        layout.segment_count(),
        layout.segment_angle(),
        layout.rotation(),
        layout.max_offset()
    );

    for segment in layout.segments() {
        let role = match segment.role {
            SegmentRole::Padding => "padding".to_string(),
            SegmentRole::Option(i) => format!("option {i}"),
        };
        if segment.start == segment.end {
            println!("  #{:<3} {:<10} at rest", segment.index, role);
        } else {
            println!(
                "  #{:<3} {:<10} offset ({}, {}]",
                segment.index, role, segment.start, segment.end
            );
        }
    }
}

fn replay(layout: DialLayout, drag: f64, steps: usize) {
    let ticks = ManualTicks::new();
    let mut dial = Dial::new(layout, ticks.clone());
    dial.set_on_select(|i: OptionIndex| println!("callback: option {i}"));

    let sign = dial.layout().rotation().drag_sign();
    let start = Degrees::new(90.0);
    let mut now = Instant::now();

    dial.begin_drag(start);
    for step in 1..=steps {
        let travelled = drag * step as f64 / steps as f64;
        now += TICK_INTERVAL;
        dial.update_drag(Degrees::new(*start + sign * travelled), now);
        println!(
            "move {step:>3}: offset {:>7}  selection {}",
            dial.offset(),
            describe(dial.selection())
        );
        if !dial.is_dragging() {
            println!("drag clamped at {}", dial.offset());
            break;
        }
    }

    let selection = if dial.is_dragging() {
        dial.end_drag(now)
    } else {
        None
    };
    println!("released: {}", describe(selection));

    if let Phase::Animating(animation) = *dial.phase() {
        println!(
            "returning from {} over {} ms",
            animation.from,
            animation.duration.as_millis()
        );
    }

    let mut count = 0;
    while ticks.is_active() {
        now += TICK_INTERVAL;
        count += 1;
        let running = dial.tick(now);
        if count % TRACE_EVERY == 0 || !running {
            println!(
                "tick {count:>4}: offset {:>7}  locked {}",
                dial.offset(),
                dial.state().locked
            );
        }
    }
}

fn describe(selection: Option<OptionIndex>) -> String {
    selection.map_or_else(|| "none".to_string(), |i| format!("option {i}"))
}
