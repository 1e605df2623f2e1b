//! Line-oriented console front-end
//!
//! Parses one command per line and runs it against a `Session`.

use std::path::PathBuf;

use anyhow::Context;
use lasersketch_communication::list_ports;
use lasersketch_core::{Axis, CoordinateMode, Direction};
use lasersketch_designer::{ArcStyle, BoundingBox, Point, Shape, StrokeStyle};
use thiserror::Error;

use crate::session::Session;

pub const HELP: &str = "\
Motion:  x+ | x- | y+ | y- | z+ | z- [step]   home   stop   pos   ports
         mode abs|rel   step <mm>   feed <mm/min>   send <gcode>
Drawing: rect <x> <y> <w> <h>   oval <x> <y> <w> <h>   line <x1> <y1> <x2> <y2>
         poly <x> <y> <x> <y> <x> <y> ...   arc <x> <y> <w> <h> <start> <extent> [open|chord|pieslice]
         delete <id>   list   grid on|off   zoom <factor>   undo   redo
Files:   save <file>   open <file>
Other:   help   quit";

/// A parsed console command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Jog {
        axis: Axis,
        direction: Direction,
        step: Option<f64>,
    },
    Home,
    Stop,
    Mode(CoordinateMode),
    Step(f64),
    Feed(i64),
    Position,
    Ports,
    Draw(Shape),
    Delete(u64),
    List,
    Grid(bool),
    Zoom(f64),
    Undo,
    Redo,
    Save(PathBuf),
    Open(PathBuf),
    Send(String),
    Help,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("")]
    Empty,

    #[error("Unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Not a number: '{0}'")]
    BadNumber(String),
}

fn numbers(args: &[&str]) -> Result<Vec<f64>, ParseError> {
    args.iter()
        .map(|a| a.parse::<f64>().map_err(|_| ParseError::BadNumber(a.to_string())))
        .collect()
}

fn exactly<const N: usize>(args: &[&str], usage: &'static str) -> Result<[f64; N], ParseError> {
    let values = numbers(args)?;
    values.try_into().map_err(|_| ParseError::Usage(usage))
}

fn parse_jog(word: &str) -> Option<(Axis, Direction)> {
    let mut chars = word.chars();
    let axis = chars.next()?.to_string().parse::<Axis>().ok()?;
    let direction = chars.as_str().parse::<Direction>().ok()?;
    Some((axis, direction))
}

/// Parse one console line
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    let Some((&word, args)) = tokens.split_first() else {
        return Err(ParseError::Empty);
    };
    let word_lower = word.to_ascii_lowercase();

    if let Some((axis, direction)) = parse_jog(&word_lower) {
        let step = match args {
            [] => None,
            [step] => Some(
                step.parse::<f64>()
                    .map_err(|_| ParseError::BadNumber(step.to_string()))?,
            ),
            _ => return Err(ParseError::Usage("x+ [step]")),
        };
        return Ok(Command::Jog {
            axis,
            direction,
            step,
        });
    }

    let command = match word_lower.as_str() {
        "home" => Command::Home,
        "stop" | "estop" => Command::Stop,
        "pos" | "position" => Command::Position,
        "ports" => Command::Ports,
        "mode" => match args {
            [mode] => Command::Mode(
                mode.parse::<CoordinateMode>()
                    .map_err(|_| ParseError::Usage("mode abs|rel"))?,
            ),
            _ => return Err(ParseError::Usage("mode abs|rel")),
        },
        "step" => Command::Step(exactly::<1>(args, "step <mm>")?[0]),
        "feed" => match args {
            [feed] => Command::Feed(
                feed.parse::<i64>()
                    .map_err(|_| ParseError::BadNumber(feed.to_string()))?,
            ),
            _ => return Err(ParseError::Usage("feed <mm/min>")),
        },
        "rect" => {
            let [x, y, w, h] = exactly::<4>(args, "rect <x> <y> <w> <h>")?;
            Command::Draw(Shape::Rectangle {
                bounds: BoundingBox::new(x, y, x + w, y + h),
            })
        }
        "oval" => {
            let [x, y, w, h] = exactly::<4>(args, "oval <x> <y> <w> <h>")?;
            Command::Draw(Shape::Oval {
                bounds: BoundingBox::new(x, y, x + w, y + h),
            })
        }
        "line" => {
            let [x1, y1, x2, y2] = exactly::<4>(args, "line <x1> <y1> <x2> <y2>")?;
            Command::Draw(Shape::Line {
                start: Point::new(x1, y1),
                end: Point::new(x2, y2),
            })
        }
        "poly" => {
            let values = numbers(args)?;
            if values.len() < 6 || values.len() % 2 != 0 {
                return Err(ParseError::Usage("poly <x> <y> <x> <y> <x> <y> ..."));
            }
            Command::Draw(Shape::Polygon {
                vertices: values.chunks_exact(2).map(|p| Point::new(p[0], p[1])).collect(),
            })
        }
        "arc" => {
            const USAGE: &str = "arc <x> <y> <w> <h> <start> <extent> [open|chord|pieslice]";
            let (nums, style) = match args.len() {
                6 => (&args[..], ArcStyle::Open),
                7 => (
                    &args[..6],
                    ArcStyle::parse(args[6]).ok_or(ParseError::Usage(USAGE))?,
                ),
                _ => return Err(ParseError::Usage(USAGE)),
            };
            let [x, y, w, h, start, extent] = exactly::<6>(nums, USAGE)?;
            Command::Draw(Shape::Arc {
                bounds: BoundingBox::new(x, y, x + w, y + h),
                start,
                extent,
                style,
            })
        }
        "delete" | "del" => match args {
            [id] => Command::Delete(
                id.parse::<u64>()
                    .map_err(|_| ParseError::BadNumber(id.to_string()))?,
            ),
            _ => return Err(ParseError::Usage("delete <id>")),
        },
        "list" | "ls" => Command::List,
        "grid" => match args {
            ["on"] => Command::Grid(true),
            ["off"] => Command::Grid(false),
            _ => return Err(ParseError::Usage("grid on|off")),
        },
        "zoom" => Command::Zoom(exactly::<1>(args, "zoom <factor>")?[0]),
        "undo" => Command::Undo,
        "redo" => Command::Redo,
        "save" => match args {
            [path] => Command::Save(PathBuf::from(*path)),
            _ => return Err(ParseError::Usage("save <file>")),
        },
        "open" => match args {
            [path] => Command::Open(PathBuf::from(*path)),
            _ => return Err(ParseError::Usage("open <file>")),
        },
        "send" => {
            if args.is_empty() {
                return Err(ParseError::Usage("send <gcode>"));
            }
            Command::Send(args.join(" "))
        }
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ => return Err(ParseError::Unknown(word.to_string())),
    };

    Ok(command)
}

/// Run a command; returns text to show the user
///
/// `Quit` is the caller's business and yields an empty reply.
pub fn execute(session: &mut Session, command: Command) -> anyhow::Result<String> {
    let reply = match command {
        Command::Jog {
            axis,
            direction,
            step,
        } => {
            if let Some(step) = step {
                session.set_step_size(step)?;
            }
            session.jog(axis, direction)?.join(" | ")
        }
        Command::Home => {
            session.home()?;
            "Homing".to_string()
        }
        Command::Stop => {
            session.emergency_stop()?;
            "EMERGENCY STOP sent".to_string()
        }
        Command::Mode(mode) => {
            session.set_mode(mode);
            format!("Jog mode: {}", mode)
        }
        Command::Step(step) => {
            session.set_step_size(step)?;
            format!("Step: {}", session.machine().step_size())
        }
        Command::Feed(feed) => {
            session.set_feed_rate(feed)?;
            format!("Feed: {}", session.machine().feed_rate())
        }
        Command::Position => {
            let machine = session.machine();
            format!(
                "{} ({}, step {}, F{})",
                machine.position(),
                machine.mode(),
                machine.step_size(),
                machine.feed_rate()
            )
        }
        Command::Ports => {
            let ports = list_ports().context("Could not list serial ports")?;
            if ports.is_empty() {
                "No controller ports found".to_string()
            } else {
                ports
                    .iter()
                    .map(|p| format!("{}  {}", p.port_name, p.description))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
        Command::Draw(shape) => {
            let kind = shape.kind();
            let id = session.add_shape(shape, StrokeStyle::default());
            format!("Added {} #{}", kind, id)
        }
        Command::Delete(id) => {
            if !session.delete_shape(id) {
                anyhow::bail!("No shape #{}", id);
            }
            format!("Deleted #{}", id)
        }
        Command::List => {
            let lines: Vec<String> = session
                .designer()
                .scene()
                .durable_objects()
                .map(|o| format!("#{} {} {:?}", o.id, o.kind(), o.shape.points()))
                .collect();
            if lines.is_empty() {
                "No shapes".to_string()
            } else {
                lines.join("\n")
            }
        }
        Command::Grid(on) => {
            session.designer_mut().set_grid_visible(on);
            format!("Grid {}", if on { "on" } else { "off" })
        }
        Command::Zoom(factor) => {
            if !session.designer_mut().set_zoom(factor) {
                anyhow::bail!("Zoom must be between 0.1 and 50");
            }
            format!("Zoom: {}", session.designer().viewport())
        }
        Command::Undo => match session.undo() {
            Ok(report) => restore_summary("Undo", &report),
            Err(e) => e.to_string(),
        },
        Command::Redo => match session.redo() {
            Ok(report) => restore_summary("Redo", &report),
            Err(e) => e.to_string(),
        },
        Command::Save(path) => {
            session
                .designer_mut()
                .save_to_file(&path)
                .with_context(|| format!("Could not save {}", path.display()))?;
            format!("Saved {}", path.display())
        }
        Command::Open(path) => {
            let report = session
                .designer_mut()
                .load_from_file(&path)
                .with_context(|| format!("Could not open {}", path.display()))?;
            restore_summary("Opened", &report)
        }
        Command::Send(line) => {
            session.send_raw(&line)?;
            format!("> {}", line)
        }
        Command::Help => HELP.to_string(),
        Command::Quit => String::new(),
    };
    Ok(reply)
}

fn restore_summary(action: &str, report: &lasersketch_designer::RestoreReport) -> String {
    if report.is_complete() {
        format!("{}: {} shapes", action, report.restored)
    } else {
        format!(
            "{}: {} shapes, {} unreadable skipped",
            action,
            report.restored,
            report.skipped.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_jog() {
        assert_eq!(
            parse_command("x+"),
            Ok(Command::Jog {
                axis: Axis::X,
                direction: Direction::Positive,
                step: None
            })
        );
        assert_eq!(
            parse_command("  Y- 2.5 "),
            Ok(Command::Jog {
                axis: Axis::Y,
                direction: Direction::Negative,
                step: Some(2.5)
            })
        );
        assert_eq!(
            parse_command("z+ far"),
            Err(ParseError::BadNumber("far".to_string()))
        );
    }

    #[test]
    fn test_parse_shapes() {
        assert_eq!(
            parse_command("rect 1 2 3 4"),
            Ok(Command::Draw(Shape::Rectangle {
                bounds: BoundingBox::new(1.0, 2.0, 4.0, 6.0)
            }))
        );
        assert_eq!(
            parse_command("arc 0 0 10 10 90 180 chord"),
            Ok(Command::Draw(Shape::Arc {
                bounds: BoundingBox::new(0.0, 0.0, 10.0, 10.0),
                start: 90.0,
                extent: 180.0,
                style: ArcStyle::Chord,
            }))
        );
        assert!(matches!(
            parse_command("poly 0 0 1 1"),
            Err(ParseError::Usage(_))
        ));
        assert!(matches!(parse_command("rect 1 2 3"), Err(ParseError::Usage(_))));
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(parse_command(""), Err(ParseError::Empty));
        assert_eq!(parse_command("mode rel"), Ok(Command::Mode(CoordinateMode::Relative)));
        assert_eq!(parse_command("feed -5"), Ok(Command::Feed(-5)));
        assert_eq!(parse_command("grid on"), Ok(Command::Grid(true)));
        assert_eq!(parse_command("ports"), Ok(Command::Ports));
        assert_eq!(parse_command("send M105"), Ok(Command::Send("M105".to_string())));
        assert_eq!(
            parse_command("fly"),
            Err(ParseError::Unknown("fly".to_string()))
        );
    }

    #[test]
    fn test_execute_without_machine() {
        let mut session = Session::new();
        let err = execute(&mut session, Command::Home).unwrap_err();
        assert_eq!(err.to_string(), "Not connected");
        assert_eq!(
            session.machine().position(),
            lasersketch_core::AxisPosition::origin()
        );

        let err = execute(&mut session, Command::Step(0.0)).unwrap_err();
        assert!(err.to_string().contains("Invalid step size"));
    }

    #[test]
    fn test_execute_drawing_and_undo() {
        let mut session = Session::new();
        let reply = execute(&mut session, parse_command("line 0 0 5 5").unwrap()).unwrap();
        assert_eq!(reply, "Added line #1");
        assert_eq!(
            execute(&mut session, Command::Undo).unwrap(),
            "Undo: 0 shapes"
        );
        assert_eq!(
            execute(&mut session, Command::Undo).unwrap(),
            "Nothing to undo"
        );
        assert_eq!(
            execute(&mut session, Command::Redo).unwrap(),
            "Redo: 1 shapes"
        );
    }

    #[test]
    fn test_delete_refuses_grid_lines() {
        let mut session = Session::new();
        execute(&mut session, Command::Grid(true)).unwrap();
        let grid_line = session.designer().scene().objects()[0].id;
        assert!(execute(&mut session, Command::Delete(grid_line)).is_err());

        let reply = execute(&mut session, parse_command("rect 0 0 5 5").unwrap()).unwrap();
        let id: u64 = reply.rsplit('#').next().unwrap().parse().unwrap();
        assert_eq!(
            execute(&mut session, Command::Delete(id)).unwrap(),
            format!("Deleted #{}", id)
        );
        assert_eq!(session.designer().shape_count(), 0);
    }
}
