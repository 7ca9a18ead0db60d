use std::{str::FromStr, time::Duration};

use lane_control_core::{InputSnapshot, Key, SpeedMultiplier, ToolKind, Vec2};
use lane_control_simulation::ports::ScriptedInput;
use thiserror::Error;

/// Tool click requested on the command line as `tool@x,y@seconds`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ScriptedClick {
    pub(crate) tool: ToolKind,
    pub(crate) position: Vec2,
    pub(crate) at: Duration,
}

/// Reasons a click argument could not be parsed.
#[derive(Debug, PartialEq, Eq, Error)]
pub(crate) enum ClickParseError {
    #[error("expected tool@x,y@seconds")]
    Shape,
    #[error("unknown tool `{}` (expected one of {})", .0, known_tools())]
    UnknownTool(String),
    #[error("invalid coordinate `{0}`")]
    Coordinate(String),
    #[error("invalid time `{0}`")]
    Time(String),
}

fn known_tools() -> String {
    let labels: Vec<&str> = ToolKind::ALL.iter().map(|tool| tool.label()).collect();
    labels.join(", ")
}

impl FromStr for ScriptedClick {
    type Err = ClickParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.trim().split('@');
        let (Some(tool), Some(position), Some(at), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(ClickParseError::Shape);
        };

        let tool =
            ToolKind::from_label(tool).ok_or_else(|| ClickParseError::UnknownTool(tool.to_owned()))?;
        let (x, y) = position.split_once(',').ok_or(ClickParseError::Shape)?;
        let coordinate = |raw: &str| {
            raw.trim()
                .parse::<f32>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| ClickParseError::Coordinate(raw.to_owned()))
        };
        let position = Vec2::new(coordinate(x)?, coordinate(y)?);
        let at = at
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .ok_or_else(|| ClickParseError::Time(at.to_owned()))?;

        Ok(Self { tool, position, at })
    }
}

/// Converts clicks into a frame-indexed input timeline.
///
/// Each click selects its tool and clicks within the same frame, on the first
/// frame whose simulated end time reaches the requested time.
pub(crate) fn timeline(
    clicks: &[ScriptedClick],
    frame: Duration,
    speed: SpeedMultiplier,
) -> ScriptedInput {
    let per_frame = speed.scale(frame).as_secs_f64();
    clicks.iter().fold(ScriptedInput::new(), |input, click| {
        let index = if per_frame > 0.0 {
            (click.at.as_secs_f64() / per_frame).ceil() as u64
        } else {
            0
        };
        let index = index.saturating_sub(1);
        input.at(
            index,
            InputSnapshot::click_at(click.position).with_pressed(Key::for_tool(click.tool)),
        )
    })
}
