//! Tick placement, rotation and label de-duplication for the categorical axis.
//!
//! [`plot_bar_labels`] processes the two innermost index levels, deepest
//! first. Outer levels are expected to be laid out as separate subplots by
//! the caller.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::axes::{Alignment, Axes, Axis, TickDirection, TickParams, TickSet};
use crate::data::Table;
use crate::error::{BarplotError, BarplotResult};
use crate::positions::{max_bar_position, text_positions};
use crate::sanitize::{sanitize_digits, sanitize_labels, CustomDefaults};

/// Decimal digits positions are rounded to before de-duplication
pub const POSITION_DECIMALS: i32 = 5;
/// Nudge applied to a colliding position, as a fraction of the axis span
pub const JITTER_FRACTION: f64 = 0.0002;
/// Locator bins on the value axis
pub const VALUE_AXIS_BINS: usize = 5;

const MINOR_LABEL_SIZE: f64 = 9.0;
const MAJOR_LABEL_SIZE: f64 = 10.0;
const SHORT_TICK_LENGTH: f64 = 20.0;
const TICK_LENGTH_PER_CHAR: f64 = 6.0;

/// Direction the bars grow in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Bars grow upwards; categories run along the x axis
    #[default]
    Vertical,
    /// Bars grow rightwards; categories run along the y axis
    Horizontal,
}

impl Orientation {
    pub fn category_axis(self) -> Axis {
        match self {
            Orientation::Vertical => Axis::X,
            Orientation::Horizontal => Axis::Y,
        }
    }

    pub fn value_axis(self) -> Axis {
        match self {
            Orientation::Vertical => Axis::Y,
            Orientation::Horizontal => Axis::X,
        }
    }
}

/// Label rotation policy, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Rotation {
    #[default]
    Auto,
    Fixed(f64),
}

impl FromStr for Rotation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Rotation::Auto);
        }
        s.parse::<f64>()
            .map(Rotation::Fixed)
            .map_err(|_| format!("invalid rotation '{}': expected \"auto\" or degrees", s))
    }
}

impl<'de> Deserialize<'de> for Rotation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Degrees(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Degrees(d) => Ok(Rotation::Fixed(d)),
            Raw::Text(t) => t.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Parameters of one label pass
#[derive(Debug, Clone)]
pub struct LabelOptions<'a> {
    pub orientation: Orientation,
    pub bar_width: f64,
    pub space_width: f64,
    pub minor_rotation: Rotation,
    pub major_rotation: Rotation,
    /// Skip emitting the minor level on this call
    pub unique_minor_labels: bool,
    /// Skip emitting the major level on this call
    pub unique_major_labels: bool,
    /// Clear the value-axis label on this call
    pub unique_data_label: bool,
    pub custom_defaults: &'a CustomDefaults,
}

/// What was computed for one index level
#[derive(Debug, Clone, PartialEq)]
pub struct LevelLayout {
    pub level: usize,
    pub minor: bool,
    pub positions: Vec<f64>,
    pub labels: Vec<String>,
    pub rotation: f64,
    pub max_label_len: usize,
    /// False when uniqueness suppression skipped the level
    pub emitted: bool,
}

/// Result of a label pass, deepest level first
#[derive(Debug, Clone, PartialEq)]
pub struct LabelLayout {
    pub total_width: f64,
    pub levels: Vec<LevelLayout>,
}

impl LabelLayout {
    pub fn minor(&self) -> Option<&LevelLayout> {
        self.levels.iter().find(|l| l.minor)
    }

    pub fn major(&self) -> Option<&LevelLayout> {
        self.levels.iter().find(|l| !l.minor)
    }
}

/// Automatic rotation for a level, in degrees.
///
/// `density` is the distinct label count over the longest label length.
/// Major labels deliberately use the swapped thresholds and, on vertical
/// charts, the `>=` comparison, which keeps them horizontal unless there are
/// very many of them.
pub fn auto_rotation(
    minor: bool,
    orientation: Orientation,
    distinct_labels: usize,
    max_label_len: usize,
    total_width: f64,
) -> f64 {
    let density = distinct_labels as f64 / max_label_len as f64;
    let rotate = match (minor, orientation) {
        (true, Orientation::Vertical) => density <= total_width * 5.0,
        (true, Orientation::Horizontal) => density <= total_width * 20.0,
        (false, Orientation::Horizontal) => density <= total_width * 5.0,
        (false, Orientation::Vertical) => density >= total_width * 20.0,
    };
    if rotate {
        90.0
    } else {
        0.0
    }
}

fn round_position(position: f64) -> f64 {
    let factor = 10f64.powi(POSITION_DECIMALS);
    (position * factor).round() / factor
}

/// Length of the major tick, which pushes major labels past the minor ones.
///
/// Long when minor labels run perpendicular to the axis line.
fn major_tick_length(orientation: Orientation, minor_rotation: f64, max_label_len: usize) -> f64 {
    let perpendicular = match orientation {
        Orientation::Vertical => minor_rotation > 80.0,
        Orientation::Horizontal => minor_rotation <= 80.0,
    };
    if perpendicular {
        TICK_LENGTH_PER_CHAR * max_label_len as f64
    } else {
        SHORT_TICK_LENGTH
    }
}

/// Place, rotate and label the categorical ticks of one bar chart.
///
/// Also configures the value axis: five locator bins and numerals formatted
/// through the label sanitizer. Fails with [`BarplotError::EmptyLevel`] before
/// touching a level that has no labels; levels processed earlier in the pass
/// stay applied.
pub fn plot_bar_labels<A: Axes + ?Sized>(
    axes: &mut A,
    table: &Table,
    options: &LabelOptions<'_>,
) -> BarplotResult<LabelLayout> {
    let levels = table.depth();
    let total_width = max_bar_position(table, options.bar_width, options.space_width);
    let category_axis = options.orientation.category_axis();
    let value_axis = options.orientation.value_axis();

    if options.unique_data_label {
        axes.set_label(value_axis, "");
    }
    axes.locator_params(value_axis, VALUE_AXIS_BINS);
    axes.set_major_formatter(value_axis, sanitize_digits);

    let mut seen: HashSet<u64> = HashSet::new();
    let mut layout = LabelLayout {
        total_width,
        levels: Vec::new(),
    };

    for level in (levels.saturating_sub(2)..levels).rev() {
        let (raw_positions, raw_labels): (Vec<f64>, Vec<String>) =
            text_positions(table, options.bar_width, options.space_width, level)?
                .into_iter()
                .unzip();
        let labels = sanitize_labels(&raw_labels, options.custom_defaults);

        let max_label_len = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        if max_label_len == 0 {
            return Err(BarplotError::EmptyLevel { level });
        }

        let positions: Vec<f64> = raw_positions
            .into_iter()
            .map(round_position)
            .map(|p| {
                if seen.contains(&p.to_bits()) {
                    tracing::debug!(level, position = p, "nudging colliding tick");
                    p + total_width * JITTER_FRACTION
                } else {
                    p
                }
            })
            .collect();
        seen.extend(positions.iter().map(|p| p.to_bits()));

        let minor = level == levels - 1;
        let policy = if minor {
            options.minor_rotation
        } else {
            options.major_rotation
        };
        let rotation = match policy {
            Rotation::Auto => {
                let distinct = labels.iter().collect::<HashSet<_>>().len();
                auto_rotation(minor, options.orientation, distinct, max_label_len, total_width)
            }
            Rotation::Fixed(degrees) => degrees,
        };

        let suppressed = if minor {
            options.unique_minor_labels
        } else {
            options.unique_major_labels
        };
        tracing::debug!(level, minor, rotation, suppressed, "label level laid out");

        if !suppressed {
            let which = if minor { TickSet::Minor } else { TickSet::Major };
            axes.set_ticks(category_axis, which, &positions);
            axes.set_tick_labels(category_axis, which, &labels, Alignment::Center);

            if minor {
                axes.tick_params(
                    category_axis,
                    TickSet::Minor,
                    TickParams {
                        label_size: Some(MINOR_LABEL_SIZE),
                        label_rotation: Some(rotation),
                        ..Default::default()
                    },
                );
                // the major tick only spaces major labels away from minor ones
                axes.tick_params(
                    category_axis,
                    TickSet::Major,
                    TickParams {
                        label_size: Some(MAJOR_LABEL_SIZE),
                        direction: Some(TickDirection::Out),
                        length: Some(major_tick_length(options.orientation, rotation, max_label_len)),
                        width: Some(0.0),
                        ..Default::default()
                    },
                );
            } else {
                axes.tick_params(
                    category_axis,
                    TickSet::Major,
                    TickParams {
                        label_size: Some(MAJOR_LABEL_SIZE),
                        label_rotation: Some(rotation),
                        ..Default::default()
                    },
                );
            }
        }

        layout.levels.push(LevelLayout {
            level,
            minor,
            positions,
            labels,
            rotation,
            max_label_len,
            emitted: !suppressed,
        });
    }

    Ok(layout)
}
