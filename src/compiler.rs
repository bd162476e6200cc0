use plotters::style::RGBColor;

use crate::data::Table;
use crate::error::BarplotResult;
use crate::ir::{BarStyle, DrawCommand};
use crate::positions::bar_positions;
use crate::style::{parse_color, resolve, resolve_or, StyleMap, PALETTE};
use crate::ticks::Orientation;

pub const DEFAULT_ALPHA: f64 = 0.75;

const WHISKER_COLOR: RGBColor = RGBColor(0, 0, 0);

/// Style maps consulted for every bar
#[derive(Debug, Clone, Default)]
pub struct BarStyles {
    pub colors: StyleMap<String>,
    pub alphas: StyleMap<f64>,
    pub hatches: Option<StyleMap<String>>,
}

// =============================================================================
// Bar Geometry Helpers
// =============================================================================

/// Computed geometry for a single bar, expressed as primitive shapes
#[derive(Debug, Clone, PartialEq)]
pub struct BarGeometry {
    pub box_tl: (f64, f64),
    pub box_br: (f64, f64),
    pub whisker: Option<Vec<(f64, f64)>>,
    pub caps: Vec<Vec<(f64, f64)>>,
}

/// Calculates the bar rectangle and, when a std is given, its error whisker
pub fn compute_bar_geometry(
    x: f64,
    width: f64,
    y: f64,
    std: Option<f64>,
    is_vertical: bool,
) -> BarGeometry {
    let half_width = width / 2.0;
    let cap_half = width * 0.2;
    let top = y.max(0.0);
    let bottom = y.min(0.0);

    let spread = std.map(f64::abs).filter(|s| *s > 0.0);
    let (whisker, caps) = match spread {
        Some(s) => {
            let (low, high) = (y - s, y + s);
            if is_vertical {
                (
                    Some(vec![(x, low), (x, high)]),
                    vec![
                        vec![(x - cap_half, low), (x + cap_half, low)],
                        vec![(x - cap_half, high), (x + cap_half, high)],
                    ],
                )
            } else {
                (
                    Some(vec![(low, x), (high, x)]),
                    vec![
                        vec![(low, x - cap_half), (low, x + cap_half)],
                        vec![(high, x - cap_half), (high, x + cap_half)],
                    ],
                )
            }
        }
        None => (None, Vec::new()),
    };

    if is_vertical {
        BarGeometry {
            box_tl: (x - half_width, top),
            box_br: (x + half_width, bottom),
            whisker,
            caps,
        }
    } else {
        // Horizontal orientation
        BarGeometry {
            box_tl: (bottom, x + half_width),
            box_br: (top, x - half_width),
            whisker,
            caps,
        }
    }
}

/// Color of a bar when no color map is configured: palette cycled by leaf
fn palette_color(leaf: &str, leaves: &mut Vec<String>) -> String {
    let idx = match leaves.iter().position(|l| l == leaf) {
        Some(i) => i,
        None => {
            leaves.push(leaf.to_string());
            leaves.len() - 1
        }
    };
    PALETTE[idx % PALETTE.len()].to_string()
}

/// Compile one subplot's bars into drawing commands.
///
/// Styles are looked up with the key `(top_index, *row_index)`.
pub fn plot_bars(
    table: &Table,
    bar_width: f64,
    space_width: f64,
    styles: &BarStyles,
    top_index: &str,
    orientation: Orientation,
) -> BarplotResult<Vec<DrawCommand>> {
    let is_vertical = orientation == Orientation::Vertical;
    let mut commands = Vec::new();
    let mut leaves = Vec::new();

    for bar in bar_positions(table, bar_width, space_width) {
        let mut key = Vec::with_capacity(bar.index.len() + 1);
        key.push(top_index.to_string());
        key.extend(bar.index.iter().cloned());
        let leaf = bar.index.last().map(String::as_str).unwrap_or(top_index);

        let color_name = if styles.colors.is_empty() {
            palette_color(leaf, &mut leaves)
        } else {
            resolve(&styles.colors, &key)?.clone()
        };
        let alpha = resolve_or(&styles.alphas, &key, DEFAULT_ALPHA)?;
        let hatch = match &styles.hatches {
            Some(hatches) => Some(resolve(hatches, &key)?.clone()),
            None => None,
        };

        let geometry = compute_bar_geometry(bar.x, bar_width, bar.y, bar.std, is_vertical);
        commands.push(DrawCommand::DrawRect {
            tl: geometry.box_tl,
            br: geometry.box_br,
            style: BarStyle {
                color: parse_color(&color_name)?,
                alpha,
                hatch,
            },
        });

        if let Some(points) = geometry.whisker {
            commands.push(DrawCommand::DrawLine {
                points,
                color: WHISKER_COLOR,
                width: 1,
            });
            for cap in geometry.caps {
                commands.push(DrawCommand::DrawLine {
                    points: cap,
                    color: WHISKER_COLOR,
                    width: 1,
                });
            }
        }
    }

    Ok(commands)
}
