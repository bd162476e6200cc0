use plotters::style::RGBColor;

use crate::axes::AxesState;
use crate::ticks::Orientation;

/// Resolved visual style of a single bar
#[derive(Debug, Clone, PartialEq)]
pub struct BarStyle {
    pub color: RGBColor,
    pub alpha: f64,
    pub hatch: Option<String>,
}

/// Primitive drawing commands in chart coordinates.
/// The backend executes these blindly.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    DrawRect {
        // Top-Left, Bottom-Right
        tl: (f64, f64),
        br: (f64, f64),
        style: BarStyle,
    },
    DrawLine {
        points: Vec<(f64, f64)>,
        color: RGBColor,
        width: u32,
    },
}

/// One subplot: its bars plus the recorded axis state
#[derive(Debug, Clone)]
pub struct PanelScene {
    pub row: usize,
    pub col: usize,
    pub title: Option<String>,
    pub orientation: Orientation,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub axes: AxesState,
    pub commands: Vec<DrawCommand>,
}

/// Everything the backend needs to draw a figure
#[derive(Debug, Clone)]
pub struct SceneGraph {
    pub width: u32,
    pub height: u32,
    pub nrow: usize,
    pub ncol: usize,
    pub title: Option<String>,
    pub panels: Vec<PanelScene>,
}
