// Library exports for barplots

pub mod csv_reader;
pub mod graph;
pub mod parser;
pub mod runtime;
pub mod data;
pub mod error;

// Label layout core
pub mod axes;
pub mod positions;
pub mod sanitize;
pub mod style;
pub mod subplots;
pub mod ticks;

// Scene construction
pub mod ir;
pub mod scale;
pub mod compiler;
pub mod config;

pub use axes::{Axes, AxesState, Axis, TickSet};
pub use config::BarplotConfig;
pub use data::{PlotData, Row, Table};
pub use error::{BarplotError, BarplotResult};
pub use runtime::{build_scene, render_barplot};
pub use style::{resolve, StyleMap};
pub use subplots::SharedAxisLabels;
pub use ticks::{plot_bar_labels, LabelOptions, Orientation, Rotation};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    #[default]
    Png,
    #[serde(rename = "svg")]
    Svg,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
}

fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            format: OutputFormat::Png,
        }
    }
}
