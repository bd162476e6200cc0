// Runtime executor: table + configuration -> scene graph -> image bytes

use anyhow::{bail, Context, Result};

use crate::axes::{Axes, AxesState, TickSet};
use crate::compiler::{plot_bars, BarStyles};
use crate::config::BarplotConfig;
use crate::data::Table;
use crate::error::BarplotResult;
use crate::graph;
use crate::ir::{PanelScene, SceneGraph};
use crate::positions::text_positions;
use crate::sanitize::sanitize_label;
use crate::scale::panel_ranges;
use crate::subplots::{
    calculate_grid_dimensions, category_group, grid_cell, label_order, value_group,
    SharedAxisLabels,
};
use crate::ticks::{plot_bar_labels, LabelOptions};
use crate::RenderOptions;

/// Render a table to PNG or SVG bytes
pub fn render_barplot(table: &Table, config: &BarplotConfig, options: &RenderOptions) -> Result<Vec<u8>> {
    let scene = build_scene(table, config, options)?;
    graph::render(&scene, &options.format)
}

/// Lay out every subplot of a table.
///
/// Index levels beyond the inner two become subplots; category and
/// value-axis labels shared between subplots are emitted once.
pub fn build_scene(table: &Table, config: &BarplotConfig, options: &RenderOptions) -> Result<SceneGraph> {
    if table.depth() == 0 {
        bail!("Bar plot requires at least one index level");
    }
    if table.is_empty() {
        bail!("Cannot create bar chart with no data");
    }

    let partitions = table.partition_outer();
    let (nrow, ncol) = calculate_grid_dimensions(partitions.len(), config.subplots);
    tracing::debug!(panels = partitions.len(), nrow, ncol, "laying out subplots");

    let styles = config.styles();
    let mut shared = SharedAxisLabels::new();
    let mut panels: Vec<Option<PanelScene>> = vec![None; partitions.len()];

    for idx in label_order(partitions.len(), ncol, config.orientation) {
        let (key, sub_table) = &partitions[idx];
        let (row, col) = grid_cell(idx, ncol);
        let panel = build_panel(sub_table, key, row, col, config, &styles, &mut shared)
            .with_context(|| format!("Failed to lay out subplot '{}'", key.join(" / ")))?;
        panels[idx] = Some(panel);
    }

    Ok(SceneGraph {
        width: options.width,
        height: options.height,
        nrow,
        ncol,
        title: config.title.clone(),
        panels: panels.into_iter().flatten().collect(),
    })
}

/// Raw labels of one level, used as the de-duplication key
fn level_labels(table: &Table, config: &BarplotConfig, level: usize) -> BarplotResult<Vec<String>> {
    Ok(text_positions(table, config.bar_width, config.space_width, level)?
        .into_iter()
        .map(|(_, label)| label)
        .collect())
}

fn build_panel(
    table: &Table,
    key: &[String],
    row: usize,
    col: usize,
    config: &BarplotConfig,
    styles: &BarStyles,
    shared: &mut SharedAxisLabels,
) -> Result<PanelScene> {
    let orientation = config.orientation;
    let depth = table.depth();
    let cat_group = category_group(row, col, orientation);
    let val_group = value_group(row, col, orientation);

    let minor_labels = level_labels(table, config, depth - 1)?;
    let major_labels = if depth >= 2 {
        Some(level_labels(table, config, depth - 2)?)
    } else {
        None
    };

    let unique_minor_labels =
        config.unique_minor_labels && shared.is_emitted(cat_group, TickSet::Minor, &minor_labels);
    let unique_major_labels = config.unique_major_labels
        && major_labels
            .as_ref()
            .is_some_and(|labels| shared.is_emitted(cat_group, TickSet::Major, labels));
    let unique_data_label = config.unique_data_label && shared.data_label_emitted(val_group);

    let mut axes = AxesState::new();
    if let Some(name) = table.value_name() {
        axes.set_label(
            orientation.value_axis(),
            &sanitize_label(name, &config.custom_defaults),
        );
    }

    let options = LabelOptions {
        orientation,
        bar_width: config.bar_width,
        space_width: config.space_width,
        minor_rotation: config.minor_rotation,
        major_rotation: config.major_rotation,
        unique_minor_labels,
        unique_major_labels,
        unique_data_label,
        custom_defaults: &config.custom_defaults,
    };
    let layout = plot_bar_labels(&mut axes, table, &options)?;

    for level in layout.levels.iter().filter(|l| l.emitted) {
        if level.minor {
            shared.record(cat_group, TickSet::Minor, &minor_labels);
        } else if let Some(labels) = &major_labels {
            shared.record(cat_group, TickSet::Major, labels);
        }
    }
    if !unique_data_label {
        shared.record_data_label(val_group);
    }

    // Without outer levels the value column names the chart
    let top_index = if key.is_empty() {
        table.value_name().unwrap_or_default().to_string()
    } else {
        key.join(" / ")
    };
    let commands = plot_bars(
        table,
        config.bar_width,
        config.space_width,
        styles,
        &top_index,
        orientation,
    )?;

    let (x_range, y_range) = panel_ranges(table, config.bar_width, config.space_width, orientation);

    Ok(PanelScene {
        row,
        col,
        title: if key.is_empty() { None } else { Some(top_index) },
        orientation,
        x_range,
        y_range,
        axes,
        commands,
    })
}
