use anyhow::{bail, Context, Result};
use image::ImageEncoder;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;

use crate::axes::{Alignment, AxisState, TickDirection, TickState, TickStyle};
use crate::ir::{DrawCommand, PanelScene, SceneGraph};
use crate::ticks::Orientation;
use crate::OutputFormat;

/// Points to pixels for label font sizes
const FONT_SCALE: f64 = 1.3;
/// Approximate glyph width relative to the font size
const CHAR_WIDTH: f64 = 0.6;
/// Gap between a tick end and its label
const LABEL_PAD: f64 = 3.0;
/// Pixel distance between hatch lines for a single pattern character
const HATCH_SPACING: i32 = 8;
const VALUE_AREA_SIZE: u32 = 60;
/// Largest bitmap the PNG backend will allocate
const MAX_CANVAS_PIXELS: usize = 100_000_000;

type PanelChart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Render a scene graph to image bytes
pub fn render(scene: &SceneGraph, format: &OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Png => render_png(scene),
        OutputFormat::Svg => render_svg(scene),
    }
}

fn render_png(scene: &SceneGraph) -> Result<Vec<u8>> {
    let Some(len) = (scene.width as usize)
        .checked_mul(scene.height as usize)
        .filter(|&pixels| pixels <= MAX_CANVAS_PIXELS)
        .and_then(|pixels| pixels.checked_mul(3))
    else {
        bail!(
            "Failed to allocate canvas: {}x{} pixels is too large",
            scene.width,
            scene.height
        );
    };
    let mut buffer = vec![0u8; len];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (scene.width, scene.height))
            .into_drawing_area();
        draw_scene(&root, scene)?;
        root.present().context("Failed to present drawing")?;
    }

    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(&buffer, scene.width, scene.height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }

    Ok(png_bytes)
}

fn render_svg(scene: &SceneGraph) -> Result<Vec<u8>> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (scene.width, scene.height)).into_drawing_area();
        draw_scene(&root, scene)?;
        root.present().context("Failed to present drawing")?;
    }
    Ok(svg.into_bytes())
}

fn draw_scene<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, scene: &SceneGraph) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).context("Failed to fill background")?;

    let body = match &scene.title {
        Some(title) => root
            .titled(title, ("sans-serif", 24.0))
            .context("Failed to draw figure title")?,
        None => root.clone(),
    };

    let areas = body.split_evenly((scene.nrow, scene.ncol));
    for panel in &scene.panels {
        let idx = panel.row * scene.ncol + panel.col;
        if let Some(area) = areas.get(idx) {
            draw_panel(root, area, panel)
                .with_context(|| format!("Failed to draw panel {}", idx))?;
        }
    }
    Ok(())
}

/// Extent of a tick set's labels measured away from the axis line, in pixels
fn label_extent(ticks: &TickState, vertical: bool) -> f64 {
    let max_chars = ticks.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    if max_chars == 0 {
        return 0.0;
    }
    let size = ticks.style.label_size * FONT_SCALE;
    let rotated = ticks.style.label_rotation > 45.0;
    // along a vertical chart's x axis, rotated text runs away from the axis;
    // along a horizontal chart's y axis, unrotated text does
    if rotated == vertical {
        max_chars as f64 * size * CHAR_WIDTH
    } else {
        size * 1.2
    }
}

/// Part of a tick that sticks out of the plot area
fn outward_length(style: &TickStyle) -> f64 {
    match style.direction {
        TickDirection::Out => style.length,
        TickDirection::In => 0.0,
    }
}

/// Distance from the axis line to the major labels
fn major_label_offset(axis: &AxisState, vertical: bool) -> f64 {
    let minor_end = if axis.minor.labels.is_empty() {
        0.0
    } else {
        outward_length(&axis.minor.style) + LABEL_PAD + label_extent(&axis.minor, vertical)
    };
    outward_length(&axis.major.style).max(minor_end) + LABEL_PAD
}

fn category_area_size(axis: &AxisState, vertical: bool) -> u32 {
    let total = major_label_offset(axis, vertical) + label_extent(&axis.major, vertical) + 10.0;
    total.ceil().max(20.0) as u32
}

/// Text anchor of a tick label; alignment applies along the axis line
fn label_pos(align: Alignment, rotated: bool, vertical: bool) -> Pos {
    match (vertical, rotated) {
        (true, false) => {
            let h = match align {
                Alignment::Center => HPos::Center,
                Alignment::Start => HPos::Left,
                Alignment::End => HPos::Right,
            };
            Pos::new(h, VPos::Top)
        }
        (false, false) => {
            // y grows upwards, so the start of a tick sits below it
            let v = match align {
                Alignment::Center => VPos::Center,
                Alignment::Start => VPos::Bottom,
                Alignment::End => VPos::Top,
            };
            Pos::new(HPos::Right, v)
        }
        (true, true) => Pos::new(HPos::Right, VPos::Center),
        (false, true) => Pos::new(HPos::Center, VPos::Bottom),
    }
}

fn label_style(ticks: &TickState, vertical: bool) -> TextStyle<'static> {
    let rotated = ticks.style.label_rotation > 45.0;
    let style = TextStyle::from(("sans-serif", ticks.style.label_size * FONT_SCALE).into_font())
        .color(&BLACK)
        .pos(label_pos(ticks.align, rotated, vertical));
    if rotated {
        style.transform(FontTransform::Rotate270)
    } else {
        style
    }
}

/// Far end of a tick mark
fn tick_end(anchor: (i32, i32), style: &TickStyle, vertical: bool) -> (i32, i32) {
    match style.direction {
        TickDirection::Out => away_from_axis(anchor, style.length, vertical),
        TickDirection::In => away_from_axis(anchor, -style.length, vertical),
    }
}

/// Move `distance` pixels away from the axis line
fn away_from_axis(anchor: (i32, i32), distance: f64, vertical: bool) -> (i32, i32) {
    let d = distance.round() as i32;
    if vertical {
        (anchor.0, anchor.1 + d)
    } else {
        (anchor.0 - d, anchor.1)
    }
}

/// Draw tick marks and labels of one tick set
fn draw_tick_set<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    anchors: &[(i32, i32)],
    ticks: &TickState,
    label_offset: f64,
    vertical: bool,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let style = label_style(ticks, vertical);

    for (&anchor, (_, label)) in anchors.iter().zip(ticks.labeled()) {
        if ticks.style.width > 0.0 && ticks.style.length > 0.0 {
            let end = tick_end(anchor, &ticks.style, vertical);
            let stroke = (ticks.style.width.round() as u32).max(1);
            root.draw(&PathElement::new(vec![anchor, end], BLACK.stroke_width(stroke)))
                .context("Failed to draw tick")?;
        }

        if label.is_empty() {
            continue;
        }
        let at = away_from_axis(anchor, label_offset, vertical);
        root.draw(&Text::new(label.to_string(), at, style.clone()))
            .context("Failed to draw tick label")?;
    }
    Ok(())
}

fn draw_panel<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    area: &DrawingArea<DB, Shift>,
    panel: &PanelScene,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let vertical = panel.orientation == Orientation::Vertical;
    let category_axis = panel.axes.axis(panel.orientation.category_axis());
    let value_axis = panel.axes.axis(panel.orientation.value_axis());

    let category_area = category_area_size(category_axis, vertical);
    let (x_area, y_area) = if vertical {
        (category_area, VALUE_AREA_SIZE)
    } else {
        (VALUE_AREA_SIZE, category_area)
    };

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .caption(panel.title.as_deref().unwrap_or(""), ("sans-serif", 16))
        .x_label_area_size(x_area)
        .y_label_area_size(y_area)
        .build_cartesian_2d(
            panel.x_range.0..panel.x_range.1,
            panel.y_range.0..panel.y_range.1,
        )
        .context("Failed to build chart")?;

    let nbins = value_axis.nbins.unwrap_or(5);
    let value_desc = value_axis.label.clone().unwrap_or_default();
    let value_formatter = |v: &f64| value_axis.format_value(*v);
    if vertical {
        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_x_axis()
            .y_labels(nbins)
            .y_label_formatter(&value_formatter)
            .y_desc(value_desc)
            .draw()
            .context("Failed to draw mesh")?;
    } else {
        chart
            .configure_mesh()
            .disable_y_mesh()
            .disable_y_axis()
            .x_labels(nbins)
            .x_label_formatter(&value_formatter)
            .x_desc(value_desc)
            .draw()
            .context("Failed to draw mesh")?;
    }

    for command in &panel.commands {
        draw_command(root, &mut chart, command)?;
    }

    // Categorical axis line and ticks
    let (baseline, span) = if vertical {
        (panel.y_range.0, panel.x_range)
    } else {
        (panel.x_range.0, panel.y_range)
    };
    let axis_points = if vertical {
        vec![(span.0, baseline), (span.1, baseline)]
    } else {
        vec![(baseline, span.0), (baseline, span.1)]
    };
    chart
        .draw_series(std::iter::once(PathElement::new(axis_points, BLACK.stroke_width(1))))
        .context("Failed to draw category axis")?;

    let anchors = |ticks: &TickState| -> Vec<(i32, i32)> {
        ticks
            .positions
            .iter()
            .map(|&p| {
                let coord = if vertical { (p, baseline) } else { (baseline, p) };
                chart.backend_coord(&coord)
            })
            .collect()
    };

    let minor = &category_axis.minor;
    let minor_offset = outward_length(&minor.style) + LABEL_PAD;
    draw_tick_set(root, &anchors(minor), minor, minor_offset, vertical)?;

    let major = &category_axis.major;
    let major_offset = major_label_offset(category_axis, vertical);
    draw_tick_set(root, &anchors(major), major, major_offset, vertical)?;

    Ok(())
}

fn draw_command<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &mut PanelChart<'_, DB>,
    command: &DrawCommand,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    match command {
        DrawCommand::DrawRect { tl, br, style } => {
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [*tl, *br],
                    style.color.mix(style.alpha).filled(),
                )))
                .context("Failed to draw bar")?;

            if let Some(pattern) = &style.hatch {
                let (ax, ay) = chart.backend_coord(tl);
                let (bx, by) = chart.backend_coord(br);
                let rect = (ax.min(bx), ay.min(by), ax.max(bx), ay.max(by));
                for (from, to) in hatch_segments(rect, pattern) {
                    root.draw(&PathElement::new(vec![from, to], BLACK.mix(0.6).stroke_width(1)))
                        .context("Failed to draw hatch")?;
                }
            }
        }
        DrawCommand::DrawLine { points, color, width } => {
            chart
                .draw_series(std::iter::once(PathElement::new(
                    points.clone(),
                    color.stroke_width(*width),
                )))
                .context("Failed to draw line")?;
        }
    }
    Ok(())
}

/// Line segments filling a pixel rectangle `(x0, y0, x1, y1)` with a hatch pattern.
///
/// Supports `/`, `\`, `-`, `|`, `+` (both straight) and `x` (both diagonal);
/// repeating a character makes the lines denser.
pub fn hatch_segments(rect: (i32, i32, i32, i32), pattern: &str) -> Vec<((i32, i32), (i32, i32))> {
    let (x0, y0, x1, y1) = rect;
    let count = |targets: &[char]| pattern.chars().filter(|c| targets.contains(c)).count() as i32;

    for c in pattern.chars() {
        if !matches!(c, '/' | '\\' | '-' | '|' | '+' | 'x') {
            tracing::warn!(pattern, character = %c, "ignoring unsupported hatch character");
        }
    }

    let mut segments = Vec::new();
    let spacing = |n: i32| (HATCH_SPACING / n).max(2) as usize;

    let horizontal = count(&['-', '+']);
    if horizontal > 0 {
        for y in (y0..=y1).step_by(spacing(horizontal)) {
            segments.push(((x0, y), (x1, y)));
        }
    }

    let vertical = count(&['|', '+']);
    if vertical > 0 {
        for x in (x0..=x1).step_by(spacing(vertical)) {
            segments.push(((x, y0), (x, y1)));
        }
    }

    // y = c - x, rising to the right on screen
    let rising = count(&['/', 'x']);
    if rising > 0 {
        for c in (x0 + y0..=x1 + y1).step_by(spacing(rising)) {
            let xa = x0.max(c - y1);
            let xb = x1.min(c - y0);
            if xa <= xb {
                segments.push(((xa, c - xa), (xb, c - xb)));
            }
        }
    }

    // y = x + c, falling to the right on screen
    let falling = count(&['\\', 'x']);
    if falling > 0 {
        for c in (y0 - x1..=y1 - x0).step_by(spacing(falling)) {
            let xa = x0.max(y0 - c);
            let xb = x1.min(y1 - c);
            if xa <= xb {
                segments.push(((xa, xa + c), (xb, xb + c)));
            }
        }
    }

    segments
}
