//! Drawing-surface abstraction the label engine writes into.
//!
//! [`Axes`] mirrors the handful of axis mutations the engine needs. The
//! [`AxesState`] implementation simply records them; the renderer reads that
//! record back when drawing.

/// Which axis of a subplot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

/// Major or minor tick set of an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSet {
    Major,
    Minor,
}

/// Label anchoring relative to the tick position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Center,
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickDirection {
    In,
    #[default]
    Out,
}

/// Numeric tick label formatter
pub type TickFormatter = fn(f64) -> String;

/// Partial tick parameter update; `None` fields leave the current value alone.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickParams {
    pub label_size: Option<f64>,
    pub label_rotation: Option<f64>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub direction: Option<TickDirection>,
}

impl TickParams {
    fn merge_into(&self, style: &mut TickStyle) {
        if let Some(v) = self.label_size {
            style.label_size = v;
        }
        if let Some(v) = self.label_rotation {
            style.label_rotation = v;
        }
        if let Some(v) = self.length {
            style.length = v;
        }
        if let Some(v) = self.width {
            style.width = v;
        }
        if let Some(v) = self.direction {
            style.direction = v;
        }
    }
}

/// Mutations applied by the label engine
pub trait Axes {
    fn set_ticks(&mut self, axis: Axis, which: TickSet, positions: &[f64]);
    fn set_tick_labels(&mut self, axis: Axis, which: TickSet, labels: &[String], align: Alignment);
    fn tick_params(&mut self, axis: Axis, which: TickSet, params: TickParams);
    /// Number of bins for the automatic tick locator
    fn locator_params(&mut self, axis: Axis, nbins: usize);
    fn set_major_formatter(&mut self, axis: Axis, formatter: TickFormatter);
    fn set_label(&mut self, axis: Axis, text: &str);
}

/// Concrete tick style of one tick set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickStyle {
    pub label_size: f64,
    pub label_rotation: f64,
    pub length: f64,
    pub width: f64,
    pub direction: TickDirection,
}

impl TickStyle {
    fn major() -> Self {
        Self {
            label_size: 10.0,
            label_rotation: 0.0,
            length: 3.5,
            width: 0.8,
            direction: TickDirection::Out,
        }
    }

    fn minor() -> Self {
        Self {
            label_size: 9.0,
            label_rotation: 0.0,
            length: 2.0,
            width: 0.6,
            direction: TickDirection::Out,
        }
    }
}

/// Ticks, labels and style of one tick set
#[derive(Debug, Clone, PartialEq)]
pub struct TickState {
    pub positions: Vec<f64>,
    pub labels: Vec<String>,
    pub align: Alignment,
    pub style: TickStyle,
}

impl TickState {
    fn with_style(style: TickStyle) -> Self {
        Self {
            positions: Vec::new(),
            labels: Vec::new(),
            align: Alignment::Center,
            style,
        }
    }

    /// (position, label) pairs; unlabeled ticks get an empty label
    pub fn labeled(&self) -> impl Iterator<Item = (f64, &str)> {
        self.positions.iter().enumerate().map(move |(i, &p)| {
            (p, self.labels.get(i).map(String::as_str).unwrap_or(""))
        })
    }
}

/// Recorded state of one axis
#[derive(Debug, Clone)]
pub struct AxisState {
    pub major: TickState,
    pub minor: TickState,
    pub nbins: Option<usize>,
    pub formatter: Option<TickFormatter>,
    pub label: Option<String>,
}

impl Default for AxisState {
    fn default() -> Self {
        Self {
            major: TickState::with_style(TickStyle::major()),
            minor: TickState::with_style(TickStyle::minor()),
            nbins: None,
            formatter: None,
            label: None,
        }
    }
}

impl AxisState {
    pub fn ticks(&self, which: TickSet) -> &TickState {
        match which {
            TickSet::Major => &self.major,
            TickSet::Minor => &self.minor,
        }
    }

    fn ticks_mut(&mut self, which: TickSet) -> &mut TickState {
        match which {
            TickSet::Major => &mut self.major,
            TickSet::Minor => &mut self.minor,
        }
    }

    /// Format a numeric tick with the installed formatter, if any
    pub fn format_value(&self, value: f64) -> String {
        match self.formatter {
            Some(f) => f(value),
            None => value.to_string(),
        }
    }
}

/// In-memory [`Axes`] that records every mutation
#[derive(Debug, Clone, Default)]
pub struct AxesState {
    pub x: AxisState,
    pub y: AxisState,
}

impl AxesState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn axis(&self, axis: Axis) -> &AxisState {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }

    fn axis_mut(&mut self, axis: Axis) -> &mut AxisState {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        }
    }
}

impl Axes for AxesState {
    fn set_ticks(&mut self, axis: Axis, which: TickSet, positions: &[f64]) {
        let ticks = self.axis_mut(axis).ticks_mut(which);
        ticks.positions = positions.to_vec();
        ticks.labels.clear();
    }

    fn set_tick_labels(&mut self, axis: Axis, which: TickSet, labels: &[String], align: Alignment) {
        let ticks = self.axis_mut(axis).ticks_mut(which);
        ticks.labels = labels.to_vec();
        ticks.align = align;
    }

    fn tick_params(&mut self, axis: Axis, which: TickSet, params: TickParams) {
        params.merge_into(&mut self.axis_mut(axis).ticks_mut(which).style);
    }

    fn locator_params(&mut self, axis: Axis, nbins: usize) {
        self.axis_mut(axis).nbins = Some(nbins);
    }

    fn set_major_formatter(&mut self, axis: Axis, formatter: TickFormatter) {
        self.axis_mut(axis).formatter = Some(formatter);
    }

    fn set_label(&mut self, axis: Axis, text: &str) {
        self.axis_mut(axis).label = Some(text.to_string());
    }
}
