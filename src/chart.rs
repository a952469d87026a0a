use super::{min_and_max, Channel, SensorLog, DT_AXIS_FORMAT};
use chrono::prelude::*;
use plotters::coord::ranged1d::BoldPoints;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::error::Error;
use std::ops::Range;
use std::path::Path;
use tracing::debug;

pub const FIGURE_SIZE: (u32, u32) = (1200, 1000);
pub const FIGURE_TITLE: &str = "SCD41 Sensor Readings over Time";
pub const X_DESC: &str = "Date and Time";

/// height of the shared axis area below the last panel, rotated labels plus description
const X_LABEL_AREA: u32 = 170;
const Y_LABEL_AREA: u32 = 100;
/// same count on every panel so that the vertical grid lines line up
const X_LABELS: usize = 12;
const Y_LABELS: usize = 10;
/// pixels between the shared axis and the top of its labels
const TIME_LABEL_GAP: i32 = 6;

/// plotting rectangle of a panel, in backend pixels
pub type PixelRect = (Range<i32>, Range<i32>);

type DrawResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

impl Channel {
    /// line and marker colour of the panel
    pub fn color(self) -> RGBColor {
        match self {
            Channel::Co2 => RGBColor(0, 0, 255),
            Channel::Temperature => RGBColor(255, 0, 0),
            Channel::Humidity => RGBColor(0, 128, 0),
        }
    }
}

impl SensorLog {
    /// Plots the three channels to png, one panel each, stacked on a shared time axis.
    /// Overwrites `fout` if it exists.
    pub fn plot_png(&self, fout: &Path) -> DrawResult<()> {
        let root = BitMapBackend::new(fout, FIGURE_SIZE).into_drawing_area();
        self.draw_figure(&root)?;
        root.present()?;
        Ok(())
    }

    /// Draws the titled figure on `root`, returns the plotting rectangle of each panel
    pub fn draw_figure<DB>(&self, root: &DrawingArea<DB, Shift>) -> DrawResult<Vec<PixelRect>>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let xrange = time_range(&self.time).ok_or("no datetime to plot")?;
        debug!("time axis from {} to {}", xrange.start, xrange.end);

        root.fill(&WHITE)?;
        let body = root.titled(FIGURE_TITLE, ("sans-serif", 30))?;

        // equal plotting height for the panels, the last one also carries the shared axis
        let (_, h) = body.dim_in_pixel();
        let panel_h = (h.saturating_sub(X_LABEL_AREA) / 3) as i32;
        let (top, rest) = body.split_vertically(panel_h);
        let (middle, bottom) = rest.split_vertically(panel_h);

        let mut rects = Vec::with_capacity(3);
        for (area, &channel) in [top, middle, bottom].iter().zip(Channel::ALL.iter()) {
            let shared_axis = channel == Channel::Humidity;
            rects.push(draw_panel(
                area,
                &self.time,
                self.values(channel),
                channel,
                xrange.clone(),
                shared_axis,
            )?);
        }
        Ok(rects)
    }
}

/// Tick labels of the shared axis: a quarter turn clockwise, anchored so that
/// each label hangs below its tick instead of straddling the axis.
pub fn time_label_style() -> TextStyle<'static> {
    TextStyle::from(("sans-serif", 14).into_font())
        .transform(FontTransform::Rotate90)
        .pos(Pos::new(HPos::Left, VPos::Center))
}

/// Axis descriptions stay upright on the x axis, plotters turns the y ones.
pub fn axis_desc_style() -> TextStyle<'static> {
    TextStyle::from(("sans-serif", 16).into_font())
}

/// decimals needed to tell neighbouring y labels apart
pub fn y_label_decimals(yrange: &Range<f64>) -> usize {
    let ticks = RangedCoordf64::from(yrange.clone()).key_points(BoldPoints(Y_LABELS));
    let step = ticks
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(f64::INFINITY, f64::min);
    if !step.is_finite() || step <= 0. {
        return 1;
    }
    (-step.log10().floor()).max(0.) as usize
}

fn draw_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    time: &[NaiveDateTime],
    values: &[f64],
    channel: Channel,
    xrange: Range<DateTime<Utc>>,
    shared_axis: bool,
) -> DrawResult<PixelRect>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let yrange = value_range(values);
    let ybottom = yrange.start;
    let decimals = y_label_decimals(&yrange);
    let color = channel.color();
    let mut chart = ChartBuilder::on(area)
        .caption(channel.title(), ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(if shared_axis { X_LABEL_AREA } else { 0 })
        .y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(xrange, yrange)?;

    let xfmt = |x: &DateTime<Utc>| x.format(DT_AXIS_FORMAT).to_string();
    let yfmt = move |y: &f64| format!("{:.*}", decimals, y);
    {
        let mut mesh = chart.configure_mesh();
        mesh.light_line_style(&TRANSPARENT)
            .bold_line_style(RGBColor(200, 200, 200).stroke_width(1))
            .set_all_tick_mark_size(2)
            .label_style(("sans-serif", 14))
            .axis_desc_style(axis_desc_style())
            .y_desc(channel.y_desc())
            .x_labels(X_LABELS)
            .y_labels(Y_LABELS)
            .x_label_formatter(&xfmt)
            .y_label_formatter(&yfmt);
        if shared_axis {
            // ticks and description from the mesh, the rotated labels are drawn below
            let hidden = ("sans-serif", 14).into_font().color(&TRANSPARENT);
            mesh.x_label_style(hidden).x_desc(X_DESC);
        }
        mesh.draw()?;
    }

    if shared_axis {
        let style = time_label_style();
        let (ox, oy) = area.get_base_pixel();
        let ticks = chart.as_coord_spec().x_spec().key_points(BoldPoints(X_LABELS));
        for t in ticks {
            let (px, py) = chart.backend_coord(&(t, ybottom));
            area.draw_text(&xfmt(&t), &style, (px - ox, py - oy + TIME_LABEL_GAP))?;
        }
    }

    let points: Vec<(DateTime<Utc>, f64)> = time
        .iter()
        .zip(values.iter())
        .map(|(t, v)| (TimeZone::from_utc_datetime(&Utc, t), *v))
        .collect();
    // missing readings break the line
    for segment in points.split(|(_, v)| !v.is_finite()) {
        if segment.is_empty() {
            continue;
        }
        chart.draw_series(LineSeries::new(segment.iter().copied(), color.stroke_width(2)))?;
    }
    chart.draw_series(
        points
            .iter()
            .filter(|(_, v)| v.is_finite())
            .map(|&p| Circle::new(p, 4, color.filled())),
    )?;
    Ok(chart.plotting_area().get_pixel_range())
}

/// first to last datetime with a margin of 1/20 of the span on each side,
/// one hour on each side for a single instant
pub fn time_range(time: &[NaiveDateTime]) -> Option<Range<DateTime<Utc>>> {
    let (xmindt, xmaxdt) = min_and_max(time.iter().copied())?;
    let xspan: chrono::Duration = xmaxdt - xmindt;
    let xmargin = if xspan > chrono::Duration::zero() {
        xspan / 20
    } else {
        chrono::Duration::hours(1)
    };
    let xmin = TimeZone::from_utc_datetime(&Utc, &(xmindt - xmargin));
    let xmax = TimeZone::from_utc_datetime(&Utc, &(xmaxdt + xmargin));
    Some(xmin..xmax)
}

/// min to max of the finite values with a margin of 1/10 of the span
pub fn value_range(values: &[f64]) -> Range<f64> {
    match min_and_max(values.iter().copied().filter(|v| v.is_finite())) {
        None => 0.0..1.0,
        Some((ymin, ymax)) if ymin == ymax => ymin - 1.0..ymax + 1.0,
        Some((ymin, ymax)) => {
            let ymargin = (ymax - ymin) / 10.;
            ymin - ymargin..ymax + ymargin
        }
    }
}
