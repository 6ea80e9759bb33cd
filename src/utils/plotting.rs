use crate::config::RenderConfig;
use crate::error::{PriceSurfaceError, Result};
use crate::models::{PriceSurface, Viewpoint, ViewpointSequence};
use image::{ImageFormat, RgbImage};
use plotters::coord::ranged3d::Cartesian3d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_bitmap::BitMapBackend;
use rayon::prelude::*;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const DATE_AXIS_LABEL: &str = "Days from Due Date";
const WEIGHT_AXIS_LABEL: &str = "Birth Weight (lbs)";
const LOW_PRICE_LABEL: [&str; 2] = ["least expensive", "(least likely numbers)"];
const HIGH_PRICE_LABEL: [&str; 2] = ["most expensive", "(most likely numbers)"];

/// A frame written to the working directory
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFrame {
    /// Position in the bounce sequence, also the file name index
    pub index: usize,
    pub viewpoint: Viewpoint,
    pub path: PathBuf,
}

fn render_err<E: Display>(e: E) -> PriceSurfaceError {
    PriceSurfaceError::RenderError(e.to_string())
}

fn inferno(t: f64) -> RGBColor {
    let color = colorous::INFERNO.eval_continuous(t.clamp(0.0, 1.0));
    RGBColor(color.r, color.g, color.b)
}

/// Render every viewpoint of the sequence to `<frames_dir>/<prefix>NNN.png`.
///
/// Frames come back in sequence order whether or not they were rendered in parallel.
pub fn render_frames(
    surface: &PriceSurface,
    viewpoints: &ViewpointSequence,
    config: &RenderConfig,
) -> Result<Vec<RenderedFrame>> {
    fs::create_dir_all(&config.frames_dir)?;

    info!(
        "Rendering {} frames into {:?}",
        viewpoints.len(),
        config.frames_dir
    );

    let render_one = |(index, viewpoint): (usize, &Viewpoint)| -> Result<RenderedFrame> {
        let path = config.frame_path(index);
        let img = render_frame(surface, viewpoint, config)?;
        save_frame(&img, &path)?;
        debug!(
            "Frame {:03} azim {:.1} elev {:.1} -> {:?}",
            index, viewpoint.azimuth, viewpoint.elevation, path
        );
        Ok(RenderedFrame {
            index,
            viewpoint: *viewpoint,
            path,
        })
    };

    if config.parallel {
        viewpoints
            .views()
            .par_iter()
            .enumerate()
            .map(render_one)
            .collect()
    } else {
        viewpoints
            .views()
            .iter()
            .enumerate()
            .map(render_one)
            .collect()
    }
}

pub fn save_frame<P: AsRef<Path>>(img: &RgbImage, output_path: P) -> Result<()> {
    img.save_with_format(output_path.as_ref(), ImageFormat::Png)?;
    Ok(())
}

/// 3D plot of price vs. date deviation and weight, seen from `viewpoint`
pub fn render_frame(
    surface: &PriceSurface,
    viewpoint: &Viewpoint,
    config: &RenderConfig,
) -> Result<RgbImage> {
    let width = config.width;
    let height = config.height;
    let mut buffer = vec![0u8; (width * height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let legend_width = (width as f64 * 0.26) as u32;
        let (plot_area, legend_area) = root.split_horizontally((width - legend_width) as i32);

        draw_surface(&plot_area, surface, viewpoint)?;
        draw_color_bar(&legend_area)?;

        root.present().map_err(render_err)?;
    }

    RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| PriceSurfaceError::RenderError("Frame buffer size mismatch".to_string()))
}

type SurfaceChart<'a, 'b> = ChartContext<
    'a,
    BitMapBackend<'b>,
    Cartesian3d<RangedCoordf64, RangedCoordf64, RangedCoordf64>,
>;

/// Room kept between the projected data box and the plotting area edge for tick labels
const FIT_PADDING: i32 = 36;
const MAX_SCALE: f64 = 0.9;
const MIN_SCALE: f64 = 0.3;
const SCALE_STEP: f64 = 0.02;
/// Distance from a floor edge to its axis title, in pixels
const TITLE_OFFSET: f64 = 40.0;

/// One grid cell projected as a filled quad
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Face {
    pub corners: [(f64, f64, f64); 4],
    pub color: RGBColor,
    pub depth: i32,
}

/// All grid cells as quads in chart space, farthest first
pub(crate) fn surface_faces<F>(surface: &PriceSurface, depth: F) -> Vec<Face>
where
    F: Fn(f64, f64, f64) -> i32,
{
    let dates = &surface.grid.date_devs;
    let weights = &surface.grid.weights;
    let mut faces = Vec::with_capacity(surface.prices.len());

    for i in 0..weights.len().saturating_sub(1) {
        for j in 0..dates.len().saturating_sub(1) {
            let p00 = surface.at(i, j);
            let p01 = surface.at(i, j + 1);
            let p11 = surface.at(i + 1, j + 1);
            let p10 = surface.at(i + 1, j);
            let mean = 0.25 * (p00 + p01 + p11 + p10);
            faces.push(Face {
                corners: [
                    (weights[i], p00, dates[j]),
                    (weights[i], p01, dates[j + 1]),
                    (weights[i + 1], p11, dates[j + 1]),
                    (weights[i + 1], p10, dates[j]),
                ],
                color: inferno(surface.normalize(mean)),
                depth: depth(
                    0.5 * (weights[i] + weights[i + 1]),
                    mean,
                    0.5 * (dates[j] + dates[j + 1]),
                ),
            });
        }
    }

    // Painter's order: larger projected depth is farther from the camera
    faces.sort_by(|a, b| b.depth.cmp(&a.depth));
    faces
}

/// Floor corners at the minimum price, going around the rectangle.
/// Edges 0-1 and 2-3 run along the date axis.
fn floor_corners(surface: &PriceSurface) -> [(f64, f64, f64); 4] {
    let (d0, d1) = surface.grid.date_range();
    let (w0, w1) = surface.grid.weight_range();
    let p = surface.min_price;
    [(w0, p, d0), (w0, p, d1), (w1, p, d1), (w1, p, d0)]
}

fn box_corners(surface: &PriceSurface) -> [(f64, f64, f64); 8] {
    let floor = floor_corners(surface);
    let top = floor.map(|(w, _, d)| (w, surface.max_price, d));
    [
        floor[0], floor[1], floor[2], floor[3], top[0], top[1], top[2], top[3],
    ]
}

pub(crate) fn build_chart<'a, 'b>(
    area: &'a DrawingArea<BitMapBackend<'b>, Shift>,
    surface: &PriceSurface,
) -> Result<SurfaceChart<'a, 'b>> {
    let (date_min, date_max) = surface.grid.date_range();
    let (weight_min, weight_max) = surface.grid.weight_range();

    // Plotters is y-up: x = weight, y = price, z = date deviation.
    // (weight, price, date) keeps the same handedness as (date, weight, price).
    ChartBuilder::on(area)
        .margin(10)
        .build_cartesian_3d(
            weight_min..weight_max,
            surface.min_price..surface.max_price,
            date_min..date_max,
        )
        .map_err(render_err)
}

/// Matplotlib-style camera: at azimuth 0 the viewer sits on the positive date
/// side with weight increasing to the right, and positive azimuth turns the
/// viewer toward positive weight.
fn set_projection(chart: &mut SurfaceChart<'_, '_>, viewpoint: &Viewpoint, scale: f64) {
    chart.with_projection(|mut pb| {
        pb.yaw = viewpoint.azimuth.to_radians();
        pb.pitch = viewpoint.elevation.to_radians();
        pb.scale = scale;
        pb.into_matrix()
    });
}

/// Apply the largest projection scale at which the whole data box, peak
/// included, stays inside the padded plotting area. Returns that scale.
pub(crate) fn fit_projection(
    chart: &mut SurfaceChart<'_, '_>,
    surface: &PriceSurface,
    viewpoint: &Viewpoint,
) -> f64 {
    let corners = box_corners(surface);
    let mut scale = MAX_SCALE;
    loop {
        set_projection(chart, viewpoint, scale);
        let area = chart.plotting_area();
        let (x_range, y_range) = area.get_pixel_range();
        let fits = corners.iter().all(|corner| {
            let (x, y) = area.map_coordinate(corner);
            x >= x_range.start + FIT_PADDING
                && x <= x_range.end - FIT_PADDING
                && y >= y_range.start + FIT_PADDING
                && y <= y_range.end - FIT_PADDING
        });
        if fits || scale - SCALE_STEP < MIN_SCALE {
            return scale;
        }
        scale -= SCALE_STEP;
    }
}

/// Point `offset` pixels out from the midpoint of screen edge `a`-`b`, on the
/// side away from `center`.
pub(crate) fn title_anchor(
    a: (f64, f64),
    b: (f64, f64),
    center: (f64, f64),
    offset: f64,
) -> (f64, f64) {
    let mid = (0.5 * (a.0 + b.0), 0.5 * (a.1 + b.1));
    let away = (mid.0 - center.0, mid.1 - center.1);
    let mut normal = (-(b.1 - a.1), b.0 - a.0);
    let len = normal.0.hypot(normal.1);
    if len < 1e-9 {
        // Edge seen end-on
        let away_len = away.0.hypot(away.1).max(1e-9);
        normal = (away.0 / away_len, away.1 / away_len);
    } else {
        normal = (normal.0 / len, normal.1 / len);
        if normal.0 * away.0 + normal.1 * away.1 < 0.0 {
            normal = (-normal.0, -normal.1);
        }
    }
    (mid.0 + normal.0 * offset, mid.1 + normal.1 * offset)
}

fn draw_surface(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    surface: &PriceSurface,
    viewpoint: &Viewpoint,
) -> Result<()> {
    let mut chart = build_chart(area, surface)?;
    let scale = fit_projection(&mut chart, surface, viewpoint);
    debug!(
        "azim {:.1} elev {:.1} fitted at scale {:.2}",
        viewpoint.azimuth, viewpoint.elevation, scale
    );

    chart
        .configure_axes()
        .light_grid_style(BLACK.mix(0.1))
        .max_light_lines(3)
        .label_style(("sans-serif", 11))
        .x_labels(5)
        .z_labels(5)
        .y_labels(2)
        .x_formatter(&|v: &f64| format!("{:.1}", v))
        .z_formatter(&|v: &f64| format!("{:.0}", v))
        .y_formatter(&|_: &f64| String::new())
        .draw()
        .map_err(render_err)?;

    let faces = {
        let coord = chart.as_coord_spec();
        surface_faces(surface, |x, y, z| coord.projected_depth(&x, &y, &z))
    };

    chart
        .draw_series(
            faces
                .iter()
                .map(|face| Polygon::new(face.corners.to_vec(), face.color.filled())),
        )
        .map_err(render_err)?;

    let floor = floor_corners(surface);
    let screen: Vec<(f64, f64)> = {
        let plotting_area = chart.plotting_area();
        floor
            .iter()
            .map(|corner| {
                let (x, y) = plotting_area.map_coordinate(corner);
                (x as f64, y as f64)
            })
            .collect()
    };
    // Front is lowest on screen, back is highest
    let front = (0..4)
        .max_by(|&a, &b| screen[a].1.total_cmp(&screen[b].1))
        .unwrap_or(0);
    let back = (front + 2) % 4;

    // Qualitative price ticks on the leftmost side corner
    let side = [(front + 1) % 4, (front + 3) % 4]
        .into_iter()
        .min_by(|&a, &b| screen[a].0.total_cmp(&screen[b].0))
        .unwrap_or(back);
    let (edge_weight, _, edge_date) = floor[side];

    let span = surface.max_price - surface.min_price;
    let tick_style = TextStyle::from(("sans-serif", 14).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Right, VPos::Center));
    let ticks = [
        ("$", surface.min_price + 0.05 * span),
        ("$$$", surface.max_price - 0.05 * span),
    ];
    chart
        .draw_series(ticks.iter().map(|&(label, price)| {
            EmptyElement::at((edge_weight, price, edge_date))
                + PathElement::new(vec![(0, 0), (-6, 0)], &BLACK)
                + Text::new(label, (-10, 0), tick_style.clone())
        }))
        .map_err(render_err)?;

    // Axis titles outside the two floor edges that meet at the front corner
    let center = (
        screen.iter().map(|p| p.0).sum::<f64>() / 4.0,
        screen.iter().map(|p| p.1).sum::<f64>() / 4.0,
    );
    let (date_neighbor, weight_neighbor) = if front % 2 == 0 {
        (front + 1, (front + 3) % 4)
    } else {
        (front - 1, (front + 1) % 4)
    };
    let titles = [
        (
            DATE_AXIS_LABEL,
            title_anchor(screen[front], screen[date_neighbor], center, TITLE_OFFSET),
        ),
        (
            WEIGHT_AXIS_LABEL,
            title_anchor(screen[front], screen[weight_neighbor], center, TITLE_OFFSET),
        ),
    ];

    let title_style = TextStyle::from(("sans-serif", 13).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    let (base_x, base_y) = area.get_base_pixel();
    let (area_width, area_height) = area.dim_in_pixel();
    for (label, (x, y)) in titles {
        let (text_width, text_height) = area
            .estimate_text_size(label, &title_style)
            .map_err(render_err)?;
        let half_w = (text_width / 2 + 2) as i32;
        let half_h = (text_height / 2 + 2) as i32;
        // Keep the whole title on the plot area
        let max_x = (area_width as i32 - half_w).max(half_w);
        let max_y = (area_height as i32 - half_h).max(half_h);
        let x = (x.round() as i32 - base_x).clamp(half_w, max_x);
        let y = (y.round() as i32 - base_y).clamp(half_h, max_y);
        area.draw_text(label, &title_style, (x, y))
            .map_err(render_err)?;
    }

    Ok(())
}

/// Vertical inferno gradient with the two price extremes labelled
fn draw_color_bar(area: &DrawingArea<BitMapBackend<'_>, Shift>) -> Result<()> {
    let (_, area_height) = area.dim_in_pixel();
    let bar_width = 18;
    let bar_height = (area_height as f64 * 0.6) as i32;
    let bar_x = 8;
    let bar_y = (area_height as i32 - bar_height) / 2;

    for i in 0..bar_height {
        let normalized_pos = 1.0 - (i as f64 / bar_height as f64);
        area.draw(&Rectangle::new(
            [(bar_x, bar_y + i), (bar_x + bar_width, bar_y + i + 1)],
            inferno(normalized_pos).filled(),
        ))
        .map_err(render_err)?;
    }

    area.draw(&Rectangle::new(
        [(bar_x, bar_y), (bar_x + bar_width, bar_y + bar_height)],
        BLACK.stroke_width(1),
    ))
    .map_err(render_err)?;

    let label_x = bar_x + bar_width + 6;
    let label_style = TextStyle::from(("sans-serif", 10).into_font()).color(&BLACK);

    for (line, text) in HIGH_PRICE_LABEL.iter().enumerate() {
        area.draw_text(text, &label_style, (label_x, bar_y + 12 * line as i32))
            .map_err(render_err)?;
    }
    for (line, text) in LOW_PRICE_LABEL.iter().enumerate() {
        area.draw_text(
            text,
            &label_style,
            (label_x, bar_y + bar_height - 24 + 12 * line as i32),
        )
        .map_err(render_err)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use approx::assert_abs_diff_eq;

    // Plot area of a default 700 x 500 frame
    const PLOT_WIDTH: u32 = 700 - 182;
    const PLOT_HEIGHT: u32 = 500;

    fn default_surface() -> (Config, PriceSurface) {
        let config = Config::default();
        let surface = PriceSurface::evaluate(&config.pricing, &config.grid);
        (config, surface)
    }

    fn plot_buffer() -> Vec<u8> {
        vec![0u8; (PLOT_WIDTH * PLOT_HEIGHT * 3) as usize]
    }

    #[test]
    fn faces_cover_every_cell_far_to_near() {
        let (config, surface) = default_surface();
        let faces = surface_faces(&surface, |w, p, d| (10.0 * d - 3.0 * w + p) as i32);

        let cells = (config.grid.weight_samples - 1) * (config.grid.date_samples - 1);
        assert_eq!(faces.len(), cells);
        assert!(faces.windows(2).all(|pair| pair[0].depth >= pair[1].depth));
    }

    #[test]
    fn projected_faces_are_sorted_by_chart_depth() {
        let (config, surface) = default_surface();
        let mut buffer = plot_buffer();
        let root = BitMapBackend::with_buffer(&mut buffer, (PLOT_WIDTH, PLOT_HEIGHT))
            .into_drawing_area();
        let mut chart = build_chart(&root, &surface).unwrap();
        let view = Viewpoint {
            azimuth: 30.0,
            elevation: 40.0,
        };
        fit_projection(&mut chart, &surface, &view);

        let coord = chart.as_coord_spec();
        let faces = surface_faces(&surface, |x, y, z| coord.projected_depth(&x, &y, &z));

        assert_eq!(
            faces.len(),
            (config.grid.weight_samples - 1) * (config.grid.date_samples - 1)
        );
        assert!(faces.windows(2).all(|pair| pair[0].depth >= pair[1].depth));
        assert!(faces.first().unwrap().depth > faces.last().unwrap().depth);
    }

    #[test]
    fn fitted_box_stays_inside_plot_for_every_view() {
        let (config, surface) = default_surface();
        let mut buffer = plot_buffer();
        let root = BitMapBackend::with_buffer(&mut buffer, (PLOT_WIDTH, PLOT_HEIGHT))
            .into_drawing_area();
        let mut chart = build_chart(&root, &surface).unwrap();

        for view in ViewpointSequence::new(&config.camera).views() {
            let scale = fit_projection(&mut chart, &surface, view);
            assert!(scale > MIN_SCALE, "no fit for {:?}", view);

            let area = chart.plotting_area();
            let (x_range, y_range) = area.get_pixel_range();
            for corner in box_corners(&surface) {
                let (x, y) = area.map_coordinate(&corner);
                assert!(
                    x - x_range.start >= FIT_PADDING && x_range.end - x >= FIT_PADDING,
                    "x {} outside {:?} for {:?}",
                    x,
                    x_range,
                    view
                );
                assert!(
                    y - y_range.start >= FIT_PADDING && y_range.end - y >= FIT_PADDING,
                    "y {} outside {:?} for {:?}",
                    y,
                    y_range,
                    view
                );
            }
        }
    }

    #[test]
    fn azimuth_follows_matplotlib_convention() {
        let (_, surface) = default_surface();
        let mut buffer = plot_buffer();
        let root = BitMapBackend::with_buffer(&mut buffer, (PLOT_WIDTH, PLOT_HEIGHT))
            .into_drawing_area();
        let mut chart = build_chart(&root, &surface).unwrap();
        let (d0, d1) = surface.grid.date_range();
        let (w0, w1) = surface.grid.weight_range();
        let p = surface.min_price;

        // Azimuth 0: viewer on the positive date side, weight runs to the right
        set_projection(&mut chart, &Viewpoint { azimuth: 0.0, elevation: 0.0 }, 0.5);
        let area = chart.plotting_area();
        let coord = chart.as_coord_spec();
        let (date_near, _) = area.map_coordinate(&(w0, p, d1));
        let (date_far, _) = area.map_coordinate(&(w0, p, d0));
        assert!((date_near - date_far).abs() <= 1);
        assert!(coord.projected_depth(&w0, &p, &d1) < coord.projected_depth(&w0, &p, &d0));
        let (light, _) = area.map_coordinate(&(w0, p, d0));
        let (heavy, _) = area.map_coordinate(&(w1, p, d0));
        assert!(heavy - light > 100);

        // Azimuth 90: viewer on the heavy side, later dates run to the left
        set_projection(&mut chart, &Viewpoint { azimuth: 90.0, elevation: 0.0 }, 0.5);
        let area = chart.plotting_area();
        let coord = chart.as_coord_spec();
        let (light, _) = area.map_coordinate(&(w0, p, d0));
        let (heavy, _) = area.map_coordinate(&(w1, p, d0));
        assert!((heavy - light).abs() <= 1);
        assert!(coord.projected_depth(&w1, &p, &d0) < coord.projected_depth(&w0, &p, &d0));
        let (early, _) = area.map_coordinate(&(w0, p, d0));
        let (late, _) = area.map_coordinate(&(w0, p, d1));
        assert!(early - late > 100);
    }

    #[test]
    fn positive_elevation_looks_from_above() {
        let (_, surface) = default_surface();
        let mut buffer = plot_buffer();
        let root = BitMapBackend::with_buffer(&mut buffer, (PLOT_WIDTH, PLOT_HEIGHT))
            .into_drawing_area();
        let mut chart = build_chart(&root, &surface).unwrap();
        set_projection(&mut chart, &Viewpoint { azimuth: 0.0, elevation: 45.0 }, 0.5);

        let coord = chart.as_coord_spec();
        let (w, d) = (7.6, 0.0);
        assert!(
            coord.projected_depth(&w, &surface.max_price, &d)
                < coord.projected_depth(&w, &surface.min_price, &d)
        );
    }

    #[test]
    fn title_anchor_sits_outside_the_floor() {
        let center = (100.0, 100.0);
        // Bottom edge of a square floor, written in either direction
        for (a, b) in [((50.0, 150.0), (150.0, 150.0)), ((150.0, 150.0), (50.0, 150.0))] {
            let (x, y) = title_anchor(a, b, center, 40.0);
            assert_abs_diff_eq!(x, 100.0, epsilon = 1e-9);
            assert_abs_diff_eq!(y, 190.0, epsilon = 1e-9);
        }

        // Left edge
        let (x, y) = title_anchor((50.0, 50.0), (50.0, 150.0), center, 40.0);
        assert_abs_diff_eq!(x, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(y, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn title_anchor_handles_edge_seen_end_on() {
        let (x, y) = title_anchor((130.0, 100.0), (130.0, 100.0), (100.0, 100.0), 40.0);
        assert_abs_diff_eq!(x, 170.0, epsilon = 1e-9);
        assert_abs_diff_eq!(y, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn inferno_runs_dark_to_bright() {
        let low = inferno(0.0);
        let high = inferno(1.0);
        let luma = |c: RGBColor| c.0 as u32 + c.1 as u32 + c.2 as u32;
        assert!(luma(low) < luma(high));
        assert_eq!(inferno(-0.5), low);
        assert_eq!(inferno(1.5), high);
    }
}
