//! Draw a [`TrainingHistory`] as a row of plot areas, one per metric,
//! each showing the training and validation curves against the epochs.

use std::path::Path;
use log::{debug, info};
use crate::{Axes, Error, Figure, history::{Metric, TrainingHistory}};

/// File written by the `training-curves` binary, relative to the
/// working directory.
pub const OUTPUT_PATH: &str = "plot.jpg";

/// Presentation settings of the figure.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    /// (width, height) in inches.
    pub figsize: (f64, f64),
    pub x_label: String,
    /// Legend placement, as understood by Matplotlib.
    pub legend_loc: String,
    /// Font size of the legend entries, in points.
    pub legend_font_size: f64,
    /// Padding around and between the plot areas, as a fraction of
    /// the font size.
    pub layout_pad: f64,
}

impl Default for Style {
    fn default() -> Self {
        Style {
            figsize: (8., 6.),
            x_label: "Epochs".into(),
            legend_loc: "best".into(),
            legend_font_size: 15.,
            layout_pad: 0.5,
        }
    }
}

/// Build the figure for `history`: one plot area for the accuracy and
/// one for the loss, side by side.
pub fn draw(history: &TrainingHistory, style: &Style)
            -> Result<Figure, Error> {
    history.validate()?;
    let epochs = history.epochs();
    info!("drawing {} epochs", epochs.len());
    let (fig, [[mut acc, mut loss]]) = crate::subplots(style.figsize)?;
    draw_metric(&mut acc, &epochs, &history.accuracy, style)?;
    draw_metric(&mut loss, &epochs, &history.loss, style)?;
    fig.tight_layout(style.layout_pad)?;
    Ok(fig)
}

fn draw_metric(ax: &mut Axes, epochs: &ndarray::Array1<f64>,
               metric: &Metric, style: &Style) -> Result<(), Error> {
    debug!("panel {:?}", metric.title);
    for curve in metric.curves() {
        ax.xy(epochs, &curve.values).label(&curve.label).plot()?;
    }
    ax.grid()?
        .set_xlabel(&style.x_label)?
        .set_title(&metric.title)?
        .legend(&style.legend_loc, style.legend_font_size)?;
    Ok(())
}

/// Draw `history` and write the figure to `path`, replacing any file
/// already there.  The format follows the extension of `path`.
pub fn render_to_file(history: &TrainingHistory, style: &Style,
                      path: impl AsRef<Path>) -> Result<(), Error> {
    let path = path.as_ref();
    let fig = draw(history, style)?;
    fig.save().to_file(path)?;
    info!("wrote {}", path.display());
    Ok(())
}
