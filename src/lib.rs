//! Plot the accuracy and loss recorded over the epochs of a training
//! run with [Matplotlib][].
//!
//! Usage
//! -----
//!
//! The crate is made of two layers.  At the bottom sits a small
//! binding to Matplotlib's explicit interface ([`Figure`], [`Axes`],
//! [`Line2D`]) keeping a Rust flavor: every call returns a
//! [`Result`] instead of raising.  On top of it, [`history`] holds the
//! recorded curves and [`render`] draws them as a two-panel figure.
//!
//! ```no_run
//! use training_curves::{history::TrainingHistory, render};
//! let history = TrainingHistory::recorded();
//! render::render_to_file(&history, &render::Style::default(),
//!                        render::OUTPUT_PATH)?;
//! # Ok::<(), training_curves::Error>(())
//! ```
//!
//! [Matplotlib]: https://matplotlib.org/

use std::path::Path;
use lazy_static::lazy_static;
use log::debug;
use ndarray::{ArrayBase, Ix1};
use numpy::{PyArray1, PyArray2, PyArrayMethods, ToPyArray};
use pyo3::{
    prelude::*,
    intern,
    exceptions::{PyFileNotFoundError, PyPermissionError},
    types::PyDict,
};

pub mod history;
pub mod render;

#[cfg(doctest)]
doc_comment::doctest!("../README.md");

macro_rules! meth {
    ($obj: expr, $m: ident, $py: ident -> $args: expr, $kwargs: expr) => {
        $obj.bind($py)
            .call_method(intern!($py, stringify!($m)), $args, Some($kwargs))
    };
    ($obj: expr, $m: ident, $py: ident -> $args: expr) => {
        $obj.bind($py).call_method1(intern!($py, stringify!($m)), $args)
    };
    ($obj: expr, $m: ident, $py: ident) => {
        $obj.bind($py).call_method0(intern!($py, stringify!($m)))
    };
}

/// Possible errors of the plotting functions.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The Python library "matplotlib" was not found.
    #[error("The matplotlib library has not been found.\n\
             Please install it.  See https://matplotlib.org/")]
    NoMatplotlib,
    /// The path contains an element that is not a directory or does
    /// not exist.
    #[error("A path contains an element that is not a directory or \
             does not exist")]
    FileNotFoundError,
    /// Permission denied to access or create the filesystem path.
    #[error("Permission denied to access or create the filesystem path")]
    PermissionError,
    /// A curve does not have one value per epoch.
    #[error("curve {label:?} has {found} values but there are {expected} \
             epochs")]
    LengthMismatch { label: String, expected: usize, found: usize },
    /// Matplotlib returned a grid of axes of an unexpected shape.
    #[error("expected a {rows}×{cols} grid of axes")]
    UnexpectedLayout { rows: usize, cols: usize },
    /// Other Python errors.
    #[error("Python error: {0}")]
    Python(#[from] PyErr),
}

/// Import and return a handle to the module `$m`.
macro_rules! pyimport { ($m: literal) => {
    Python::with_gil(|py| PyModule::import_bound(py, $m).map(Bound::unbind))
}}

lazy_static! {
    static ref FIGURE: Result<Py<PyModule>, PyErr> = {
        pyimport!("matplotlib.figure")
    };
}

/// Return a handle to the module `$m`.
/// ⚠ This may try to lock Python's GIL.  Make sure it is executed
/// outside a call to `Python::with_gil`.
macro_rules! pymod { ($m: ident) => {
    $m.as_ref().map_err(|_| Error::NoMatplotlib)
}}


/// Trait expressing that `Self` can be copied into a one dimensional
/// `numpy.ndarray` of floats.
pub trait Data {
    fn to_numpy<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>>;
}

impl Data for [f64] {
    fn to_numpy<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        PyArray1::from_slice_bound(py, self)
    }
}

impl Data for Vec<f64> {
    fn to_numpy<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.as_slice().to_numpy(py)
    }
}

impl<const N: usize> Data for [f64; N] {
    fn to_numpy<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.as_slice().to_numpy(py)
    }
}

impl<S> Data for ArrayBase<S, Ix1>
where S: ndarray::Data<Elem = f64> {
    fn to_numpy<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.to_pyarray_bound(py)
    }
}

/// A single plot area of a [`Figure`].
#[derive(Debug, Clone)]
pub struct Axes {
    ax: PyObject,
}

/// The top level container for all the plot elements.
#[derive(Debug)]
pub struct Figure {
    fig: PyObject, // instance of matplotlib.figure.Figure
}

/// A line drawn on some [`Axes`].
#[derive(Debug, Clone)]
pub struct Line2D {
    line: PyObject,
}

impl Figure {
    /// Return a new `Figure` of size `figsize` = (width, height) in
    /// inches.
    ///
    /// The figure is not registered with pyplot, so it needs no GUI
    /// backend and is released when dropped.
    pub fn new(figsize: (f64, f64)) -> Result<Figure, Error> {
        let figure = pymod!(FIGURE)?;
        Python::with_gil(|py| {
            let kwargs = PyDict::new_bound(py);
            kwargs.set_item("figsize", figsize)?;
            let fig = figure.bind(py).getattr(intern!(py, "Figure"))?
                .call((), Some(&kwargs))?;
            Ok(Figure { fig: fig.unbind() })
        })
    }

    /// Add a grid of `R` × `C` axes to the figure and return them.
    pub fn subplots<const R: usize, const C: usize>(
        &self) -> Result<[[Axes; C]; R], Error> {
        let layout = || Error::UnexpectedLayout { rows: R, cols: C };
        Python::with_gil(|py| {
            let kwargs = PyDict::new_bound(py);
            // Always get a 2D array back, whatever `R` and `C` are.
            kwargs.set_item("squeeze", false)?;
            let axs = meth!(self.fig, subplots, py -> (R, C), &kwargs)?;
            let axg = axs.downcast::<PyArray2<PyObject>>()
                .map_err(PyErr::from)?;
            let rows = (0 .. R).map(|r| -> Result<[Axes; C], Error> {
                let row = (0 .. C)
                    .map(|c| axg.get_owned([r, c])
                         .map(|ax| Axes { ax })
                         .ok_or_else(layout))
                    .collect::<Result<Vec<_>, _>>()?;
                row.try_into().map_err(|_| layout())
            }).collect::<Result<Vec<[Axes; C]>, Error>>()?;
            rows.try_into().map_err(|_| layout())
        })
    }

    /// Return all the axes of the figure, in the order they were added.
    pub fn axes(&self) -> Result<Vec<Axes>, Error> {
        Python::with_gil(|py| {
            self.fig.bind(py).getattr(intern!(py, "axes"))?.iter()?
                .map(|ax| -> Result<Axes, Error> {
                    Ok(Axes { ax: ax?.unbind() }) })
                .collect()
        })
    }

    /// Adjust the padding between and around the subplots.  `pad` is
    /// expressed as a fraction of the font size.
    pub fn tight_layout(&self, pad: f64) -> Result<&Self, Error> {
        Python::with_gil(|py| {
            let kwargs = PyDict::new_bound(py);
            kwargs.set_item("pad", pad)?;
            meth!(self.fig, tight_layout, py -> (), &kwargs)?;
            Ok::<_, Error>(())
        })?;
        Ok(self)
    }

    pub fn save(&self) -> Savefig<'_> {
        Savefig { fig: self }
    }
}

/// Writes a [`Figure`] to a file.
pub struct Savefig<'a> {
    fig: &'a Figure,
}

impl<'a> Savefig<'a> {
    /// Write the figure to `path`, overwriting any existing file.  The
    /// image format is deduced from the extension of `path`.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        debug!("savefig {}", path.display());
        Python::with_gil(|py| {
            meth!(self.fig.fig, savefig, py -> (path,))
                .map_err(|e| {
                    if e.is_instance_of::<PyFileNotFoundError>(py) {
                        Error::FileNotFoundError
                    } else if e.is_instance_of::<PyPermissionError>(py) {
                        Error::PermissionError
                    } else {
                        Error::Python(e)
                    }
                })?;
            Ok(())
        })
    }
}


/// Return a new figure of size `figsize` (in inches) together with a
/// grid of `R` × `C` axes.
///
/// # Example
///
/// ```no_run
/// let (fig, [[mut acc, mut loss]]) = training_curves::subplots((8., 6.))?;
/// acc.xy(&[0., 1., 2.], &[0.5, 0.8, 0.9]).label("Train").plot()?;
/// loss.xy(&[0., 1., 2.], &[2.0, 1.1, 0.7]).label("Train").plot()?;
/// fig.save().to_file("target/subplots.pdf")?;
/// # Ok::<(), training_curves::Error>(())
/// ```
pub fn subplots<const R: usize, const C: usize>(
    figsize: (f64, f64)) -> Result<(Figure, [[Axes; C]; R]), Error> {
    let fig = Figure::new(figsize)?;
    let ax = fig.subplots()?;
    Ok((fig, ax))
}


impl Axes {
    /// Plot `y` versus `x` as a line.
    ///
    /// The chain leading to [`XY::plot`] starts with the data so that
    /// options may be set in between.  `self` is mutably borrowed to
    /// reflect that the final `.plot()` mutates the Python object.
    #[must_use]
    pub fn xy<'a, X, Y>(&'a mut self, x: &'a X, y: &'a Y) -> XY<'a, X, Y>
    where X: Data + ?Sized,
          Y: Data + ?Sized {
        XY { axes: self, x, y, label: "" }
    }

    pub fn set_title(&mut self, v: &str) -> Result<&mut Self, Error> {
        Python::with_gil(|py| {
            meth!(self.ax, set_title, py -> (v,)).map(|_| ())
        })?;
        Ok(self)
    }

    /// Show the major grid lines of both axes.
    pub fn grid(&mut self) -> Result<&mut Self, Error> {
        Python::with_gil(|py| {
            meth!(self.ax, grid, py -> (true,)).map(|_| ())
        })?;
        Ok(self)
    }

    pub fn set_xlabel(&mut self, label: &str) -> Result<&mut Self, Error> {
        Python::with_gil(|py| {
            meth!(self.ax, set_xlabel, py -> (label,)).map(|_| ())
        })?;
        Ok(self)
    }

    /// Place a legend of the labelled lines at `loc` (e.g. "best",
    /// "upper right",...) with entries written in `font_size` points.
    pub fn legend(&mut self, loc: &str, font_size: f64)
                  -> Result<&mut Self, Error> {
        Python::with_gil(|py| {
            let prop = PyDict::new_bound(py);
            prop.set_item("size", font_size)?;
            let kwargs = PyDict::new_bound(py);
            kwargs.set_item("loc", loc)?;
            kwargs.set_item("prop", prop)?;
            meth!(self.ax, legend, py -> (), &kwargs)?;
            Ok::<_, Error>(())
        })?;
        Ok(self)
    }

    pub fn title(&self) -> Result<String, Error> {
        Python::with_gil(|py| Ok(meth!(self.ax, get_title, py)?.extract()?))
    }

    pub fn xlabel(&self) -> Result<String, Error> {
        Python::with_gil(|py| Ok(meth!(self.ax, get_xlabel, py)?.extract()?))
    }

    /// Return the lines drawn on these axes, in drawing order.
    pub fn lines(&self) -> Result<Vec<Line2D>, Error> {
        Python::with_gil(|py| {
            meth!(self.ax, get_lines, py)?.iter()?
                .map(|l| -> Result<Line2D, Error> {
                    Ok(Line2D { line: l?.unbind() }) })
                .collect()
        })
    }

    /// Font size of the legend entries, or `None` if the axes carry
    /// no legend (or an empty one).
    pub fn legend_font_size(&self) -> Result<Option<f64>, Error> {
        Python::with_gil(|py| {
            let legend = meth!(self.ax, get_legend, py)?;
            if legend.is_none() {
                return Ok(None)
            }
            let texts = legend.call_method0(intern!(py, "get_texts"))?;
            let first = texts.iter()?.next();
            match first {
                Some(text) => {
                    let size = text?
                        .call_method0(intern!(py, "get_fontsize"))?;
                    Ok(Some(size.extract()?))
                }
                None => Ok(None),
            }
        })
    }

    /// Whether the major grid lines of both axes are visible.
    pub fn grid_visible(&self) -> Result<bool, Error> {
        Python::with_gil(|py| {
            let ax = self.ax.bind(py);
            for axis in ["xaxis", "yaxis"] {
                let lines = ax.getattr(axis)?
                    .call_method0(intern!(py, "get_gridlines"))?;
                for l in lines.iter()? {
                    let visible = l?
                        .call_method0(intern!(py, "get_visible"))?;
                    if !visible.extract::<bool>()? {
                        return Ok(false)
                    }
                }
            }
            Ok(true)
        })
    }
}

/// A pending line plot of `y` versus `x`.
#[must_use]
pub struct XY<'a, X, Y>
where X: ?Sized, Y: ?Sized {
    axes: &'a Axes,
    x: &'a X,
    y: &'a Y,
    label: &'a str,
}

impl<'a, X, Y> XY<'a, X, Y>
where X: Data + ?Sized,
      Y: Data + ?Sized {
    /// Set the name of the line as shown by the legend.
    pub fn label(mut self, label: &'a str) -> Self {
        self.label = label;
        self
    }

    /// Plot the data and return the drawn line.
    pub fn plot(self) -> Result<Line2D, Error> {
        Python::with_gil(|py| {
            let kwargs = PyDict::new_bound(py);
            if !self.label.is_empty() {
                kwargs.set_item("label", self.label)?
            }
            let xn = self.x.to_numpy(py);
            let yn = self.y.to_numpy(py);
            let lines = meth!(self.axes.ax, plot, py -> (xn, yn), &kwargs)?;
            // `plot` returns a list holding the single line drawn.
            let line = lines.get_item(0)?;
            Ok(Line2D { line: line.unbind() })
        })
    }
}


impl Line2D {
    pub fn label(&self) -> Result<String, Error> {
        Python::with_gil(|py| {
            Ok(meth!(self.line, get_label, py)?.extract()?)
        })
    }

    pub fn xdata(&self) -> Result<Vec<f64>, Error> {
        self.data("get_xdata")
    }

    pub fn ydata(&self) -> Result<Vec<f64>, Error> {
        self.data("get_ydata")
    }

    fn data(&self, getter: &str) -> Result<Vec<f64>, Error> {
        Python::with_gil(|py| {
            let d = self.line.bind(py).call_method0(getter)?;
            // numpy arrays are not sequences for pyo3; go through a list.
            Ok(d.call_method0(intern!(py, "tolist"))?.extract()?)
        })
    }
}



#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    #[test]
    fn a_basic_pdf() -> Result<(), Error> {
        let (fig, [[mut ax]]) = subplots((4., 3.))?;
        dbg!(&fig);
        let line = ax.xy(&[1., 2., 3., 4.], &[1., 4., 2., 3.])
            .label("basic").plot()?;
        assert_eq!(line.label()?, "basic");
        assert_eq!(line.xdata()?, vec![1., 2., 3., 4.]);
        assert_eq!(line.ydata()?, vec![1., 4., 2., 3.]);
        fig.save().to_file("target/a_basic.pdf")?;
        Ok(())
    }

    #[test]
    fn a_basic_row() -> Result<(), Error> {
        let (fig, [[mut ax0, mut ax1]]) = subplots((8., 6.))?;
        ax0.xy(&[1., 2., 3., 4.], &[1., 4., 2., 3.]).plot()?;
        ax1.xy(&[1., 2., 3., 4.], &[1., 4., 2., 3.]).plot()?;
        ax1.xy(&[1., 2., 3., 4.], &[4., 3., 2., 1.]).plot()?;
        let axes = fig.axes()?;
        assert_eq!(axes.len(), 2);
        assert_eq!(axes[0].lines()?.len(), 1);
        assert_eq!(axes[1].lines()?.len(), 2);
        fig.save().to_file("target/a_basic_row.pdf")?;
        Ok(())
    }

    #[test]
    fn a_basic_grid() -> Result<(), Error> {
        let (fig, [[_, _], [_, _]]) = subplots((6., 6.))?;
        assert_eq!(fig.axes()?.len(), 4);
        Ok(())
    }

    #[test]
    fn ndarray_data() -> Result<(), Error> {
        let (_fig, [[mut ax]]) = subplots((4., 3.))?;
        let x = Array1::range(0., 5., 1.);
        let y = x.mapv(|x| x * x);
        let line = ax.xy(&x, &y).plot()?;
        assert_eq!(line.xdata()?, vec![0., 1., 2., 3., 4.]);
        assert_eq!(line.ydata()?, vec![0., 1., 4., 9., 16.]);
        Ok(())
    }

    #[test]
    fn vec_data() -> Result<(), Error> {
        let (_fig, [[mut ax]]) = subplots((4., 3.))?;
        let x: Vec<f64> = (0 .. 3).map(|i| i as f64).collect();
        let y = vec![2., 1., 0.5];
        let line = ax.xy(&x, &y).plot()?;
        assert_eq!(line.xdata()?, x);
        assert_eq!(line.ydata()?, y);
        Ok(())
    }

    #[test]
    fn decorations() -> Result<(), Error> {
        let (_fig, [[mut ax]]) = subplots((4., 3.))?;
        ax.xy(&[0., 1.], &[1., 0.]).label("down").plot()?;
        assert!(!ax.grid_visible()?);
        assert_eq!(ax.legend_font_size()?, None);
        ax.grid()?.set_xlabel("x")?.set_title("Title")?.legend("best", 12.)?;
        assert!(ax.grid_visible()?);
        assert_eq!(ax.xlabel()?, "x");
        assert_eq!(ax.title()?, "Title");
        assert_eq!(ax.legend_font_size()?, Some(12.));
        Ok(())
    }

    #[test]
    fn mismatched_lengths_raise() -> Result<(), Error> {
        let (_fig, [[mut ax]]) = subplots((4., 3.))?;
        let r = ax.xy(&[1., 2., 3.], &[1., 2.]).plot();
        assert!(matches!(r, Err(Error::Python(_))));
        Ok(())
    }

    #[test]
    fn save_to_missing_directory() -> Result<(), Error> {
        let fig = Figure::new((4., 3.))?;
        let r = fig.save().to_file("target/no/such/directory/fig.jpg");
        assert!(matches!(r, Err(Error::FileNotFoundError)));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn save_to_read_only_directory() -> Result<(), Error> {
        use std::{fs, os::unix::fs::PermissionsExt};
        let dir = "target/read-only";
        fs::create_dir_all(dir).expect("create directory");
        fs::set_permissions(dir, fs::Permissions::from_mode(0o555))
            .expect("set permissions");
        // Permission bits do not bind a privileged user.
        let marker = format!("{dir}/writable");
        let privileged = fs::write(&marker, b"").is_ok();
        let _ = fs::remove_file(&marker);
        let fig = Figure::new((4., 3.))?;
        let r = fig.save().to_file(format!("{dir}/fig.jpg"));
        fs::set_permissions(dir, fs::Permissions::from_mode(0o755))
            .expect("restore permissions");
        if !privileged {
            assert!(matches!(r, Err(Error::PermissionError)));
        }
        Ok(())
    }
}
