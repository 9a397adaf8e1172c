//! Pure resume renderer.
//!
//! Produces a layout-agnostic [`Document`] tree that a PDF layout engine turns
//! into pages. Nothing here performs I/O.

pub mod dates;
pub mod document;
pub mod render;

pub use dates::{format_date_range, format_month, PRESENT};
pub use document::{Document, Node, PageSize, Role};
pub use render::{pdf_file_name, render_resume};
