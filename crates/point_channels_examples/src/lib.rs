#![forbid(unsafe_code)]

mod rendering;

pub use rendering::{float_table_to_rgba, init_tracing, render_strips_to_png, Strip};
