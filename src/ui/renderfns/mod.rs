pub mod footer;
pub mod header;
pub mod utils;

pub use footer::draw_footer;
pub use header::draw_header;
#[cfg(test)]
pub use utils::buffer_text;
pub use utils::{centered_rows, truncate};
