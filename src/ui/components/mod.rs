mod error_boundary;
mod input;
mod item_card;
mod key_result;

pub use error_boundary::ErrorBoundary;
pub use input::{InputResult, TextInput};
pub use item_card::{ItemCard, CARD_HEIGHT};
pub use key_result::KeyResult;
