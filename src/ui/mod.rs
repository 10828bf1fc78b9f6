//! Terminal presentation: views on a navigation stack, reusable components,
//! and plain render functions.

pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

pub use view::{ShortcutInfo, View, ViewAction};
