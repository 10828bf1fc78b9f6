mod create_item;
mod home;
mod item_detail;
mod item_list;

pub use create_item::CreateItemView;
pub use home::HomeView;
pub use item_detail::ItemDetailView;
