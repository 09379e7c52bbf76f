mod loader;
mod types;

pub use loader::{BACKEND_ENV, CONFIG_FILE, load};
pub use types::Config;
