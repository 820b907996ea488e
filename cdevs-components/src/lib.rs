pub mod components;

pub use components::register_components;
