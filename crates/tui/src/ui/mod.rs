pub mod main_view;
pub mod palette;
pub mod runtime;
pub mod text_input;
pub mod theme;
