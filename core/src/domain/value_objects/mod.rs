//! Value objects exposed to the API layer.

pub mod session_view;

pub use session_view::SessionView;
