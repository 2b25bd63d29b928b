pub mod assets;
pub mod edit_session;
pub mod gate;
pub mod ordering;
pub mod panel;
pub mod repository;
pub mod sync;
