//! Portal widgets
//!
//! Collaborators that live beside the content pane: the modal loader,
//! activity logging and the registration fee summary.

pub use portico_widgets::*;
