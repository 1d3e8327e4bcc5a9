//! Document core for the image board editor.
//!
//! This crate owns everything about the board that has real invariants: the
//! image collection with its dense stacking order, the undo/redo history of
//! snapshots, the crop sub-state, and the geometry behind dragging, resizing
//! and snapping. Hosts (a browser shell, the `pasteboard` replay binary) feed
//! it decoded images and pointer events and read back render lists; they
//! never mutate the document directly.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::Editor`] and the [`engine::Clock`] seam |
//! | [`reducer`] | [`reducer::Action`] and the single transition function |
//! | [`doc`] | Document, image, crop and partial-load types |
//! | [`history`] | Bounded linear undo/redo history |
//! | [`layers`] | Z-order queries and the reorder algorithm |
//! | [`geometry`] | Clamping, grid snapping, aspect-locked resize math |
//! | [`controller`] | Pointer streams to reducer actions |
//! | [`input`] | Modifier keys and the gesture state machine |
//! | [`hit`] | Hit-testing images and resize handles |
//! | [`placement`] | Initial placement for pasted images |
//! | [`render`] | Render lists and export plans |
//! | [`persist`] | Stored layout without pixel data |
//! | [`config`] | [`config::EditorConfig`] tunables |
//! | [`consts`] | Shared numeric defaults |

pub mod config;
pub mod consts;
pub mod controller;
pub mod doc;
pub mod engine;
pub mod geometry;
pub mod hit;
pub mod history;
pub mod input;
pub mod layers;
pub mod persist;
pub mod placement;
pub mod reducer;
pub mod render;
