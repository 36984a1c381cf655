//! Scene components that turn layouts into tracked scene nodes.
//!
//! - `seating` places grid markers, tables and seat nodes for each room
//! - `chair` builds the composite chair, either merged per chair or instanced

pub mod chair;
pub mod seating;
