//! Reusable widgets: header, metric tiles, count bars and checkbox lists.

pub mod bar;
pub mod header;
pub mod multiselect;
pub mod tiles;
