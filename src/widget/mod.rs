//! View components

pub mod page_view;
