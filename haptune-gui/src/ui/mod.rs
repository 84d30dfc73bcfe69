//! # UI Module
//!
//! Layout of the HapTune window: the data-load row, the editing plot, the
//! control panel, the optional vibration panel and the status line.

pub mod controls;
pub mod main_display;
