//! Core of a visual novel engine: a frame-stepped interpreter for indented
//! command lists, the runtime state the commands act on, and a headless
//! frame driver for whole projects.

pub mod audio;
pub mod command;
pub mod commands;
pub mod context;
pub mod error;
pub mod interpreter;
pub mod message;
pub mod project;
pub mod runtime;
pub mod scene;
pub mod value;
pub mod variables;
