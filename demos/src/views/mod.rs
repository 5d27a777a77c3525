//! One front end per machine family.

pub mod arrays;
pub mod cluster;
pub mod optimize;
pub mod pathfind;
