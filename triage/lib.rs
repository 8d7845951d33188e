#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(clippy::no_effect_underscore_binding)]

pub mod config;
pub mod data;
pub mod dataset;
pub mod evaluate;
pub mod features;
pub mod labels;
pub mod model;
pub mod notation;
pub mod report;
pub mod residues;
