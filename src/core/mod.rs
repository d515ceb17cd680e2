// Copyright @yucwang 2021

pub mod articulation;
pub mod error;
pub mod scene_loader;
pub mod tangent_frame;
pub mod view;
