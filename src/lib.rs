// Copyright @yucwang 2021

pub mod core;
pub mod io;
pub mod math;
pub mod shapes;
