// Copyright @yucwang 2021

pub mod obj_utils;
