extern crate fnv;
extern crate ini;
#[macro_use] extern crate log;
#[macro_use] extern crate lazy_static;
extern crate env_logger;

#[cfg(test)] extern crate rand;

pub mod alg;
pub mod graphics;
pub mod entity;
pub mod components;
pub mod scene;
pub mod render;
pub mod editor;
pub mod config;
pub mod logging;
