pub(crate) mod camera;
pub(crate) mod compositor;
pub(crate) mod config;
pub(crate) mod end_card;
pub(crate) mod frame;
pub(crate) mod timeline;
