pub(crate) mod backgrounds;
pub(crate) mod catalog;
pub(crate) mod decode;
pub(crate) mod media;
pub(crate) mod sprites;
pub(crate) mod store;
