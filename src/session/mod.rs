pub(crate) mod context;
pub(crate) mod episode;
pub(crate) mod variants;
