pub(crate) mod dialogue_box;
pub(crate) mod glyphs;
pub(crate) mod layout;
