pub(crate) mod positions;
