pub(crate) mod checkpoint;
pub(crate) mod manifest;
