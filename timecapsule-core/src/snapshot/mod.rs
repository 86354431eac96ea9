pub(crate) mod discover;
