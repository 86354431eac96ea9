pub(crate) mod align;
pub(crate) mod diff;
pub(crate) mod glitch;
pub(crate) mod shift;
