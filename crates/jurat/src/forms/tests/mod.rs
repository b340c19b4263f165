mod common;
mod fill;
mod routing;
