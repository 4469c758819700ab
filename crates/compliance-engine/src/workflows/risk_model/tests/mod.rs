mod common;
mod classifier;
