pub mod physics;

#[cfg(test)]
mod tests;

pub use physics::*;
