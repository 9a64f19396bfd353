pub mod registry;
pub mod topic;

pub use registry::{Recipient, TopicRegistry};
pub use topic::Topic;

#[cfg(test)]
mod tests;
