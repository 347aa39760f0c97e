mod partition;
mod utils;

pub use partition::{find_clusters, Partition};
