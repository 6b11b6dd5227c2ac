pub mod concurrent_reader;
pub mod dataset_reader;
pub mod observation_reader;

pub use concurrent_reader::{ConcurrentReader, StationTables};
pub use dataset_reader::DatasetReader;
pub use observation_reader::ObservationReader;
