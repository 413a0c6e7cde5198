pub mod ingest;
pub mod pcm;

pub use ingest::ingest;
pub use pcm::PcmBuffer;
