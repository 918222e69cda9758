pub mod video;
pub mod video_snapshot;

pub use video::Entity as VideoEntity;
pub use video_snapshot::Entity as VideoSnapshotEntity;
