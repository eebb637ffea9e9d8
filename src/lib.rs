pub mod backup;
pub mod calc;
pub mod db;
pub mod ipc;
pub mod model;
pub mod query;
pub mod storage;
pub mod store;

pub use model::{
    Course, CoursePatch, CourseStats, CourseStatus, NewCourse, StudyLog, StudyLogInput,
    StudyLogPatch,
};
pub use query::{CourseQuery, OrderBy};
pub use storage::{KeyValueStore, MemoryKv, SqliteKv, StorageError};
pub use store::{Clock, CourseStore, SystemClock, STORAGE_KEY};
