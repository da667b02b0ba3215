pub mod session;
pub mod upload;
pub mod user;

pub use session::Session;
pub use upload::{
    AudioCategory, AudioFileOut, NewUploadRecord, StoredLocation, UploadRecord, UploadStatus,
};
pub use user::{AccountType, AdminUserUpdate, User, UserCreate, UserOut, UserUpdate};
