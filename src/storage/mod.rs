pub mod documents;
pub mod store;

pub use documents::{
    Education, Experience, Post, Profile, ProfileFields, Social, User, UserSummary,
};
pub use store::{DocumentStore, StoreError, StoreResult, StoreStats};
