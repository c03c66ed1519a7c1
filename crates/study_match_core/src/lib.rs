pub mod batch;
pub mod domain;
pub mod normalize;
pub mod ports;
pub mod scoring;
pub mod swipes;
pub mod testing;

pub use domain::{
    AuthSession, Direction, Match, Proficiency, Profile, RawProfile, StudyTime, Swipe,
    UserCredentials, Year,
};
pub use ports::{PortError, PortResult, StoreService};
