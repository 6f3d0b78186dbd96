// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Experience, FightResult, Match, MatchStatus, Profile, Swipe};
pub use requests::{ProfileUpdate, ScheduleRequest, SignInRequest, SignUpRequest, SwipeRequest};
pub use responses::{
    CandidateResponse, ErrorResponse, HealthResponse, MatchView, SessionResponse, SwipeResponse,
};
