mod end_path_follow;
mod jump;
mod start_path_follow;
mod suggested_mode;

pub use end_path_follow::EndPathFollow;
pub use jump::Jump;
pub use start_path_follow::StartPathFollow;
pub use suggested_mode::SuggestedMode;
