mod leaderboard_vm;
mod profile_vm;
mod quiz_vm;
mod result_vm;
mod start_vm;
mod time_fmt;

pub use leaderboard_vm::{
    LeaderboardEntryVm, RankBadge, filter_label, load_leaderboard, map_leaderboard,
};
pub use profile_vm::{
    RECENT_RUNS, ProfileVm, RecentRunVm, load_profile, load_recent_runs, save_profile,
};
pub use quiz_vm::{
    OptionVm, QuizIntent, QuizScreenVm, QuizVm, SoundCue, TimerUrgency, quiz_title, start_quiz,
};
pub use result_vm::{HOME_LINK, LEADERBOARD_LINK, ResultScreen, ResultVm, load_result};
pub use start_vm::{DifficultyCardVm, StartVm, TopicCardVm, quiz_link};
pub use time_fmt::{format_countdown, format_datetime, format_elapsed};
