mod game_vm;
mod question_vm;
mod time_fmt;
mod topic_vm;

pub use game_vm::{
    GameRowVm, PlayOptionVm, PlayVm, answer_message, map_game_rows, map_play_slot,
    option_color, option_letter, progress_label,
};
pub use question_vm::{
    FORM_OPTION_ROWS, OptionFormRow, QuestionFormError, QuestionFormVm, QuestionRowVm,
    map_question_rows,
};
pub use time_fmt::{format_datetime, format_secs};
pub use topic_vm::{TopicOptionVm, TopicRowVm, map_topic_options, map_topic_rows};
