use quiz_core::model::{GameToken, OptionId};
use services::{GameAnswerResult, GameListItem, PlaySlot};

use super::time_fmt::{format_datetime, format_secs};

const OPTION_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];
const OPTION_COLORS: [&str; 4] = ["primary", "success", "secondary", "danger"];

/// Letter shown for the option at a 1-based position.
#[must_use]
pub fn option_letter(position: usize) -> Option<char> {
    position
        .checked_sub(1)
        .and_then(|index| OPTION_LETTERS.get(index))
        .copied()
}

/// Colour class suffix for the option at a 1-based position.
#[must_use]
pub fn option_color(position: usize) -> Option<&'static str> {
    position
        .checked_sub(1)
        .and_then(|index| OPTION_COLORS.get(index))
        .copied()
}

/// `n/k` while a game runs, `Complete` afterwards.
#[must_use]
pub fn progress_label(answered: u32, total: u32, is_complete: bool) -> String {
    if is_complete {
        "Complete".to_string()
    } else {
        format!("{answered}/{total}")
    }
}

//
// ─── GAME LIST ─────────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameRowVm {
    pub token: GameToken,
    pub topic_name: String,
    pub progress: String,
    pub is_complete: bool,
    pub created_at_str: String,
}

impl From<&GameListItem> for GameRowVm {
    fn from(item: &GameListItem) -> Self {
        Self {
            token: item.token,
            topic_name: item.topic_name.clone(),
            progress: progress_label(item.answered, item.total, item.is_complete),
            is_complete: item.is_complete,
            created_at_str: format_datetime(item.created_at),
        }
    }
}

#[must_use]
pub fn map_game_rows(items: &[GameListItem]) -> Vec<GameRowVm> {
    items.iter().map(GameRowVm::from).collect()
}

//
// ─── PLAY ──────────────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayOptionVm {
    pub id: OptionId,
    pub letter: char,
    pub text: String,
    pub color_class: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayVm {
    pub number: u32,
    pub total: u32,
    pub statement: String,
    pub time_limit_secs: u64,
    pub time_label: String,
    pub options: Vec<PlayOptionVm>,
}

#[must_use]
pub fn map_play_slot(slot: &PlaySlot) -> PlayVm {
    let options = slot
        .options
        .iter()
        .filter_map(|option| {
            let position = usize::from(option.position());
            let letter = option_letter(position)?;
            let color = option_color(position)?;
            Some(PlayOptionVm {
                id: option.id(),
                letter,
                text: option.text().to_owned(),
                color_class: format!("choice choice--{color}"),
            })
        })
        .collect();

    let time_limit_secs = slot.question.time_limit_secs();
    PlayVm {
        number: slot.number(),
        total: slot.total,
        statement: slot.question.statement().to_owned(),
        time_limit_secs,
        time_label: format_secs(time_limit_secs),
        options,
    }
}

/// Flash text naming the correct option after an answer, followed by the
/// question's explanation when it has one.
#[must_use]
pub fn answer_message(result: &GameAnswerResult) -> String {
    let answer = match &result.correct_option {
        Some(option) => format!("Answer: {}", option.text()),
        None => "Answer recorded.".to_string(),
    };
    match &result.explanation {
        Some(explanation) => format!("{answer} ({explanation})"),
        None => answer,
    }
}
