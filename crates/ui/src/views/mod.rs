mod flash;
mod games;
mod play;
mod questions;
mod state;
mod topics;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use flash::{Flash, FlashBanner, FlashSlot, FlashTone, provide_flash, use_flash};
pub use games::{GameCreateView, GameListView};
pub use play::PlayView;
pub use questions::{QuestionCreateView, QuestionEditView, QuestionImportView, QuestionListView};
pub use state::{ViewError, ViewState, view_state_from_resource};
pub use topics::{TopicCreateView, TopicEditView, TopicListView};
