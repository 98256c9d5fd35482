use std::time::Duration;

use dioxus::prelude::*;

const FLASH_TTL: Duration = Duration::from_secs(4);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlashTone {
    Success,
    Correct,
    Incorrect,
    Error,
}

impl FlashTone {
    fn class(self) -> &'static str {
        match self {
            Self::Success => "flash flash--success",
            Self::Correct => "flash flash--correct",
            Self::Incorrect => "flash flash--incorrect",
            Self::Error => "flash flash--error",
        }
    }
}

/// A one-shot message shown above the current page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Flash {
    pub tone: FlashTone,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            tone: FlashTone::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn answer(message: impl Into<String>, is_correct: bool) -> Self {
        Self {
            tone: if is_correct {
                FlashTone::Correct
            } else {
                FlashTone::Incorrect
            },
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            tone: FlashTone::Error,
            message: message.into(),
        }
    }
}

/// Shared slot holding the current flash. Survives route changes.
#[derive(Clone, Copy, PartialEq)]
pub struct FlashSlot(Signal<Option<Flash>>);

impl FlashSlot {
    pub fn show(self, flash: Flash) {
        let mut inner = self.0;
        inner.set(Some(flash));
    }

    pub fn clear(self) {
        let mut inner = self.0;
        inner.set(None);
    }

    #[must_use]
    pub fn current(&self) -> Option<Flash> {
        self.0.read().clone()
    }
}

/// Install the flash slot for everything rendered below the caller.
pub fn provide_flash() -> FlashSlot {
    use_context_provider(|| FlashSlot(Signal::new(None)))
}

#[must_use]
pub fn use_flash() -> FlashSlot {
    use_context::<FlashSlot>()
}

#[component]
pub fn FlashBanner() -> Element {
    let slot = use_flash();

    let _expiry = use_resource(move || async move {
        let shown = slot.current();
        if shown.is_some() {
            tokio::time::sleep(FLASH_TTL).await;
            if *slot.0.peek() == shown {
                slot.clear();
            }
        }
    });

    match slot.current() {
        Some(flash) => rsx! {
            div { class: flash.tone.class(),
                span { class: "flash-message", "{flash.message}" }
                button {
                    class: "flash-dismiss",
                    r#type: "button",
                    onclick: move |_| slot.clear(),
                    "×"
                }
            }
        },
        None => rsx! {},
    }
}
