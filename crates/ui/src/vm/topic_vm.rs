use quiz_core::model::{Topic, TopicId};

use super::time_fmt::format_datetime;

/// One row of the topic table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicRowVm {
    pub id: TopicId,
    pub name: String,
    pub description: String,
    pub created_at_str: String,
}

impl From<&Topic> for TopicRowVm {
    fn from(topic: &Topic) -> Self {
        Self {
            id: topic.id(),
            name: topic.name().to_owned(),
            description: topic.description().to_owned(),
            created_at_str: format_datetime(topic.created_at()),
        }
    }
}

#[must_use]
pub fn map_topic_rows(topics: &[Topic]) -> Vec<TopicRowVm> {
    topics.iter().map(TopicRowVm::from).collect()
}

/// UI-ready representation of a topic for selection controls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicOptionVm {
    pub id: TopicId,
    pub label: String,
}

#[must_use]
pub fn map_topic_options(topics: &[Topic]) -> Vec<TopicOptionVm> {
    topics
        .iter()
        .map(|topic| TopicOptionVm {
            id: topic.id(),
            label: topic.name().to_owned(),
        })
        .collect()
}
