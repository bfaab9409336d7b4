//! Task Drafts
//!
//! Raw form input for the create and edit forms, field-level validation,
//! and image resolution (local file beats pasted URL).

use std::collections::BTreeMap;
use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::task::{Priority, Task, TaskId, TaskState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Title,
    Description,
    Priority,
    State,
}

impl Field {
    fn required_message(&self) -> &'static str {
        match self {
            Field::Title => "Title is required",
            Field::Description => "Description is required",
            Field::Priority => "Priority is required",
            Field::State => "State is required",
        }
    }
}

/// Field-level problems that block submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<Field, &'static str>);

impl ValidationErrors {
    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    fn require(&mut self, field: Field, present: bool) {
        if !present {
            self.0.insert(field, field.required_message());
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<_> = self.0.values().copied().collect();
        f.write_str(&messages.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Bytes of a locally chosen image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }

    /// `data:<mime>;base64,<payload>`
    pub fn to_data_uri(&self) -> String {
        let mime = if self.mime.is_empty() {
            "application/octet-stream"
        } else {
            self.mime.as_str()
        };
        format!("data:{};base64,{}", mime, STANDARD.encode(&self.bytes))
    }
}

/// Pick the image for a record: a read file wins over a typed URL
pub fn resolve_image(url: &str, file: Option<&ImageFile>) -> Option<String> {
    if let Some(file) = file {
        return Some(file.to_data_uri());
    }
    let url = url.trim();
    if url.is_empty() {
        None
    } else {
        Some(url.to_string())
    }
}

/// Checked draft, ready to become a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub state: TaskState,
    pub image: Option<String>,
}

impl ValidDraft {
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            state: self.state,
            image: self.image,
        }
    }

    /// Lay the edited fields over `original`, keeping its id. The original
    /// image survives when no new one was given.
    pub fn merge_into(self, original: &Task) -> Task {
        Task {
            id: original.id.clone(),
            title: self.title,
            description: self.description,
            priority: self.priority,
            state: self.state,
            image: self.image.or_else(|| original.image.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    /// `"Low"`, `"Medium"`, `"High"` or empty
    pub priority: String,
    /// `"todo"`, `"doing"`, `"done"` or empty
    pub state: String,
    pub image_url: String,
    pub image_file: Option<ImageFile>,
}

impl TaskDraft {
    /// Pre-filled draft for editing an existing record
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority.as_str().to_string(),
            state: task.state.as_str().to_string(),
            image_url: String::new(),
            image_file: None,
        }
    }

    pub fn validate(&self) -> Result<ValidDraft, ValidationErrors> {
        let priority = Priority::parse(self.priority.trim());
        let state = TaskState::parse(self.state.trim());

        let mut errors = ValidationErrors::default();
        errors.require(Field::Title, !self.title.trim().is_empty());
        errors.require(Field::Description, !self.description.trim().is_empty());
        errors.require(Field::Priority, priority.is_some());
        errors.require(Field::State, state.is_some());

        match (priority, state) {
            (Some(priority), Some(state)) if errors.is_empty() => Ok(ValidDraft {
                title: self.title.clone(),
                description: self.description.clone(),
                priority,
                state,
                image: resolve_image(&self.image_url, self.image_file.as_ref()),
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> TaskDraft {
        TaskDraft {
            title: "Buy milk".into(),
            description: "2%".into(),
            priority: "Low".into(),
            state: "todo".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_draft_reports_every_field() {
        let errors = TaskDraft::default().validate().unwrap_err();
        let fields: Vec<_> = errors.fields().collect();
        assert_eq!(fields, [Field::Title, Field::Description, Field::Priority, Field::State]);
        assert_eq!(errors.get(Field::Title), Some("Title is required"));
    }

    #[test]
    fn test_whitespace_is_empty() {
        let mut draft = filled();
        draft.title = "   ".into();
        let errors = draft.validate().unwrap_err();
        assert_eq!(errors.get(Field::Title), Some("Title is required"));
        assert_eq!(errors.get(Field::Description), None);
    }

    #[test]
    fn test_text_is_stored_as_typed() {
        let mut draft = filled();
        draft.title = "  Buy milk ".into();
        let valid = draft.validate().unwrap();
        assert_eq!(valid.title, "  Buy milk ");
        assert_eq!(valid.description, "2%");
    }

    #[test]
    fn test_unknown_priority_is_rejected() {
        let mut draft = filled();
        draft.priority = "Urgent".into();
        assert!(draft.validate().unwrap_err().get(Field::Priority).is_some());
    }

    #[test]
    fn test_valid_draft_builds_record() {
        let task = filled().validate().unwrap().into_task(TaskId::from("42"));
        assert_eq!(task.id.as_str(), "42");
        assert_eq!(task.priority, Priority::Low);
        assert_eq!(task.state, TaskState::Todo);
        assert_eq!(task.image, None);
    }

    #[test]
    fn test_file_beats_url() {
        let file = ImageFile::new("image/png", vec![1, 2, 3]);
        assert_eq!(
            resolve_image("https://example.com/a.png", Some(&file)).as_deref(),
            Some("data:image/png;base64,AQID")
        );
        assert_eq!(
            resolve_image(" https://example.com/a.png ", None).as_deref(),
            Some("https://example.com/a.png")
        );
        assert_eq!(resolve_image("", None), None);
    }

    #[test]
    fn test_edit_keeps_id_and_old_image() {
        let original = Task::new(TaskId::from("7"), "Old", "desc", Priority::High, TaskState::Todo)
            .with_image("https://example.com/old.png");
        let mut draft = TaskDraft::from_task(&original);
        draft.state = "doing".into();

        let updated = draft.validate().unwrap().merge_into(&original);
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.state, TaskState::Doing);
        assert_eq!(updated.image, original.image);

        let mut draft = TaskDraft::from_task(&original);
        draft.image_url = "https://example.com/new.png".into();
        let updated = draft.validate().unwrap().merge_into(&original);
        assert_eq!(updated.image.as_deref(), Some("https://example.com/new.png"));
    }
}
