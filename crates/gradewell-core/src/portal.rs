//! The portal's owned in-memory state and its operations.
//!
//! A `Portal` reads every slot once on `open` and rewrites a slot after each
//! change to the matching collection. Save failures are returned to the
//! caller; the in-memory change stays applied. A slot that cannot be parsed
//! is backed up through the store before the portal starts from its default.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::PortalError;
use crate::grading::{check_activity, percentage, Grader};
use crate::model::{
    new_id, Activity, AnswerSet, CalendarEvent, Message, Submission, Theme, User,
};
use crate::seed::sample_activities;
use crate::store::{Slot, SlotStore};

/// Per-student dashboard numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentSummary {
    pub submitted: usize,
    pub pending: usize,
    /// Rounded mean score, `None` before the first submission.
    pub average_score: Option<u8>,
}

/// Portal state bound to a persistence backend.
pub struct Portal<S: SlotStore> {
    store: S,
    user: Option<User>,
    activities: Vec<Activity>,
    submissions: Vec<Submission>,
    messages: Vec<Message>,
    events: Vec<CalendarEvent>,
    theme: Theme,
}

impl<S: SlotStore> Portal<S> {
    /// Load every slot from `store`. Missing or unreadable slots start from
    /// their defaults; missing activities are seeded with the sample set.
    pub fn open(store: S) -> Self {
        let user = load_slot(&store, Slot::User);
        let activities = load_slot(&store, Slot::Activities).unwrap_or_else(sample_activities);
        let submissions = load_slot(&store, Slot::Submissions).unwrap_or_default();
        let messages = load_slot(&store, Slot::Messages).unwrap_or_default();
        let events = load_slot(&store, Slot::Events).unwrap_or_default();
        let theme = load_theme(&store);

        Self {
            store,
            user,
            activities,
            submissions,
            messages,
            events,
            theme,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // -- session ------------------------------------------------------------

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn login(&mut self, user: User) -> Result<(), PortalError> {
        self.user = Some(user);
        self.persist(Slot::User, &self.user)
    }

    pub fn logout(&mut self) -> Result<(), PortalError> {
        self.user = None;
        self.store
            .remove(Slot::User)
            .map_err(|source| PortalError::Persist {
                slot: Slot::User.key(),
                source,
            })
    }

    /// Replace the signed-in user's profile.
    pub fn update_profile(&mut self, user: User) -> Result<(), PortalError> {
        if self.user.is_none() {
            return Err(PortalError::NotSignedIn);
        }
        self.login(user)
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, PortalError> {
        self.theme = self.theme.toggled();
        self.persist(Slot::Theme, &self.theme)?;
        Ok(self.theme)
    }

    // -- activities ---------------------------------------------------------

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn activity(&self, id: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == id)
    }

    /// Activities assigned to a student.
    pub fn activities_for(&self, student_id: &str) -> Vec<&Activity> {
        self.activities
            .iter()
            .filter(|a| a.is_assigned_to(student_id))
            .collect()
    }

    /// Assigned activities the student has not submitted yet.
    pub fn pending_activities(&self, student_id: &str) -> Vec<&Activity> {
        self.activities_for(student_id)
            .into_iter()
            .filter(|a| {
                !self
                    .submissions
                    .iter()
                    .any(|s| s.activity_id == a.id && s.student_id == student_id)
            })
            .collect()
    }

    /// Validate and append a new activity.
    pub fn publish_activity(&mut self, activity: Activity) -> Result<(), PortalError> {
        check_activity(&activity)?;
        if self.activity(&activity.id).is_some() {
            return Err(PortalError::DuplicateActivity(activity.id));
        }
        debug!(id = %activity.id, "publishing activity");
        self.activities.push(activity);
        self.persist(Slot::Activities, &self.activities)
    }

    // -- submissions --------------------------------------------------------

    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    pub fn submission(&self, id: &str) -> Option<&Submission> {
        self.submissions.iter().find(|s| s.id == id)
    }

    pub fn submissions_for(&self, student_id: &str) -> Vec<&Submission> {
        self.submissions
            .iter()
            .filter(|s| s.student_id == student_id)
            .collect()
    }

    pub fn submissions_for_activity(&self, activity_id: &str) -> Vec<&Submission> {
        self.submissions
            .iter()
            .filter(|s| s.activity_id == activity_id)
            .collect()
    }

    /// Grade a student's answers and append the resulting submission.
    pub async fn submit(
        &mut self,
        grader: &Grader,
        activity_id: &str,
        student_id: &str,
        answers: AnswerSet,
    ) -> Result<Submission, PortalError> {
        let activity = self
            .activity(activity_id)
            .ok_or_else(|| PortalError::ActivityNotFound(activity_id.to_string()))?
            .clone();
        if !activity.is_assigned_to(student_id) {
            return Err(PortalError::NotAssigned {
                activity_id: activity_id.to_string(),
                student_id: student_id.to_string(),
            });
        }

        let result = grader
            .grade(&activity.title, &activity.questions, &answers)
            .await?;
        let submission = Submission::new(&activity.id, student_id, answers, result);

        self.submissions.push(submission.clone());
        self.persist(Slot::Submissions, &self.submissions)?;
        Ok(submission)
    }

    pub fn student_summary(&self, student_id: &str) -> StudentSummary {
        let submitted = self.submissions_for(student_id);
        let average_score = if submitted.is_empty() {
            None
        } else {
            let total: usize = submitted.iter().map(|s| s.result.score as usize).sum();
            Some(percentage(total, submitted.len() * 100))
        };
        StudentSummary {
            submitted: submitted.len(),
            pending: self.pending_activities(student_id).len(),
            average_score,
        }
    }

    // -- messages -----------------------------------------------------------

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Send a message from the signed-in user.
    pub fn send_message(&mut self, receiver_id: &str, text: &str) -> Result<Message, PortalError> {
        let sender = self.user.as_ref().ok_or(PortalError::NotSignedIn)?;
        let message = Message {
            id: new_id("msg"),
            sender_id: sender.id.clone(),
            receiver_id: receiver_id.to_string(),
            text: text.to_string(),
            timestamp: Utc::now(),
        };
        self.messages.push(message.clone());
        self.persist(Slot::Messages, &self.messages)?;
        Ok(message)
    }

    /// Messages exchanged between two users, oldest first.
    pub fn conversation(&self, a: &str, b: &str) -> Vec<&Message> {
        let mut thread: Vec<&Message> = self
            .messages
            .iter()
            .filter(|m| {
                (m.sender_id == a && m.receiver_id == b) || (m.sender_id == b && m.receiver_id == a)
            })
            .collect();
        thread.sort_by_key(|m| m.timestamp);
        thread
    }

    // -- calendar -----------------------------------------------------------

    pub fn add_event(&mut self, mut event: CalendarEvent) -> Result<CalendarEvent, PortalError> {
        if event.id.is_empty() {
            event.id = new_id("evt");
        }
        self.events.push(event.clone());
        self.persist(Slot::Events, &self.events)?;
        Ok(event)
    }

    pub fn delete_event(&mut self, id: &str) -> Result<(), PortalError> {
        let before = self.events.len();
        self.events.retain(|e| e.id != id);
        if self.events.len() == before {
            return Err(PortalError::EventNotFound(id.to_string()));
        }
        self.persist(Slot::Events, &self.events)
    }

    /// All events ordered by date.
    pub fn events_by_date(&self) -> Vec<&CalendarEvent> {
        let mut events: Vec<&CalendarEvent> = self.events.iter().collect();
        events.sort_by_key(|e| e.date);
        events
    }

    fn persist<T: Serialize>(&self, slot: Slot, value: &T) -> Result<(), PortalError> {
        let json = serde_json::to_string(value).map_err(|e| PortalError::Persist {
            slot: slot.key(),
            source: e.into(),
        })?;
        self.store
            .save(slot, &json)
            .map_err(|source| PortalError::Persist {
                slot: slot.key(),
                source,
            })
    }
}

fn load_slot<T: DeserializeOwned>(store: &dyn SlotStore, slot: Slot) -> Option<T> {
    let raw = match store.load(slot) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!("failed to read slot `{slot}`, using default: {e:#}");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            // The next write replaces the slot, so keep the unreadable copy.
            match store.backup(slot) {
                Ok(location) => {
                    warn!("slot `{slot}` could not be parsed ({e}), saved a copy to {location}, using default")
                }
                Err(backup_err) => {
                    warn!("slot `{slot}` could not be parsed ({e}) and backing it up failed: {backup_err:#}, using default")
                }
            }
            None
        }
    }
}

/// The browser portal stored the bare words `dark` / `light`; accept those too.
fn load_theme(store: &dyn SlotStore) -> Theme {
    match store.load(Slot::Theme) {
        Ok(Some(raw)) => match raw.trim().trim_matches('"') {
            "dark" => Theme::Dark,
            _ => Theme::Light,
        },
        Ok(None) => Theme::default(),
        Err(e) => {
            warn!("failed to read theme, using default: {e:#}");
            Theme::default()
        }
    }
}
