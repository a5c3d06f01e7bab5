// libs/appointment-cell/src/services/form.rs
use crate::models::{AppointmentMode, AppointmentStatus, FieldKind, FormField, FormPlan};

/// Maps a form mode to everything the client needs to render it: the derived
/// status, the field set, and the submit-button label.
pub struct ModeResolver;

impl ModeResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn status_for(&self, mode: AppointmentMode) -> AppointmentStatus {
        AppointmentStatus::from(mode)
    }

    pub fn submit_label(&self, mode: AppointmentMode) -> &'static str {
        match mode {
            AppointmentMode::Create => "Create Appointment",
            AppointmentMode::Cancel => "Cancel Appointment",
            AppointmentMode::Schedule => "Schedule Appointment",
        }
    }

    /// The ordered field set rendered for a mode. Cancel shows only the
    /// cancellation reason; the other modes share the booking fields.
    pub fn fields_for(&self, mode: AppointmentMode) -> Vec<FormField> {
        match mode {
            AppointmentMode::Cancel => vec![FormField::new(
                "cancellation_reason",
                "Reason for cancellation",
                FieldKind::Textarea,
                true,
            )
            .with_placeholder("Enter reason for cancellation")],
            AppointmentMode::Create | AppointmentMode::Schedule => vec![
                FormField::new("primary_physician", "Doctor", FieldKind::Select, true)
                    .with_placeholder("Select a doctor"),
                FormField::new(
                    "schedule",
                    "Expected appointment date",
                    FieldKind::DatePicker,
                    true,
                ),
                FormField::new("reason", "Reason for appointment", FieldKind::Textarea, false)
                    .with_placeholder("Enter reason for appointment"),
                FormField::new("note", "Notes", FieldKind::Textarea, false)
                    .with_placeholder("Enter notes"),
            ],
        }
    }

    pub fn form_plan(&self, mode: AppointmentMode) -> FormPlan {
        FormPlan {
            mode,
            status: self.status_for(mode),
            submit_label: self.submit_label(mode).to_string(),
            fields: self.fields_for(mode),
        }
    }
}

impl Default for ModeResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required_names(plan: &FormPlan) -> Vec<&str> {
        plan.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect()
    }

    #[test]
    fn status_is_a_pure_function_of_mode() {
        let resolver = ModeResolver::new();
        assert_eq!(
            resolver.status_for(AppointmentMode::Create),
            AppointmentStatus::Pending
        );
        assert_eq!(
            resolver.status_for(AppointmentMode::Cancel),
            AppointmentStatus::Cancelled
        );
        assert_eq!(
            resolver.status_for(AppointmentMode::Schedule),
            AppointmentStatus::Scheduled
        );
    }

    #[test]
    fn create_and_schedule_require_physician_and_schedule() {
        let resolver = ModeResolver::new();
        for mode in [AppointmentMode::Create, AppointmentMode::Schedule] {
            let plan = resolver.form_plan(mode);
            assert_eq!(required_names(&plan), vec!["primary_physician", "schedule"]);
            let names: Vec<&str> = plan.fields.iter().map(|f| f.name.as_str()).collect();
            assert_eq!(
                names,
                vec!["primary_physician", "schedule", "reason", "note"]
            );
        }
    }

    #[test]
    fn cancel_requires_only_a_cancellation_reason() {
        let resolver = ModeResolver::new();
        let plan = resolver.form_plan(AppointmentMode::Cancel);
        assert_eq!(required_names(&plan), vec!["cancellation_reason"]);
        assert_eq!(plan.fields.len(), 1);
    }

    #[test]
    fn submit_labels_match_mode() {
        let resolver = ModeResolver::new();
        assert_eq!(
            resolver.submit_label(AppointmentMode::Create),
            "Create Appointment"
        );
        assert_eq!(
            resolver.submit_label(AppointmentMode::Cancel),
            "Cancel Appointment"
        );
        assert_eq!(
            resolver.submit_label(AppointmentMode::Schedule),
            "Schedule Appointment"
        );
    }

    #[test]
    fn unknown_mode_is_a_parse_error() {
        assert!("follow-up".parse::<AppointmentMode>().is_err());
        assert!("".parse::<AppointmentMode>().is_err());
        assert_eq!(
            "schedule".parse::<AppointmentMode>().unwrap(),
            AppointmentMode::Schedule
        );
    }
}
