pub mod form;
pub mod submission;
pub mod validation;

pub use form::ModeResolver;
pub use submission::{AppointmentSubmissionService, SubmissionGuard};
pub use validation::AppointmentValidator;
